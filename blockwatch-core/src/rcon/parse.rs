//! Parsers for rcon command output.
//!
//! Every server variant and version formats its console output a little
//! differently. Each grammar gets its own matcher so a failure always points
//! at one specific format. All functions are pure.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use super::types::{
  DynmapChunkloadingStat, DynmapRenderStat, DynmapStats, EntityCount, ForgeTps, PaperTps,
  TickStats, TpsStat,
};
use crate::error::{ParseError, Result};

fn regex(pattern: &str) -> Regex {
  Regex::new(pattern).unwrap_or_else(|err| panic!("invalid built-in pattern {pattern}: {err}"))
}

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| regex(r"\x1b\[[0-9;]*[A-Za-z]"));
static COLOR_CODE: LazyLock<Regex> = LazyLock::new(|| regex(r"§[0-9a-fk-orx]"));

// Forge <= 1.16: "Dim  0 (DIM_0) : Mean tick time: 7.672 ms. Mean TPS: 20.000"
static LEGACY_DIM: LazyLock<Regex> = LazyLock::new(|| {
  regex(r"Dim\s*(\S+?)\s\((.*?)\)\s?:\sMean tick time:\s(\S+?) ms\. Mean TPS: (\d+(?:\.\d+)?)")
});
static LEGACY_OVERALL: LazyLock<Regex> = LazyLock::new(|| {
  regex(r"Overall\s?: Mean tick time: (\S+?) ms\. Mean TPS: (\d+(?:\.\d+)?)")
});

// Forge/NeoForge >= 1.17: "minecraft:overworld: 20.000 TPS (1.234 ms/tick)"
static MODERN_DIM: LazyLock<Regex> =
  LazyLock::new(|| regex(r"(\S+?): (\S+?) TPS \((\S+?) ms/tick\)"));
static MODERN_OVERALL: LazyLock<Regex> =
  LazyLock::new(|| regex(r"Overall: (\S+?) TPS \((\S+?) ms/tick\)"));

static ENTITY_TOTAL: LazyLock<Regex> = LazyLock::new(|| regex(r"^\s*Total:\s*\d+"));
static ENTITY: LazyLock<Regex> = LazyLock::new(|| regex(r"(\d+): ([^\s:]+:\S+)"));

// Rows are indented by two spaces, vanilla and forge drop the newlines
static DYNMAP_RENDER: LazyLock<Regex> = LazyLock::new(|| {
  regex(r"  (\S.*?): processed=(\d+), rendered=(\d+), updated=(\d+)")
});
static DYNMAP_CHUNKS: LazyLock<Regex> = LazyLock::new(|| {
  regex(r"Chunks processed: (.*?): count=(\d+), (\d+(?:\.\d+)?) msec/chunk")
});

static TICK_RATE: LazyLock<Regex> =
  LazyLock::new(|| regex(r"Target tick rate: ([\d.,]+) per second"));
static TICK_AVERAGE: LazyLock<Regex> =
  LazyLock::new(|| regex(r"Average time per tick: ([\d.,]+) ?ms"));
static TICK_P50: LazyLock<Regex> = LazyLock::new(|| regex(r"P50: ([\d.,]+) ?ms"));
static TICK_P95: LazyLock<Regex> = LazyLock::new(|| regex(r"P95: ([\d.,]+) ?ms"));
static TICK_P99: LazyLock<Regex> = LazyLock::new(|| regex(r"P99: ([\d.,]+) ?ms"));

const PAPER_TPS_PREFIX: &str = "TPS from last 1m, 5m, 15m: ";

fn number<T: FromStr>(field: &'static str, value: &str) -> Result<T> {
  value.trim().parse().map_err(|_| {
    ParseError::Number {
      field,
      value: value.to_string(),
    }
    .into()
  })
}

fn strip_formatting(input: &str) -> String {
  let input = ANSI_ESCAPE.replace_all(input, "");
  COLOR_CODE.replace_all(&input, "").into_owned()
}

/// Parse the output of `list`.
///
/// Handles both "There are 2/10 players online:A, B" (<= 1.12) and
/// "There are 2 of a max of 10 players online: A, B".
pub fn parse_players_online(input: &str) -> Vec<String> {
  let input = strip_formatting(input);
  let Some((_, players)) = input.split_once("players online:") else {
    return Vec::new();
  };

  players
    .trim()
    .split(", ")
    .map(str::trim)
    .filter(|name| !name.is_empty())
    .map(String::from)
    .collect()
}

/// Parse the output of `forge tps` / `neoforge tps`.
///
/// The overall line is mandatory: output without it is an error even when
/// dimension entries were found.
pub fn parse_forge_tps(input: &str) -> Result<ForgeTps> {
  if let Some(overall) = LEGACY_OVERALL.captures(input) {
    let dimensions = LEGACY_DIM
      .captures_iter(input)
      .map(|dim| {
        Ok(TpsStat {
          id: dim[1].to_string(),
          name: dim[2].to_string(),
          ticktime: number("ticktime", &dim[3])?,
          tps: number("tps", &dim[4])?,
        })
      })
      .collect::<Result<Vec<_>>>()?;

    return Ok(ForgeTps {
      dimensions,
      overall: TpsStat {
        ticktime: number("overall ticktime", &overall[1])?,
        tps: number("overall tps", &overall[2])?,
        ..TpsStat::default()
      },
    });
  }

  if let Some(overall) = MODERN_OVERALL.captures(input) {
    let dimensions = MODERN_DIM
      .captures_iter(input)
      .filter(|dim| &dim[1] != "Overall")
      .map(|dim| {
        Ok(TpsStat {
          id: dim[1].to_string(),
          name: dim[1].to_string(),
          tps: number("tps", &dim[2])?,
          ticktime: number("ticktime", &dim[3])?,
        })
      })
      .collect::<Result<Vec<_>>>()?;

    return Ok(ForgeTps {
      dimensions,
      overall: TpsStat {
        tps: number("overall tps", &overall[1])?,
        ticktime: number("overall ticktime", &overall[2])?,
        ..TpsStat::default()
      },
    });
  }

  Err(
    ParseError::MissingAggregate {
      input: input.to_string(),
    }
    .into(),
  )
}

/// Parse the output of `forge entity list`.
pub fn parse_forge_entities(input: &str) -> Result<Vec<EntityCount>> {
  let input = strip_formatting(input);
  let body = ENTITY_TOTAL.replace(&input, "");

  ENTITY
    .captures_iter(&body)
    .map(|entity| {
      Ok(EntityCount {
        name: entity[2].to_string(),
        count: number("entity count", &entity[1])?,
      })
    })
    .collect()
}

/// Parse the output of paper's `tps`.
pub fn parse_paper_tps(input: &str) -> Result<PaperTps> {
  let cleaned = strip_formatting(input).replace('\n', "");
  let cleaned = cleaned.trim();
  let cleaned = cleaned.strip_prefix(PAPER_TPS_PREFIX).unwrap_or(cleaned);

  let fields: Vec<&str> = cleaned.split(", ").collect();
  let [one, five, fifteen] = fields[..] else {
    return Err(
      ParseError::FieldCount {
        input: input.to_string(),
        count: fields.len(),
      }
      .into(),
    );
  };

  // Paper marks values above the target rate with a leading '*'
  let value = |field, raw: &str| number(field, raw.trim_start_matches('*'));
  Ok(PaperTps {
    one_minute: value("tps 1m", one)?,
    five_minutes: value("tps 5m", five)?,
    fifteen_minutes: value("tps 15m", fifteen)?,
  })
}

/// Parse the output of `dynmap stats`.
pub fn parse_dynmap_stats(input: &str) -> Result<DynmapStats> {
  let render = DYNMAP_RENDER
    .captures_iter(input)
    .map(|stat| {
      Ok(DynmapRenderStat {
        dim: stat[1].to_string(),
        processed: number("processed", &stat[2])?,
        rendered: number("rendered", &stat[3])?,
        updated: number("updated", &stat[4])?,
      })
    })
    .collect::<Result<Vec<_>>>()?;

  let chunks = DYNMAP_CHUNKS
    .captures_iter(input)
    .map(|stat| {
      Ok(DynmapChunkloadingStat {
        state: stat[1].to_string(),
        count: number("chunk count", &stat[2])?,
        duration: number("chunk duration", &stat[3])?,
      })
    })
    .collect::<Result<Vec<_>>>()?;

  Ok(DynmapStats { render, chunks })
}

/// Parse the output of `tick query` (1.20.3+).
///
/// The server formats decimals using its locale, so both `0.5` and `0,5`
/// are accepted.
pub fn parse_tick_query(input: &str) -> Result<TickStats> {
  let field = |field: &'static str, pattern: &Regex| -> Result<f64> {
    let raw = pattern
      .captures(input)
      .map(|c| c[1].to_string())
      .ok_or_else(|| ParseError::MissingField {
        field,
        input: input.to_string(),
      })?;
    let normalized = raw.trim_end_matches(['.', ',']).replace(',', ".");
    number::<f64>(field, &normalized).map_err(|_| {
      ParseError::Number { field, value: raw }.into()
    })
  };

  Ok(TickStats {
    target_rate: field("target tick rate", &TICK_RATE)?,
    average: field("average tick time", &TICK_AVERAGE)?,
    p50: field("p50", &TICK_P50)?,
    p95: field("p95", &TICK_P95)?,
    p99: field("p99", &TICK_P99)?,
  })
}
