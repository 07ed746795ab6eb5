//! Read-only access to a world directory.
//!
//! All methods do blocking file I/O. Async callers should run them on the
//! blocking pool, see [`crate::collector::SaveCollector`].

mod io;
mod stats;
mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use types::{
  Advancement, CustomStats, PlayerAttributes, PlayerData, Stats, count_advancements, count_total,
};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::error::{ConfigError, Error, ParseError, Result};
use crate::version::{MinecraftVersion, NESTED_STATS};
use io::{read_json, read_nbt};
use types::{LevelDat, StatsFile};

const STATS_DIR: &str = "stats";
const PLAYER_DIR: &str = "playerdata";
const ADVANCEMENTS_DIR: &str = "advancements";

/// Metadata key written into advancement files since 1.13.
const DATA_VERSION_KEY: &str = "DataVersion";

#[derive(Debug)]
pub struct Save {
  world_dir: PathBuf,
  stats_dir: PathBuf,
  player_dir: PathBuf,
  advancements_dir: PathBuf,
  version: RwLock<Option<MinecraftVersion>>,
}

impl Save {
  /// Open a world directory. Fails unless it contains the `stats`,
  /// `playerdata` and `advancements` subdirectories.
  pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
    let world_dir = path.into();
    if !world_dir.is_dir() {
      return Err(ConfigError::NotADirectory { path: world_dir }.into());
    }

    let subdir = |name: &'static str| -> Result<PathBuf> {
      let dir = world_dir.join(name);
      if dir.is_dir() {
        Ok(dir)
      } else {
        Err(ConfigError::MissingSubdirectory { name }.into())
      }
    };

    Ok(Self {
      stats_dir: subdir(STATS_DIR)?,
      player_dir: subdir(PLAYER_DIR)?,
      advancements_dir: subdir(ADVANCEMENTS_DIR)?,
      world_dir,
      version: RwLock::new(None),
    })
  }

  pub fn world_dir(&self) -> &Path {
    &self.world_dir
  }

  /// Re-read the game version from `level.dat` and remember it.
  pub fn refresh_version(&self) -> Result<MinecraftVersion> {
    let level: LevelDat = read_nbt(&self.world_dir.join("level.dat"))?;
    let version = level.data.version;

    let mut guard = self.version.write().unwrap_or_else(PoisonError::into_inner);
    *guard = Some(version.clone());
    Ok(version)
  }

  /// Version from the last successful [`Self::refresh_version`].
  pub fn version(&self) -> Option<MinecraftVersion> {
    self
      .version
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }

  /// UUIDs of every player with a stats file, sorted.
  pub fn players(&self) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(&self.stats_dir).map_err(|e| Error::io(&self.stats_dir, e))?;

    let mut players = Vec::new();
    for entry in entries {
      let entry = entry.map_err(|e| Error::io(&self.stats_dir, e))?;
      let is_file = entry
        .file_type()
        .map_err(|e| Error::io(entry.path(), e))?
        .is_file();
      if !is_file {
        continue;
      }
      if let Some(uuid) = entry.file_name().to_str().and_then(|n| n.strip_suffix(".json")) {
        players.push(uuid.to_string());
      }
    }

    players.sort();
    Ok(players)
  }

  /// Load advancements, stats and attributes of one player.
  ///
  /// The version is re-read first since it decides the stats layout. Any
  /// failure fails the whole load.
  pub fn load_player(&self, uuid: &str) -> Result<PlayerData> {
    let advancements = self.load_advancements(uuid)?;
    let version = self.refresh_version()?;
    let stats = self.load_stats(uuid, &version)?;
    let attributes = read_nbt(&self.player_dir.join(format!("{uuid}.dat")))?;

    Ok(PlayerData {
      advancements,
      stats,
      attributes,
    })
  }

  fn load_advancements(&self, uuid: &str) -> Result<BTreeMap<String, Advancement>> {
    let path = self.advancements_dir.join(format!("{uuid}.json"));
    let mut raw: BTreeMap<String, serde_json::Value> = read_json(&path)?;
    raw.remove(DATA_VERSION_KEY);

    raw
      .into_iter()
      .map(|(id, value)| -> Result<(String, Advancement)> {
        let advancement = serde_json::from_value(value).map_err(|source| ParseError::Json {
          path: path.clone(),
          source,
        })?;
        Ok((id, advancement))
      })
      .collect()
  }

  fn load_stats(&self, uuid: &str, version: &MinecraftVersion) -> Result<Stats> {
    let path = self.stats_dir.join(format!("{uuid}.json"));

    if version.semver()? >= NESTED_STATS {
      let file: StatsFile = read_json(&path)?;
      Ok(file.stats)
    } else {
      debug!(uuid, version = %version.name, "migrating legacy stats");
      stats::migrate_legacy(read_json(&path)?)
    }
  }
}
