use serde::Serialize;

/// Tick statistics of a single dimension, or the overall line when
/// `id` and `name` are empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TpsStat {
  pub id: String,
  pub name: String,
  /// Mean tick time in milliseconds
  pub ticktime: f64,
  pub tps: f64,
}

/// Dimension entries plus the aggregate line of a forge `tps` response.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ForgeTps {
  pub dimensions: Vec<TpsStat>,
  pub overall: TpsStat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityCount {
  pub name: String,
  pub count: u64,
}

/// Paper's rolling TPS averages.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PaperTps {
  pub one_minute: f64,
  pub five_minutes: f64,
  pub fifteen_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DynmapRenderStat {
  pub dim: String,
  pub processed: u64,
  pub rendered: u64,
  pub updated: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DynmapChunkloadingStat {
  pub state: String,
  pub count: u64,
  /// Average milliseconds per chunk
  pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DynmapStats {
  pub render: Vec<DynmapRenderStat>,
  pub chunks: Vec<DynmapChunkloadingStat>,
}

/// Output of `tick query`, all times in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TickStats {
  pub target_rate: f64,
  pub average: f64,
  pub p50: f64,
  pub p95: f64,
  pub p99: f64,
}
