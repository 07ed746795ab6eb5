//! One scrape worth of data from rcon and from the save.
//!
//! Collectors never fail as a whole. Each failed command or player is logged
//! and left out of the result.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error};

use crate::error::Result;
use crate::identity::{IdentityCache, MojangLookup, ProfileLookup};
use crate::rcon::{
  Connector, DynmapStats, EntityCount, ForgeTps, PaperTps, RconClient, ServerType, TcpConnector,
  TickStats,
};
use crate::save::{PlayerData, Save};
use crate::version::SharedVersion;

/// Server wide stats. A field is `None` when its command is not available
/// for this server or failed.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ServerSnapshot {
  pub server_type: ServerType,
  #[serde(skip_serializing_if = "String::is_empty")]
  pub version: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub players_online: Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub forge_tps: Option<ForgeTps>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub forge_entities: Option<Vec<EntityCount>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub paper_tps: Option<PaperTps>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub dynmap: Option<DynmapStats>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tick: Option<TickStats>,
}

fn logged<T>(what: &str, result: Result<T>) -> Option<T> {
  match result {
    Ok(value) => Some(value),
    Err(err) => {
      error!(?err, "failed to collect {what}");
      None
    }
  }
}

pub struct RconCollector<C: Connector = TcpConnector> {
  rcon: RconClient<C>,
  server_type: ServerType,
  dynmap_enabled: bool,
}

impl<C: Connector> RconCollector<C> {
  pub fn new(rcon: RconClient<C>, server_type: ServerType, dynmap_enabled: bool) -> Self {
    Self {
      rcon,
      server_type,
      dynmap_enabled,
    }
  }

  pub fn client(&self) -> &RconClient<C> {
    &self.rcon
  }

  /// Run every command this server supports.
  pub async fn collect(&self) -> ServerSnapshot {
    debug!(server_type = %self.server_type, "starting rcon collection");
    let mut snapshot = ServerSnapshot {
      server_type: self.server_type,
      version: self.rcon.version(),
      players_online: logged("online players", self.rcon.players_online().await),
      ..ServerSnapshot::default()
    };

    if let Some(variant) = self.server_type.forge_command() {
      snapshot.forge_tps = logged("forge tps stats", self.rcon.forge_tps(variant).await);
      snapshot.forge_entities =
        logged("forge entity list", self.rcon.forge_entities(variant).await);
    }
    if self.server_type == ServerType::Paper {
      snapshot.paper_tps = logged("paper tps stats", self.rcon.paper_tps().await);
    }
    if self.dynmap_enabled {
      snapshot.dynmap = logged("dynmap stats", self.rcon.dynmap_stats().await);
    }
    if self.rcon.supports_tick_query() {
      snapshot.tick = logged("tick stats", self.rcon.tick_query().await);
    }

    debug!("finished rcon collection");
    snapshot
  }

  pub async fn close(&self) {
    self.rcon.close().await;
  }
}

pub struct SaveCollector<L: ProfileLookup = MojangLookup> {
  save: Arc<Save>,
  identities: IdentityCache<L>,
  version: SharedVersion,
}

impl<L: ProfileLookup> SaveCollector<L> {
  pub fn new(save: Save, identities: IdentityCache<L>, version: SharedVersion) -> Self {
    Self {
      save: Arc::new(save),
      identities,
      version,
    }
  }

  async fn blocking<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Save) -> Result<T> + Send + 'static,
  {
    let save = Arc::clone(&self.save);
    tokio::task::spawn_blocking(move || f(&save)).await?
  }

  /// Load every player of the save, keyed by display name.
  pub async fn collect(&self) -> BTreeMap<String, PlayerData> {
    debug!("starting collection from savedata");
    let mut result = BTreeMap::new();

    match self.blocking(Save::refresh_version).await {
      Ok(version) => self.version.set(version.name),
      Err(err) => error!(?err, "failed to read the world version"),
    }

    let players = match self.blocking(Save::players).await {
      Ok(players) => players,
      Err(err) => {
        error!(?err, "failed to get list of players");
        return result;
      }
    };

    for uuid in players {
      let name = match self.identities.resolve(&uuid).await {
        Ok(name) => name,
        Err(err) => {
          error!(?err, player = %uuid, "failed to fetch name from uuid");
          continue;
        }
      };

      let id = uuid.clone();
      match self.blocking(move |save| save.load_player(&id)).await {
        Ok(data) => {
          debug!(player = %name, advancements = data.completed_advancements(), "loaded player");
          result.insert(name, data);
        }
        Err(err) => error!(?err, player = %uuid, "failed to load data for player"),
      }
    }

    debug!(players = result.len(), "finished collection from savedata");
    result
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::identity::tests::StaticLookup;
  use crate::rcon::tests::{FakeConnector, Step, client};
  use crate::save::fixtures::{MODERN_ADVANCEMENTS, MODERN_STATS, World};
  use std::time::Duration;

  #[tokio::test]
  async fn test_vanilla_only_lists_players() {
    let connector = FakeConnector::respond(&["There are 1 of a max of 20 players online: Steve"]);
    let collector = RconCollector::new(client(connector.clone()), ServerType::Vanilla, false);

    let snapshot = collector.collect().await;

    assert_eq!(snapshot.players_online, Some(vec!["Steve".to_string()]));
    assert_eq!(snapshot.forge_tps, None);
    assert_eq!(snapshot.tick, None);
    assert_eq!(connector.commands(), vec!["list"]);
  }

  #[tokio::test]
  async fn test_failed_command_is_omitted() {
    let connector = FakeConnector::respond(&[
      "There are 0 of a max of 20 players online: ",
      "Unknown or incomplete command",
      "Total: 2  2: minecraft:cow",
    ]);
    let collector = RconCollector::new(client(connector.clone()), ServerType::Forge, false);

    let snapshot = collector.collect().await;

    assert_eq!(snapshot.players_online, Some(vec![]));
    assert_eq!(snapshot.forge_tps, None);
    assert_eq!(snapshot.forge_entities.unwrap()[0].count, 2);
    assert_eq!(connector.commands(), vec!["list", "forge tps", "forge entity list"]);
  }

  #[tokio::test]
  async fn test_paper_with_dynmap_and_tick_query() {
    let connector = FakeConnector::respond(&[
      "There are 0 of a max of 20 players online: ",
      "TPS from last 1m, 5m, 15m: 20.0, 20.0, 19.9",
      "Chunk Loading Statistics:\n  Chunks processed: Cached: count=10, 0.50 msec/chunk\n",
      "Target tick rate: 20.0 per second.\nAverage time per tick: 2.5ms\nPercentiles: P50: 2.0ms P95: 3.0ms P99: 4.0ms, sample: 100",
    ]);
    let rcon = client(connector.clone());
    rcon.update_version("1.21.1");
    let collector = RconCollector::new(rcon, ServerType::Paper, true);

    let snapshot = collector.collect().await;

    assert_eq!(snapshot.version, "1.21.1");
    assert_eq!(snapshot.paper_tps.unwrap().fifteen_minutes, 19.9);
    assert_eq!(snapshot.dynmap.unwrap().chunks.len(), 1);
    assert_eq!(snapshot.tick.unwrap().average, 2.5);
    assert_eq!(
      connector.commands(),
      vec!["list", "tps", "dynmap stats", "tick query"]
    );
  }

  #[tokio::test]
  async fn test_transport_error_reconnects_for_next_command() {
    let connector = FakeConnector::new([
      Step::Reset,
      Step::Respond("TPS from last 1m, 5m, 15m: 20.0, 20.0, 20.0".into()),
    ]);
    let collector = RconCollector::new(client(connector.clone()), ServerType::Paper, false);

    let snapshot = collector.collect().await;

    assert_eq!(snapshot.players_online, None);
    assert!(snapshot.paper_tps.is_some());
    assert_eq!(connector.connects.load(std::sync::atomic::Ordering::SeqCst), 2);
  }

  #[test]
  fn test_snapshot_skips_missing_fields() {
    let snapshot = ServerSnapshot {
      server_type: ServerType::NeoForge,
      players_online: Some(vec!["Alex".into()]),
      ..ServerSnapshot::default()
    };

    let json = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(
      json,
      serde_json::json!({ "server_type": "neoforge", "players_online": ["Alex"] })
    );
  }

  fn save_collector(
    world: &World,
    lookup: StaticLookup,
    version: SharedVersion,
  ) -> SaveCollector<StaticLookup> {
    let save = Save::new(world.path()).unwrap();
    SaveCollector::new(save, IdentityCache::new(lookup, Duration::from_secs(60)), version)
  }

  #[tokio::test]
  async fn test_players_keyed_by_name() {
    let world = World::new("1.20.4");
    world.add_player("uuid-steve", MODERN_STATS, MODERN_ADVANCEMENTS);
    world.add_player("uuid-ghost", MODERN_STATS, MODERN_ADVANCEMENTS);
    let version = SharedVersion::new();
    let lookup = StaticLookup::with(&[("uuid-steve", "Steve")]);
    let collector = save_collector(&world, lookup, version.clone());

    let players = collector.collect().await;

    let names: Vec<_> = players.keys().cloned().collect();
    assert_eq!(names, vec!["Steve", "uuid-ghost"]);
    assert_eq!(players["Steve"].stats.custom.jump, 120);
    assert_eq!(version.get(), "1.20.4");
  }

  #[tokio::test]
  async fn test_broken_player_is_omitted() {
    let world = World::new("1.20.4");
    world.add_player("uuid-steve", MODERN_STATS, MODERN_ADVANCEMENTS);
    world.add_player("uuid-broken", "{", MODERN_ADVANCEMENTS);
    let collector = save_collector(&world, StaticLookup::default(), SharedVersion::new());

    let players = collector.collect().await;

    assert_eq!(players.len(), 1);
    assert!(players.contains_key("uuid-steve"));
  }

  #[tokio::test]
  async fn test_lookup_failure_omits_players() {
    let world = World::new("1.20.4");
    world.add_player("uuid-steve", MODERN_STATS, MODERN_ADVANCEMENTS);
    let lookup = StaticLookup {
      fail: true,
      ..StaticLookup::default()
    };
    let collector = save_collector(&world, lookup.clone(), SharedVersion::new());

    assert!(collector.collect().await.is_empty());
    assert_eq!(lookup.calls(), 1);
  }
}
