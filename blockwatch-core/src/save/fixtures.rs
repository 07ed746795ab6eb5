//! World directories for tests.

use std::io::Write;
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use tempfile::TempDir;

use crate::version::MinecraftVersion;

pub(crate) const MODERN_STATS: &str = r#"{
  "stats": {
    "minecraft:mined": {"minecraft:stone": 40, "minecraft:dirt": 2},
    "minecraft:crafted": {"minecraft:crafting_table": 1},
    "minecraft:picked_up": {"minecraft:cobblestone": 38},
    "minecraft:killed": {"minecraft:zombie": 3},
    "minecraft:killed_by": {"minecraft:skeleton": 1},
    "minecraft:custom": {
      "minecraft:jump": 120,
      "minecraft:deaths": 1,
      "minecraft:play_time": 72000,
      "minecraft:walk_one_cm": 5000,
      "minecraft:leave_game": 4
    }
  },
  "DataVersion": 3700
}"#;

pub(crate) const LEGACY_STATS: &str = r#"{
  "stat.mineBlock.minecraft.stone": 40,
  "stat.mineBlock.minecraft.dirt": 2,
  "stat.craftItem.minecraft.crafting_table": 1,
  "stat.pickup.minecraft.cobblestone": 38,
  "stat.killEntity.Zombie": 3,
  "stat.entityKilledBy.Skeleton": 1,
  "stat.jump": 120,
  "stat.deaths": 1,
  "stat.playOneMinute": 72000,
  "stat.walkOneCm": 5000,
  "stat.leaveGame": 4
}"#;

pub(crate) const MODERN_ADVANCEMENTS: &str = r#"{
  "minecraft:story/root": {"criteria": {"crafting_table": "2024-01-01 12:00:00 +0000"}, "done": true},
  "minecraft:story/mine_stone": {"criteria": {"get_stone": "2024-01-01 12:05:00 +0000"}, "done": true},
  "minecraft:story/smelt_iron": {"criteria": {}, "done": false},
  "DataVersion": 3700
}"#;

pub(crate) const LEGACY_ADVANCEMENTS: &str = r#"{
  "minecraft:story/root": {"criteria": {"crafting_table": "2017-06-07 12:00:00 +0000"}, "done": true},
  "minecraft:story/mine_stone": {"criteria": {"get_stone": "2017-06-07 12:05:00 +0000"}, "done": true}
}"#;

#[derive(Serialize)]
struct LevelFixture {
  #[serde(rename = "Data")]
  data: LevelDataFixture,
}

#[derive(Serialize)]
struct LevelDataFixture {
  #[serde(rename = "Version")]
  version: MinecraftVersion,
}

#[derive(Serialize)]
struct PlayerFixture {
  #[serde(rename = "XpTotal")]
  xp_total: i32,
  #[serde(rename = "XpLevel")]
  xp_level: i32,
  #[serde(rename = "Score")]
  score: i32,
  #[serde(rename = "Health")]
  health: f32,
  #[serde(rename = "foodLevel")]
  food_level: i32,
}

pub(crate) fn write_nbt<T: Serialize>(path: &Path, value: &T) {
  let bytes = fastnbt::to_bytes(value).unwrap();
  let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
  encoder.write_all(&bytes).unwrap();
  std::fs::write(path, encoder.finish().unwrap()).unwrap();
}

/// A temporary world directory with `level.dat` and the three player
/// subdirectories.
pub(crate) struct World {
  dir: TempDir,
}

impl World {
  pub(crate) fn new(version: &str) -> Self {
    let dir = tempfile::tempdir().unwrap();
    for sub in ["stats", "playerdata", "advancements"] {
      std::fs::create_dir(dir.path().join(sub)).unwrap();
    }
    let world = Self { dir };
    world.write_level(version);
    world
  }

  pub(crate) fn path(&self) -> &Path {
    self.dir.path()
  }

  pub(crate) fn write_level(&self, version: &str) {
    let level = LevelFixture {
      data: LevelDataFixture {
        version: MinecraftVersion {
          id: 3700,
          name: version.to_string(),
          snapshot: false,
        },
      },
    };
    write_nbt(&self.path().join("level.dat"), &level);
  }

  pub(crate) fn add_player(&self, uuid: &str, stats: &str, advancements: &str) {
    let root = self.path();
    std::fs::write(root.join(format!("stats/{uuid}.json")), stats).unwrap();
    std::fs::write(root.join(format!("advancements/{uuid}.json")), advancements).unwrap();

    let player = PlayerFixture {
      xp_total: 1395,
      xp_level: 30,
      score: 1395,
      health: 20.0,
      food_level: 18,
    };
    write_nbt(&root.join(format!("playerdata/{uuid}.dat")), &player);
  }
}
