use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::version::MinecraftVersion;

/// Everything the save knows about one player.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PlayerData {
  pub advancements: BTreeMap<String, Advancement>,
  pub stats: Stats,
  pub attributes: PlayerAttributes,
}

impl PlayerData {
  pub fn completed_advancements(&self) -> usize {
    count_advancements(&self.advancements)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Advancement {
  #[serde(default)]
  pub done: bool,
}

/// Player statistics in the nested layout used since 1.15.
///
/// Older saves are migrated into the same shape, see `save::stats`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
  #[serde(rename(deserialize = "minecraft:crafted"))]
  pub crafted: BTreeMap<String, i64>,
  #[serde(rename(deserialize = "minecraft:mined"))]
  pub mined: BTreeMap<String, i64>,
  #[serde(rename(deserialize = "minecraft:picked_up"))]
  pub picked_up: BTreeMap<String, i64>,
  #[serde(rename(deserialize = "minecraft:killed"))]
  pub killed: BTreeMap<String, i64>,
  #[serde(rename(deserialize = "minecraft:killed_by"))]
  pub killed_by: BTreeMap<String, i64>,
  #[serde(rename(deserialize = "minecraft:custom"))]
  pub custom: CustomStats,
}

/// Wrapper matching the top level of a modern stats file.
#[derive(Debug, Deserialize)]
pub(crate) struct StatsFile {
  #[serde(default)]
  pub stats: Stats,
}

/// The `minecraft:custom` category. Well-known stats get a field, anything
/// else ends up in `other`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CustomStats {
  pub jump: i64,
  pub deaths: i64,
  pub damage_taken: i64,
  pub damage_dealt: i64,
  /// In ticks
  pub playtime: i64,
  pub walk: i64,
  pub swim: i64,
  pub sprint: i64,
  pub dive: i64,
  pub fall: i64,
  pub fly: i64,
  pub boat: i64,
  pub horse: i64,
  pub climb: i64,
  pub sleep: i64,
  pub crafting_table: i64,
  pub other: BTreeMap<String, i64>,
}

impl CustomStats {
  /// Field for a namespaced key of a modern stats file.
  fn modern_field(&mut self, key: &str) -> Option<&mut i64> {
    let field = match key {
      "minecraft:jump" => &mut self.jump,
      "minecraft:deaths" => &mut self.deaths,
      "minecraft:damage_taken" => &mut self.damage_taken,
      "minecraft:damage_dealt" => &mut self.damage_dealt,
      "minecraft:play_time" | "minecraft:play_one_minute" => &mut self.playtime,
      "minecraft:walk_one_cm" => &mut self.walk,
      "minecraft:walk_on_water_one_cm" => &mut self.swim,
      "minecraft:sprint_one_cm" => &mut self.sprint,
      "minecraft:walk_under_water_one_cm" => &mut self.dive,
      "minecraft:fall_one_cm" => &mut self.fall,
      "minecraft:fly_one_cm" => &mut self.fly,
      "minecraft:boat_one_cm" => &mut self.boat,
      "minecraft:horse_one_cm" => &mut self.horse,
      "minecraft:climb_one_cm" => &mut self.climb,
      "minecraft:sleep_in_bed" => &mut self.sleep,
      "minecraft:interact_with_crafting_table" => &mut self.crafting_table,
      _ => return None,
    };
    Some(field)
  }

  /// Field for the second segment of a flat `stat.<name>` key.
  pub(crate) fn legacy_field(&mut self, name: &str) -> Option<&mut i64> {
    let field = match name {
      "jump" => &mut self.jump,
      "deaths" => &mut self.deaths,
      "damageTaken" => &mut self.damage_taken,
      "damageDealt" => &mut self.damage_dealt,
      "playOneMinute" => &mut self.playtime,
      "walkOneCm" => &mut self.walk,
      "swimOneCm" => &mut self.swim,
      "sprintOneCm" => &mut self.sprint,
      "diveOneCm" => &mut self.dive,
      "fallOneCm" => &mut self.fall,
      "flyOneCm" => &mut self.fly,
      "boatOneCm" => &mut self.boat,
      "horseOneCm" => &mut self.horse,
      "climbOneCm" => &mut self.climb,
      "sleepInBed" => &mut self.sleep,
      "craftingTableInteraction" => &mut self.crafting_table,
      _ => return None,
    };
    Some(field)
  }
}

impl<'de> Deserialize<'de> for CustomStats {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = BTreeMap::<String, i64>::deserialize(deserializer)?;

    let mut custom = CustomStats::default();
    for (key, value) in raw {
      match custom.modern_field(&key) {
        Some(field) => *field = value,
        None => {
          custom.other.insert(key, value);
        }
      }
    }
    Ok(custom)
  }
}

/// Raw attributes from `playerdata/<uuid>.dat`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerAttributes {
  #[serde(rename(deserialize = "XpTotal"), default)]
  pub xp_total: i32,
  #[serde(rename(deserialize = "XpLevel"), default)]
  pub xp_level: i32,
  #[serde(rename(deserialize = "Score"), default)]
  pub score: i32,
  #[serde(rename(deserialize = "Health"), default)]
  pub health: f32,
  #[serde(rename(deserialize = "foodLevel"), default)]
  pub food_level: i32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LevelDat {
  #[serde(rename = "Data")]
  pub data: LevelData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LevelData {
  #[serde(rename = "Version")]
  pub version: MinecraftVersion,
}

/// Number of completed advancements.
pub fn count_advancements(advancements: &BTreeMap<String, Advancement>) -> usize {
  advancements.values().filter(|a| a.done).count()
}

/// Sum of all counters in a stat category.
pub fn count_total(values: &BTreeMap<String, i64>) -> i64 {
  values.values().sum()
}
