//! Migration of pre-1.15 stats files.
//!
//! Old saves store one flat object with dotted keys such as
//! `stat.mineBlock.minecraft.stone` or `stat.jump`.

use std::collections::BTreeMap;

use super::types::Stats;
use crate::error::{ParseError, Result};

/// Convert a flat pre-1.15 stats map into [`Stats`].
pub(crate) fn migrate_legacy(raw: BTreeMap<String, i64>) -> Result<Stats> {
  let mut stats = Stats::default();

  for (key, value) in raw {
    let mut segments = key.split('.');
    let (Some("stat"), Some(name)) = (segments.next(), segments.next()) else {
      return Err(ParseError::LegacyStatKey { key: key.clone(), value }.into());
    };
    let rest: Vec<&str> = segments.collect();

    let category = match name {
      "craftItem" => Some(&mut stats.crafted),
      "mineBlock" => Some(&mut stats.mined),
      "pickup" => Some(&mut stats.picked_up),
      "killEntity" => Some(&mut stats.killed),
      "entityKilledBy" => Some(&mut stats.killed_by),
      _ => None,
    };
    if let Some(category) = category {
      category.insert(rest.join(":"), value);
      continue;
    }

    match stats.custom.legacy_field(name) {
      Some(field) => *field = value,
      None => {
        let path = key.split_once('.').map_or(key.as_str(), |(_, path)| path);
        stats.custom.other.insert(path.to_string(), value);
      }
    }
  }

  Ok(stats)
}
