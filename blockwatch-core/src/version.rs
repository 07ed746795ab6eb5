//! Minecraft version handling.
//!
//! Version names come from `level.dat` and are compared as semantic versions.
//! The save pass writes the last seen name into a [`SharedVersion`] and the
//! rcon pass reads it to decide which commands the server understands.

use std::sync::{Arc, PoisonError, RwLock};

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, Result};

/// First release with `minecraft:` namespaced, nested stats files.
pub const NESTED_STATS: Version = Version::new(1, 15, 0);

/// First release with the `tick query` command.
pub const TICK_QUERY: Version = Version::new(1, 20, 3);

/// Version descriptor stored in `level.dat` under `Data.Version`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MinecraftVersion {
  #[serde(rename = "Id")]
  pub id: i32,
  #[serde(rename = "Name")]
  pub name: String,
  #[serde(rename = "Snapshot")]
  pub snapshot: bool,
}

impl MinecraftVersion {
  /// Semantic version of `name`.
  pub fn semver(&self) -> Result<Version> {
    parse_version(&self.name)
  }
}

/// Parse a release name like `1.20.1`, `1.20` or `1.20.5-rc1`.
///
/// Missing minor/patch components are treated as zero.
pub fn parse_version(raw: &str) -> Result<Version> {
  let trimmed = raw.trim();
  let (core, rest) = match trimmed.find(['-', '+']) {
    Some(idx) => trimmed.split_at(idx),
    None => (trimmed, ""),
  };

  let mut padded = core.to_string();
  for _ in core.split('.').count()..3 {
    padded.push_str(".0");
  }
  padded.push_str(rest);

  Version::parse(&padded).map_err(|_| {
    ParseError::Version {
      raw: raw.to_string(),
    }
    .into()
  })
}

/// Last known server version name, shared between the save and rcon passes.
#[derive(Debug, Clone, Default)]
pub struct SharedVersion {
  inner: Arc<RwLock<String>>,
}

impl SharedVersion {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set(&self, name: impl Into<String>) {
    let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
    *guard = name.into();
  }

  pub fn get(&self) -> String {
    self
      .inner
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }

  /// True if the last known version is at least 1.20.3.
  /// An empty or unparsable version never qualifies.
  pub fn supports_tick_query(&self) -> bool {
    let name = self.get();
    if name.is_empty() {
      return false;
    }
    parse_version(&name).is_ok_and(|v| v >= TICK_QUERY)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_full_version() {
    assert_eq!(parse_version("1.20.1").unwrap(), Version::new(1, 20, 1));
  }

  #[test]
  fn test_parse_pads_short_version() {
    assert_eq!(parse_version("1.20").unwrap(), Version::new(1, 20, 0));
    assert_eq!(parse_version("1").unwrap(), Version::new(1, 0, 0));
  }

  #[test]
  fn test_parse_prerelease() {
    let v = parse_version("1.20.3-rc1").unwrap();
    assert!(v < TICK_QUERY);
    assert_eq!(v.pre.as_str(), "rc1");
  }

  #[test]
  fn test_parse_snapshot_name_fails() {
    let err = parse_version("23w45a").unwrap_err();
    assert!(matches!(
      err,
      crate::Error::Parse(ParseError::Version { ref raw }) if raw == "23w45a"
    ));
  }

  #[test]
  fn test_tick_query_support() {
    let version = SharedVersion::new();
    assert!(!version.supports_tick_query(), "empty version");

    version.set("1.20.2");
    assert!(!version.supports_tick_query());

    version.set("1.20.3");
    assert!(version.supports_tick_query());

    version.set("1.21");
    assert!(version.supports_tick_query());

    version.set("not-a-version");
    assert!(!version.supports_tick_query());
  }

  #[test]
  fn test_shared_between_clones() {
    let version = SharedVersion::new();
    let other = version.clone();
    version.set("1.12.2");
    assert_eq!(other.get(), "1.12.2");
  }
}
