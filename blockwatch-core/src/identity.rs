//! UUID to player name resolution with a time-to-live cache.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::{LookupError, Result};

pub const MOJANG_PROFILE_URL: &str = "https://sessionserver.mojang.com/session/minecraft/profile";

/// How long a resolved name is served from the cache.
pub const DEFAULT_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Result of a profile lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Profile {
  Found(String),
  /// The profile service has no account for this UUID.
  Unknown,
}

/// External source of player names.
pub trait ProfileLookup: Send + Sync + 'static {
  fn lookup(&self, uuid: &str) -> impl Future<Output = Result<Profile, LookupError>> + Send;
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
  name: String,
}

/// Looks up names at the Mojang session server.
#[derive(Debug, Clone)]
pub struct MojangLookup {
  client: reqwest::Client,
  base_url: String,
}

impl MojangLookup {
  pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(LookupError::from)?;

    Ok(Self {
      client,
      base_url: base_url.into().trim_end_matches('/').to_string(),
    })
  }
}

impl ProfileLookup for MojangLookup {
  async fn lookup(&self, uuid: &str) -> Result<Profile, LookupError> {
    let url = format!("{}/{}", self.base_url, uuid);
    let res = self.client.get(&url).send().await?;

    match res.status() {
      reqwest::StatusCode::OK => {
        let profile: ProfileResponse = res.json().await?;
        Ok(Profile::Found(profile.name))
      }
      reqwest::StatusCode::NO_CONTENT => Ok(Profile::Unknown),
      status => {
        let body = res.text().await.unwrap_or_else(|err| err.to_string());
        Err(LookupError::Status {
          status: status.as_u16(),
          body,
        })
      }
    }
  }
}

struct CachedName {
  name: String,
  fetched_at: Instant,
}

/// Player name cache in front of a [`ProfileLookup`].
///
/// Entries are only evicted when an access finds them stale.
pub struct IdentityCache<L: ProfileLookup = MojangLookup> {
  lookup: L,
  ttl: Duration,
  entries: scc::HashMap<String, CachedName>,
}

impl<L: ProfileLookup> IdentityCache<L> {
  pub fn new(lookup: L, ttl: Duration) -> Self {
    Self {
      lookup,
      ttl,
      entries: scc::HashMap::new(),
    }
  }

  /// Number of cached entries, stale ones included.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Name for `uuid`, from the cache while fresh.
  ///
  /// An unknown profile resolves to the UUID itself. Failed lookups are not
  /// cached.
  pub async fn resolve(&self, uuid: &str) -> Result<String> {
    let now = Instant::now();

    let cached = self
      .entries
      .read_async(uuid, |_, entry| (entry.name.clone(), entry.fetched_at))
      .await;
    if let Some((name, fetched_at)) = cached {
      if now.duration_since(fetched_at) < self.ttl {
        return Ok(name);
      }
      debug!(uuid, "evicting stale name");
      let _ = self.entries.remove_async(uuid).await;
    }

    let name = match self.lookup.lookup(uuid).await? {
      Profile::Found(name) => name,
      Profile::Unknown => {
        warn!(uuid, "found no minecraft account for the uuid, falling back to the uuid as name");
        uuid.to_string()
      }
    };

    let entry = CachedName {
      name: name.clone(),
      fetched_at: now,
    };
    // A concurrent resolve may have stored the name already, the latest fetch wins
    self.entries.upsert_async(uuid.to_string(), entry).await;
    Ok(name)
  }
}
