use std::env::var;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use blockwatch_core::ServerType;
use blockwatch_core::identity::{DEFAULT_TTL, MOJANG_PROFILE_URL};
use dotenvy::dotenv;
use thiserror::Error;
use tracing::Level;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("unknown log level \"{value}\", expected one of trace, debug, info, warn, error")]
    UnknownLogLevel { value: String },

    #[error(transparent)]
    Core(#[from] blockwatch_core::ConfigError),
}

/// Application configuration with environment variable overrides
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    /// Env: PORT (default: 8080)
    pub port: u16,

    /// Env: LOG_LEVEL (default: info)
    pub log_level: Level,

    /// Minecraft world directory
    /// Env: WORLD_DIR (default: "/world")
    pub world_dir: PathBuf,

    /// Env: SERVER_TYPE (default: vanilla)
    pub server_type: ServerType,

    /// Env: DYNMAP_ENABLED (default: false)
    pub dynmap_enabled: bool,

    /// Env: RCON_ENABLED (default: false)
    pub rcon_enabled: bool,

    /// Env: RCON_HOST (default: "")
    pub rcon_host: String,

    /// Env: RCON_PORT (default: 25575)
    pub rcon_port: u16,

    /// Env: RCON_PASSWORD (default: "")
    pub rcon_password: String,

    /// Timeout for a single rcon command
    /// Env: RCON_TIMEOUT_MS (default: 1000)
    pub rcon_timeout: Duration,

    /// How long resolved player names are cached
    /// Env: UUID_CACHE_TTL_SECS (default: 43200 = 12h)
    pub uuid_cache_ttl: Duration,

    /// Profile lookup endpoint, the player UUID is appended
    /// Env: PROFILE_LOOKUP_URL (default: Mojang session server)
    pub profile_lookup_url: String,

    /// Timeout for a single profile lookup, keep it well below the request timeout
    /// Env: PROFILE_LOOKUP_TIMEOUT_SECS (default: 5)
    pub profile_lookup_timeout: Duration,

    /// Request timeout in seconds
    /// Env: REQUEST_TIMEOUT_SECS (default: 30)
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenv(); //for debugging mostly
        Self::from_vars(|key| var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_vars(vars: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let vars = Vars(vars);

        let log_level = match vars.get("LOG_LEVEL") {
            Some(value) => Level::from_str(&value)
                .map_err(|_| ConfigError::UnknownLogLevel { value })?,
            None => defaults.log_level,
        };
        let server_type = match vars.get("SERVER_TYPE") {
            Some(value) => value.parse()?,
            None => defaults.server_type,
        };

        Ok(Self {
            port: vars.or_default("PORT", defaults.port),
            log_level,
            world_dir: vars.or_default("WORLD_DIR", defaults.world_dir),
            server_type,
            dynmap_enabled: vars.or_default("DYNMAP_ENABLED", defaults.dynmap_enabled),
            rcon_enabled: vars.or_default("RCON_ENABLED", defaults.rcon_enabled),
            rcon_host: vars.or_default("RCON_HOST", defaults.rcon_host),
            rcon_port: vars.or_default("RCON_PORT", defaults.rcon_port),
            rcon_password: vars.or_default("RCON_PASSWORD", defaults.rcon_password),
            rcon_timeout: Duration::from_millis(vars.or_default("RCON_TIMEOUT_MS", 1000)),
            uuid_cache_ttl: Duration::from_secs(
                vars.or_default("UUID_CACHE_TTL_SECS", defaults.uuid_cache_ttl.as_secs()),
            ),
            profile_lookup_url: vars.or_default("PROFILE_LOOKUP_URL", defaults.profile_lookup_url),
            profile_lookup_timeout: Duration::from_secs(
                vars.or_default("PROFILE_LOOKUP_TIMEOUT_SECS", 5),
            ),
            request_timeout: Duration::from_secs(vars.or_default("REQUEST_TIMEOUT_SECS", 30)),
        })
    }

    /// Create configuration with all default values
    pub fn default() -> Self {
        Self {
            port: 8080,
            log_level: Level::INFO,
            world_dir: PathBuf::from("/world"),
            server_type: ServerType::Vanilla,
            dynmap_enabled: false,
            rcon_enabled: false,
            rcon_host: String::new(),
            rcon_port: 25575,
            rcon_password: String::new(),
            rcon_timeout: Duration::from_secs(1),
            uuid_cache_ttl: DEFAULT_TTL,
            profile_lookup_url: MOJANG_PROFILE_URL.to_string(),
            profile_lookup_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
        }
    }
}

struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    /// Non-empty value of a variable
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|val| !val.is_empty())
    }

    /// Parse variable or return default value
    fn or_default<T: FromStr>(&self, key: &str, default: T) -> T {
        self.get(key)
            .and_then(|val| val.parse().ok())
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.world_dir, PathBuf::from("/world"));
        assert_eq!(config.server_type, ServerType::Vanilla);
        assert!(!config.rcon_enabled);
        assert_eq!(config.rcon_port, 25575);
        assert_eq!(config.rcon_timeout, Duration::from_secs(1));
        assert_eq!(config.uuid_cache_ttl, Duration::from_secs(43200));
        assert_eq!(config.profile_lookup_timeout, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.profile_lookup_timeout < config.request_timeout);
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.profile_lookup_url, MOJANG_PROFILE_URL);
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("PORT", "9150"),
            ("LOG_LEVEL", "debug"),
            ("WORLD_DIR", "/data/world"),
            ("SERVER_TYPE", "paper"),
            ("DYNMAP_ENABLED", "true"),
            ("RCON_ENABLED", "true"),
            ("RCON_HOST", "mc.local"),
            ("RCON_PASSWORD", "hunter2"),
            ("RCON_TIMEOUT_MS", "250"),
            ("UUID_CACHE_TTL_SECS", "60"),
            ("PROFILE_LOOKUP_TIMEOUT_SECS", "2"),
            ("REQUEST_TIMEOUT_SECS", "10"),
        ])
        .unwrap();

        assert_eq!(config.port, 9150);
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.world_dir, PathBuf::from("/data/world"));
        assert_eq!(config.server_type, ServerType::Paper);
        assert!(config.dynmap_enabled);
        assert!(config.rcon_enabled);
        assert_eq!(config.rcon_host, "mc.local");
        assert_eq!(config.rcon_port, 25575);
        assert_eq!(config.rcon_password, "hunter2");
        assert_eq!(config.rcon_timeout, Duration::from_millis(250));
        assert_eq!(config.uuid_cache_ttl, Duration::from_secs(60));
        assert_eq!(config.profile_lookup_timeout, Duration::from_secs(2));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_unparsable_number_falls_back() {
        let config = from_pairs(&[("PORT", "eighty")]).unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_unknown_server_type() {
        let err = from_pairs(&[("SERVER_TYPE", "spigot")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Core(blockwatch_core::ConfigError::UnknownServerType {
                value: "spigot".to_string()
            })
        );
    }

    #[test]
    fn test_unknown_log_level() {
        let err = from_pairs(&[("LOG_LEVEL", "loud")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownLogLevel {
                value: "loud".to_string()
            }
        );
    }
}
