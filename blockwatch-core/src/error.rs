use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("configuration error: {0}")]
  Config(#[from] ConfigError),

  #[error("rcon transport error: {0}")]
  Transport(#[from] TransportError),

  #[error("timed out after {timeout:?} waiting for a response to `{command}`")]
  Timeout { command: String, timeout: Duration },

  #[error("parse error: {0}")]
  Parse(#[from] ParseError),

  #[error("file not found: {}", path.display())]
  NotFound { path: PathBuf },

  #[error("failed to read {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("profile lookup failed: {0}")]
  Lookup(#[from] LookupError),

  #[error("blocking task failed: {0}")]
  Task(#[from] tokio::task::JoinError),
}

impl Error {
  /// Wrap an io error for `path`, splitting out missing files.
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    let path = path.into();
    if source.kind() == std::io::ErrorKind::NotFound {
      Error::NotFound { path }
    } else {
      Error::Io { path, source }
    }
  }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
  #[error("missing target host for RCON")]
  MissingHost,

  #[error("missing target port for RCON")]
  MissingPort,

  #[error("missing password for RCON")]
  MissingPassword,

  #[error("no valid world directory provided: \"{}\" is not a directory", path.display())]
  NotADirectory { path: PathBuf },

  #[error("no valid world directory provided: failed to find \"{name}\" subdirectory")]
  MissingSubdirectory { name: &'static str },

  #[error("unknown server type \"{value}\", expected one of vanilla, forge, neoforge, paper")]
  UnknownServerType { value: String },
}

#[derive(Debug, Error)]
pub enum TransportError {
  #[error("authentication rejected by server")]
  Auth,

  #[error("connection error: {0}")]
  Io(#[from] std::io::Error),

  #[error("protocol error: {0}")]
  Protocol(String),
}

#[derive(Debug, Error)]
pub enum ParseError {
  #[error("failed to parse {field} from \"{value}\"")]
  Number { field: &'static str, value: String },

  #[error("missing overall tps line in \"{input}\"")]
  MissingAggregate { input: String },

  #[error("expected 3 values, got {count}. Input: \"{input}\"")]
  FieldCount { input: String, count: usize },

  #[error("missing {field} in \"{input}\"")]
  MissingField { field: &'static str, input: String },

  #[error("failed to parse the stat (\"{key}\": {value})")]
  LegacyStatKey { key: String, value: i64 },

  #[error("unparsable server version \"{raw}\"")]
  Version { raw: String },

  #[error("invalid nbt in {}: {source}", path.display())]
  Nbt {
    path: PathBuf,
    #[source]
    source: fastnbt::error::Error,
  },

  #[error("invalid json in {}: {source}", path.display())]
  Json {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

#[derive(Debug, Error)]
pub enum LookupError {
  #[error("request returned status {status}, expected 200. Response body: {body}")]
  Status { status: u16, body: String },

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
