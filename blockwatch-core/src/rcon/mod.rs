//! Remote console client.
//!
//! A client owns at most one connection. It connects lazily on the first
//! command, runs commands one at a time and drops the connection after any
//! transport error or timeout, so the next command starts from a fresh login.

pub mod parse;
mod transport;
mod types;

pub use transport::{Connector, RconConnection, TcpConnector};
pub use types::{
  DynmapChunkloadingStat, DynmapRenderStat, DynmapStats, EntityCount, ForgeTps, PaperTps,
  TickStats, TpsStat,
};

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{ConfigError, Error, Result};
use crate::version::SharedVersion;

/// How long a login or a single command may take before the connection is
/// dropped.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Server software flavour, decides which extra commands are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerType {
  #[default]
  Vanilla,
  Forge,
  NeoForge,
  Paper,
}

impl ServerType {
  /// Command prefix of the forge-family `tps` / `entity list` commands.
  pub fn forge_command(self) -> Option<&'static str> {
    match self {
      ServerType::Forge => Some("forge"),
      ServerType::NeoForge => Some("neoforge"),
      ServerType::Vanilla | ServerType::Paper => None,
    }
  }
}

impl FromStr for ServerType {
  type Err = ConfigError;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "vanilla" => Ok(ServerType::Vanilla),
      "forge" => Ok(ServerType::Forge),
      "neoforge" => Ok(ServerType::NeoForge),
      "paper" => Ok(ServerType::Paper),
      _ => Err(ConfigError::UnknownServerType {
        value: s.to_string(),
      }),
    }
  }
}

impl fmt::Display for ServerType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      ServerType::Vanilla => "vanilla",
      ServerType::Forge => "forge",
      ServerType::NeoForge => "neoforge",
      ServerType::Paper => "paper",
    };
    f.write_str(name)
  }
}

/// Console client for one server.
pub struct RconClient<C: Connector = TcpConnector> {
  addr: String,
  password: String,
  timeout: Duration,
  connector: C,
  conn: Mutex<Option<C::Connection>>,
  version: SharedVersion,
}

impl RconClient<TcpConnector> {
  /// Create a client over TCP. Does not connect yet.
  pub fn new(host: &str, port: u16, password: &str, version: SharedVersion) -> Result<Self> {
    Self::with_connector(TcpConnector, host, port, password, version)
  }
}

impl<C: Connector> RconClient<C> {
  /// Create a client with a custom transport. Does not connect yet.
  pub fn with_connector(
    connector: C,
    host: &str,
    port: u16,
    password: &str,
    version: SharedVersion,
  ) -> Result<Self> {
    if host.is_empty() {
      return Err(ConfigError::MissingHost.into());
    }
    if port == 0 {
      return Err(ConfigError::MissingPort.into());
    }
    if password.is_empty() {
      return Err(ConfigError::MissingPassword.into());
    }

    Ok(Self {
      addr: format!("{host}:{port}"),
      password: password.to_string(),
      timeout: DEFAULT_TIMEOUT,
      connector,
      conn: Mutex::new(None),
      version,
    })
  }

  /// Override the per-command timeout.
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn addr(&self) -> &str {
    &self.addr
  }

  /// Whether a connection is currently open.
  pub async fn is_connected(&self) -> bool {
    self.conn.lock().await.is_some()
  }

  async fn connect(&self) -> Result<C::Connection> {
    debug!(addr = %self.addr, "creating new rcon connection");
    match timeout(self.timeout, self.connector.connect(&self.addr, &self.password)).await {
      Ok(conn) => Ok(conn?),
      Err(_) => Err(Error::Timeout {
        command: "login".to_string(),
        timeout: self.timeout,
      }),
    }
  }

  /// Run a console command and return the raw response.
  ///
  /// Commands are serialized. A timed out exchange is cancelled together
  /// with its connection.
  pub async fn cmd(&self, command: &str) -> Result<String> {
    let mut guard = self.conn.lock().await;
    let mut conn = match guard.take() {
      Some(conn) => conn,
      None => self.connect().await?,
    };

    debug!(cmd = command, "running rcon command");
    match timeout(self.timeout, conn.exec(command)).await {
      Ok(Ok(response)) => {
        debug!(cmd = command, res = %response, "received rcon response");
        *guard = Some(conn);
        Ok(response)
      }
      Ok(Err(err)) => {
        warn!(cmd = command, ?err, "closing rcon connection after transport error");
        Err(err.into())
      }
      Err(_) => {
        warn!(cmd = command, timeout = ?self.timeout, "rcon command timed out, closing connection");
        Err(Error::Timeout {
          command: command.to_string(),
          timeout: self.timeout,
        })
      }
    }
  }

  /// Names of all online players.
  pub async fn players_online(&self) -> Result<Vec<String>> {
    let res = self.cmd("list").await?;
    Ok(parse::parse_players_online(&res))
  }

  /// Per-dimension and overall tick stats of a forge-family server.
  pub async fn forge_tps(&self, variant: &str) -> Result<ForgeTps> {
    let res = self.cmd(&format!("{variant} tps")).await?;
    parse::parse_forge_tps(&res)
  }

  /// Loaded entity counts of a forge-family server.
  pub async fn forge_entities(&self, variant: &str) -> Result<Vec<EntityCount>> {
    let res = self.cmd(&format!("{variant} entity list")).await?;
    parse::parse_forge_entities(&res)
  }

  pub async fn paper_tps(&self) -> Result<PaperTps> {
    let res = self.cmd("tps").await?;
    parse::parse_paper_tps(&res)
  }

  pub async fn dynmap_stats(&self) -> Result<DynmapStats> {
    let res = self.cmd("dynmap stats").await?;
    parse::parse_dynmap_stats(&res)
  }

  /// Tick statistics, available since 1.20.3. See [`Self::supports_tick_query`].
  pub async fn tick_query(&self) -> Result<TickStats> {
    let res = self.cmd("tick query").await?;
    parse::parse_tick_query(&res)
  }

  pub fn update_version(&self, name: impl Into<String>) {
    self.version.set(name);
  }

  pub fn version(&self) -> String {
    self.version.get()
  }

  pub fn supports_tick_query(&self) -> bool {
    self.version.supports_tick_query()
  }

  /// Close the connection if one is open.
  pub async fn close(&self) {
    if self.conn.lock().await.take().is_some() {
      debug!(addr = %self.addr, "closed rcon connection");
    }
  }
}
