//! Transport seam between the rcon client and the wire protocol.
//!
//! Packet framing, request ids and the auth handshake belong to the `rcon`
//! crate. The client only needs "log in" and "run one command".

use std::future::Future;

use tokio::net::TcpStream;

use crate::error::TransportError;

/// Opens authenticated connections to a server console.
pub trait Connector: Send + Sync + 'static {
  type Connection: RconConnection;

  fn connect(
    &self,
    addr: &str,
    password: &str,
  ) -> impl Future<Output = Result<Self::Connection, TransportError>> + Send;
}

/// One live, authenticated console connection. Dropping it closes the socket.
pub trait RconConnection: Send + 'static {
  /// Send `command` and read the complete response.
  fn exec(&mut self, command: &str)
  -> impl Future<Output = Result<String, TransportError>> + Send;
}

/// TCP connector speaking the Source rcon protocol with Minecraft quirks.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
  type Connection = rcon::Connection<TcpStream>;

  async fn connect(&self, addr: &str, password: &str) -> Result<Self::Connection, TransportError> {
    let conn = <rcon::Connection<TcpStream>>::builder()
      .enable_minecraft_quirks(true)
      .connect(addr, password)
      .await?;
    Ok(conn)
  }
}

impl RconConnection for rcon::Connection<TcpStream> {
  async fn exec(&mut self, command: &str) -> Result<String, TransportError> {
    Ok(self.cmd(command).await?)
  }
}

impl From<rcon::Error> for TransportError {
  fn from(err: rcon::Error) -> Self {
    match err {
      rcon::Error::Auth => TransportError::Auth,
      rcon::Error::Io(err) => TransportError::Io(err),
      other => TransportError::Protocol(other.to_string()),
    }
  }
}
