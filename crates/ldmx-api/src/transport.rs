// Transport configuration and the stream factory used by `Connection`.
//
// `Connection` never opens sockets itself; it asks a `Connector` for a fresh
// byte stream on every (re)connect. Production code uses `TcpConnector`,
// tests substitute in-memory streams.

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use crate::protocol::DEFAULT_PORT;

/// Connection tuning shared by the request path and the heartbeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Engine host name or IP address.
    pub host: String,
    /// Engine TCP port.
    pub port: u16,
    /// Period between heartbeat probes. `Duration::ZERO` disables the heartbeat.
    pub keep_alive: Duration,
    /// How long to wait for the welcome banner after connecting.
    pub handshake_timeout: Duration,
    /// Upper bound on one write+read exchange. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl ConnectionConfig {
    /// Config for `host:port` with the heartbeat disabled and default timeouts.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Enable the heartbeat with the given probe interval.
    pub fn with_keep_alive(mut self, interval: Duration) -> Self {
        self.keep_alive = interval;
        self
    }

    /// `host:port` as shown in logs and errors.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether a heartbeat loop should run.
    pub fn heartbeat_enabled(&self) -> bool {
        !self.keep_alive.is_zero()
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: DEFAULT_PORT,
            keep_alive: Duration::ZERO,
            handshake_timeout: Duration::from_secs(5),
            request_timeout: Some(Duration::from_secs(5)),
        }
    }
}

// ── Connector ────────────────────────────────────────────────────────

/// Opens the byte stream a [`Connection`](crate::Connection) talks over.
pub trait Connector: Send + Sync + 'static {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    /// Open a new stream to `host:port`.
    fn connect(&self, host: &str, port: u16)
    -> impl Future<Output = io::Result<Self::Stream>> + Send;
}

/// Plain TCP, with Nagle disabled since every command is a tiny write
/// followed by a read.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn connect(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = io::Result<Self::Stream>> + Send {
        let host = host.to_owned();
        async move {
            let stream = TcpStream::connect((host.as_str(), port)).await?;
            stream.set_nodelay(true)?;
            Ok(stream)
        }
    }
}
