// ── Runtime engine configuration ──
//
// Describes *where* the engine is and how the connection is tuned. Never
// touches disk; the CLI (or any other front end) builds an `EngineConfig`
// and hands it to `Engine::new`.

use std::time::Duration;

use ldmx_api::ConnectionConfig;
use ldmx_api::protocol::DEFAULT_PORT;

/// Configuration for one Lumize DMX Engine 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Engine host name or IP address.
    pub host: String,
    /// Engine TCP port (8056 unless reconfigured on the device).
    pub port: u16,
    /// Heartbeat interval. Zero disables the heartbeat.
    pub keep_alive: Duration,
    /// Time allowed for the welcome banner after connecting.
    pub handshake_timeout: Duration,
    /// Time allowed for one command round trip. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl EngineConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    /// Translate into the transport-level config.
    pub fn to_connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            host: self.host.clone(),
            port: self.port,
            keep_alive: self.keep_alive,
            handshake_timeout: self.handshake_timeout,
            request_timeout: self.request_timeout,
        }
    }
}

impl Default for EngineConfig {
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
