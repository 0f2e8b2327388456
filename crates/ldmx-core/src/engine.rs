// ── Engine abstraction ──
//
// Entry point for consumers. Owns the single connection to one engine and
// hands out per-channel `Light` handles that share it.

use tokio::sync::watch;
use tracing::{debug, info};

use ldmx_api::protocol::OK_REPLY;
use ldmx_api::{Connection, ConnectionState, Connector, TcpConnector};

use crate::command::Command;
use crate::config::EngineConfig;
use crate::error::{CoreError, SendError};
use crate::light::Light;
use crate::model::Channel;

/// A Lumize DMX Engine 2.
///
/// Cheaply cloneable; clones share the connection. Call [`stop`](Self::stop)
/// once when done, before dropping the last handle.
pub struct Engine<C: Connector = TcpConnector> {
    config: EngineConfig,
    connection: Connection<C>,
}

impl<C: Connector> Clone for Engine<C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            connection: self.connection.clone(),
        }
    }
}

impl Engine {
    /// Create a handle for the engine described by `config`. Does NOT
    /// connect; call [`start`](Self::start).
    pub fn new(config: EngineConfig) -> Self {
        Self::with_connector(config, TcpConnector)
    }
}

impl<C: Connector> Engine<C> {
    pub fn with_connector(config: EngineConfig, connector: C) -> Self {
        let connection = Connection::with_connector(config.to_connection_config(), connector);
        Self { config, connection }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Connect and start the heartbeat (if configured). An unreachable
    /// engine is not an error here; the first command retries.
    pub async fn start(&self) {
        info!(
            host = %self.config.host,
            port = self.config.port,
            keep_alive_secs = self.config.keep_alive.as_secs(),
            "starting engine connection"
        );
        self.connection.start().await;
    }

    /// Stop the heartbeat and close the connection. Idempotent.
    pub async fn stop(&self) {
        debug!(host = %self.config.host, "stopping engine connection");
        self.connection.stop().await;
    }

    // ── Channels ─────────────────────────────────────────────────────

    /// Handle for `channel`. Fails with [`CoreError::WrongChannel`] outside
    /// `0..512` without touching the network.
    pub fn light(&self, channel: u16) -> Result<Light<C>, CoreError> {
        let channel = Channel::new(channel)?;
        Ok(Light::new(self.connection.clone(), channel))
    }

    // ── Connection state ─────────────────────────────────────────────

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Receiver that yields every availability change.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.connection.subscribe()
    }

    /// Round-trip a `conncheck`. `Ok(false)` means the engine answered, but
    /// not with `ok`.
    pub async fn check(&self) -> Result<bool, SendError> {
        let reply = self.connection.request(&Command::ConnCheck.encode()).await?;
        debug!(reply = %reply, "conncheck answered");
        Ok(reply == OK_REPLY)
    }
}
