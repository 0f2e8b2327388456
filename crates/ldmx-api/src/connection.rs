//! Self-healing connection to a Lumize DMX Engine 2.
//!
//! A [`Connection`] owns exactly one stream to the engine. Every
//! [`request`](Connection::request) is a critical section over that stream:
//! send, receive, and (on failure) one reconnect plus one retry all happen
//! under the same lock, so commands from concurrent callers and the heartbeat
//! never interleave on the wire.
//!
//! ```rust,ignore
//! use ldmx_api::{Connection, ConnectionConfig};
//!
//! let conn = Connection::new(ConnectionConfig::new("192.168.1.50", 8056));
//! conn.start().await;
//! let reply = conn.request("sreq,4").await?;
//! conn.stop().await;
//! ```

use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::error::{Error, ReconnectError};
use crate::protocol::{
    CONNCHECK_MESSAGE, OK_REPLY, RESPONSE_BUFFER_SIZE, WELCOME_MESSAGE, WELCOME_SLACK,
};
use crate::transport::{ConnectionConfig, Connector, TcpConnector};

// ── ConnectionState ──────────────────────────────────────────────────

/// Last known link state, observable without touching the socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

// ── Connection ───────────────────────────────────────────────────────

/// Handle to the engine connection.
///
/// Cheaply cloneable via `Arc<ConnectionInner>`; all clones share the same
/// socket, state and heartbeat. Call [`stop`](Self::stop) before dropping the
/// last handle, otherwise a running heartbeat keeps the connection alive.
pub struct Connection<C: Connector = TcpConnector> {
    inner: Arc<ConnectionInner<C>>,
}

struct ConnectionInner<C: Connector> {
    config: ConnectionConfig,
    connector: C,
    /// `None` until the first successful handshake and after `stop()`.
    socket: Mutex<Option<C::Stream>>,
    state: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
    heartbeat: Mutex<Option<JoinHandle<()>>>,
}

impl<C: Connector> Clone for Connection<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Connection {
    /// Create a TCP connection handle. Does NOT connect; call
    /// [`start`](Self::start).
    pub fn new(config: ConnectionConfig) -> Self {
        Self::with_connector(config, TcpConnector)
    }
}

impl<C: Connector> Connection<C> {
    /// Create a connection handle that opens streams through `connector`.
    pub fn with_connector(config: ConnectionConfig, connector: C) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);

        Self {
            inner: Arc::new(ConnectionInner {
                config,
                connector,
                socket: Mutex::new(None),
                state,
                cancel: CancellationToken::new(),
                heartbeat: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.inner.config
    }

    /// `host:port` of the engine.
    pub fn addr(&self) -> String {
        self.inner.config.addr()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Attempt the first connection and spawn the heartbeat if enabled.
    ///
    /// A failed first connection is logged, not returned: the connection
    /// starts out disconnected and the next request retries.
    pub async fn start(&self) {
        {
            // Checked under the lock; a racing `stop` may have closed the socket.
            let mut socket = self.inner.socket.lock().await;
            if self.inner.cancel.is_cancelled() {
                warn!(addr = %self.addr(), "start() called after stop(), ignoring");
                return;
            }
            if let Err(e) = self.reconnect_locked(&mut socket).await {
                warn!(addr = %self.addr(), error = %e, "first connection to engine unsuccessful");
            }
        }

        if !self.inner.config.heartbeat_enabled() {
            return;
        }

        let mut heartbeat = self.inner.heartbeat.lock().await;
        if self.inner.cancel.is_cancelled() {
            return;
        }
        if heartbeat.is_some() {
            debug!("heartbeat already running");
            return;
        }

        let conn = self.clone();
        let interval = self.inner.config.keep_alive;
        let cancel = self.inner.cancel.clone();
        *heartbeat = Some(tokio::spawn(heartbeat_loop(conn, interval, cancel)));
    }

    /// Stop the heartbeat, wait for it to exit, then close the socket.
    ///
    /// Idempotent, and safe before `start()` or when no connection was
    /// ever established.
    pub async fn stop(&self) {
        self.inner.cancel.cancel();

        let handle = self.inner.heartbeat.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "heartbeat task ended abnormally");
            }
        }

        let mut socket = self.inner.socket.lock().await;
        if let Some(mut stream) = socket.take() {
            info!(addr = %self.addr(), "closing connection to engine");
            // Close errors are irrelevant: the stream is dropped either way.
            let _ = stream.shutdown().await;
        }
        self.set_state(ConnectionState::Disconnected);
    }

    // ── State observation ────────────────────────────────────────────

    /// Last known connected flag. Never blocks on the socket.
    pub fn is_connected(&self) -> bool {
        *self.inner.state.borrow() == ConnectionState::Connected
    }

    /// Subscribe to connection state changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Send `message` and return the engine's reply, trimmed.
    ///
    /// At most two exchanges: one on the current socket and, if that fails
    /// with an I/O error, one more after a single reconnect. The socket lock
    /// is held for the whole sequence.
    pub async fn request(&self, message: &str) -> Result<String, Error> {
        let mut socket = self.inner.socket.lock().await;

        let first_error = match self.exchange(&mut socket, message).await {
            Ok(reply) => {
                trace!(message, reply = %reply, "request answered");
                return Ok(reply);
            }
            Err(e) => e,
        };

        self.set_state(ConnectionState::Disconnected);
        debug!(message, error = %first_error, "request failed, reconnecting");

        if let Err(e) = self.reconnect_locked(&mut socket).await {
            return Err(self.not_connected(&e));
        }

        match self.exchange(&mut socket, message).await {
            Ok(reply) => {
                trace!(message, reply = %reply, "request answered after reconnect");
                Ok(reply)
            }
            Err(e) => {
                self.set_state(ConnectionState::Disconnected);
                socket.take();
                Err(self.not_connected(&e))
            }
        }
    }

    /// Send a `conncheck` probe. `Ok(true)` if the engine answered `ok`.
    pub async fn check(&self) -> Result<bool, Error> {
        let reply = self.request(CONNCHECK_MESSAGE).await?;
        Ok(reply == OK_REPLY)
    }

    /// One write+read on the current stream, bounded by `request_timeout`.
    async fn exchange(&self, socket: &mut Option<C::Stream>, message: &str) -> io::Result<String> {
        let stream = socket
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "no open socket"))?;

        let round_trip = async {
            stream.write_all(message.as_bytes()).await?;
            stream.flush().await?;

            let mut buf = [0u8; RESPONSE_BUFFER_SIZE];
            let n = stream.read(&mut buf).await?;
            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "engine closed the connection",
                ));
            }
            Ok(String::from_utf8_lossy(&buf[..n]).trim().to_owned())
        };

        match self.inner.config.request_timeout {
            Some(limit) => tokio::time::timeout(limit, round_trip)
                .await
                .map_err(|_| timed_out("no reply", limit))?,
            None => round_trip.await,
        }
    }

    // ── Reconnection ─────────────────────────────────────────────────

    /// Acquire the socket lock and reconnect.
    async fn reconnect(&self) -> Result<(), ReconnectError> {
        let mut socket = self.inner.socket.lock().await;
        self.reconnect_locked(&mut socket).await
    }

    /// Replace the stream with a freshly handshaken one.
    ///
    /// Takes the already-held socket slot, so `request` can reconnect inside
    /// its own critical section without re-entering the lock.
    async fn reconnect_locked(&self, socket: &mut Option<C::Stream>) -> Result<(), ReconnectError> {
        // The old stream is dropped (closed) before anything else happens.
        socket.take();
        self.set_state(ConnectionState::Disconnected);

        info!(addr = %self.addr(), "connecting to engine");

        match self.open_and_handshake().await {
            Ok(stream) => {
                *socket = Some(stream);
                self.set_state(ConnectionState::Connected);
                info!(addr = %self.addr(), "connected to engine");
                Ok(())
            }
            Err(e) => {
                warn!(addr = %self.addr(), error = %e, "connection to engine failed");
                Err(e)
            }
        }
    }

    /// Connect and verify the welcome banner. The stream is dropped on any
    /// failure.
    async fn open_and_handshake(&self) -> Result<C::Stream, ReconnectError> {
        let config = &self.inner.config;
        let mut stream = self
            .inner
            .connector
            .connect(&config.host, config.port)
            .await?;

        let mut buf = [0u8; WELCOME_MESSAGE.len() + WELCOME_SLACK];
        let n = tokio::time::timeout(config.handshake_timeout, stream.read(&mut buf))
            .await
            .map_err(|_| ReconnectError::HandshakeTimeout {
                timeout_secs: config.handshake_timeout.as_secs(),
            })??;

        if &buf[..n] != WELCOME_MESSAGE {
            return Err(ReconnectError::HandshakeMismatch {
                received: String::from_utf8_lossy(&buf[..n]).into_owned(),
            });
        }

        Ok(stream)
    }

    // ── Heartbeat ────────────────────────────────────────────────────

    /// One heartbeat iteration. Failures only trigger a reconnect attempt.
    async fn probe(&self) {
        debug!(addr = %self.addr(), "checking engine connection");

        match self.check().await {
            Ok(true) => trace!("engine answered conncheck"),
            Ok(false) => {
                warn!("unexpected conncheck reply, reconnecting");
                // Failure already logged; the next cycle retries.
                let _ = self.reconnect().await;
            }
            Err(e) => {
                warn!(error = %e, "conncheck failed, reconnecting");
                let _ = self.reconnect().await;
            }
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────

    /// Publish `state`, notifying subscribers only on an actual change.
    fn set_state(&self, state: ConnectionState) {
        self.inner.state.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
    }

    fn not_connected(&self, cause: &dyn std::error::Error) -> Error {
        Error::NotConnected {
            addr: self.addr(),
            reason: cause.to_string(),
        }
    }
}

fn timed_out(what: &str, limit: Duration) -> io::Error {
    io::Error::new(
        io::ErrorKind::TimedOut,
        format!("{what} within {}ms", limit.as_millis()),
    )
}

// ── Background heartbeat loop ────────────────────────────────────────

/// Probe, then wait `interval`; exit as soon as `cancel` fires, even in the
/// middle of a probe.
async fn heartbeat_loop<C: Connector>(
    conn: Connection<C>,
    interval: Duration,
    cancel: CancellationToken,
) {
    debug!(interval_secs = interval.as_secs_f64(), "heartbeat started");

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = conn.probe() => {}
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(interval) => {}
        }
    }

    debug!("heartbeat stopped");
}

// ── Tests ────────────────────────────────────────────────────────────
