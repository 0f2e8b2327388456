use std::io;

use thiserror::Error;

/// Top-level error type for the `ldmx-api` crate.
///
/// Only one failure crosses the connection boundary: a request that could
/// not be delivered even after a reconnect. Handshake and socket details are
/// folded into `reason` so `ldmx-core` can map them without knowing sockets.
#[derive(Debug, Error)]
pub enum Error {
    // ── Delivery ────────────────────────────────────────────────────
    /// Both the immediate attempt and the post-reconnect retry failed.
    #[error("Not connected to engine at {addr}: {reason}")]
    NotConnected { addr: String, reason: String },
}

impl Error {
    /// Returns `true` if this error means the engine is unreachable right now
    /// and a later attempt may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NotConnected { .. })
    }
}

// ── Reconnect failures (internal) ────────────────────────────────────

/// Why a single (re)connect attempt failed.
///
/// Never returned from public operations; callers only observe the
/// consequence (`is_connected() == false` or [`Error::NotConnected`]).
#[derive(Debug, Error)]
pub(crate) enum ReconnectError {
    #[error("socket error: {0}")]
    Io(#[from] io::Error),

    #[error("no welcome message within {timeout_secs}s")]
    HandshakeTimeout { timeout_secs: u64 },

    #[error("unexpected welcome message: {received:?}")]
    HandshakeMismatch { received: String },
}
