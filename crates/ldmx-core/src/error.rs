// ── Core error types ──
//
// User-facing errors from ldmx-core. Socket and handshake details never
// surface here; a connection failure arrives already folded into
// `ldmx_api::Error::NotConnected` and is wrapped as a `SendError`.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Addressing ───────────────────────────────────────────────────
    #[error("Channel {channel} does not exist (valid channels are 0-511)")]
    WrongChannel { channel: u16 },

    // ── Request-time failures ────────────────────────────────────────
    #[error(transparent)]
    Send(#[from] SendError),
}

/// A command that did not complete successfully.
///
/// The only error a [`Light`](crate::Light) operation returns. Never carries
/// a partially parsed result.
#[derive(Debug, Error)]
pub enum SendError {
    /// The engine could not be reached even after one reconnect.
    #[error(transparent)]
    NotConnected(#[from] ldmx_api::Error),

    /// The engine answered something other than `ok`.
    #[error("Engine rejected `{command}`: replied {reply:?}")]
    UnexpectedReply { command: String, reply: String },

    /// A state reply that does not match `sres,<channel>,<flag>-<brightness>`.
    #[error("Malformed state reply {reply:?}: {reason}")]
    MalformedState { reply: String, reason: String },
}

impl SendError {
    /// Returns `true` if the failure was a connectivity problem rather than
    /// a bad reply.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::NotConnected(_))
    }
}

impl CoreError {
    /// Returns `true` if the failure was a connectivity problem.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Send(e) if e.is_connection())
    }
}
