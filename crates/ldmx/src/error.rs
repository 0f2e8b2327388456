//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use ldmx_config::ConfigError;
use ldmx_core::{ConnectionError, CoreError, SendError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONNECTION: i32 = 7;
    pub const PROTOCOL: i32 = 9;
    pub const CONFIG: i32 = 10;
}

#[derive(Debug, Error, Diagnostic)]
#[allow(unused_assignments)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the engine at {addr}")]
    #[diagnostic(
        code(ldmx::connection_failed),
        help(
            "Check that the engine is powered on and reachable on the network.\n\
             Cause: {reason}\n\
             Try: ldmx check -v"
        )
    )]
    ConnectionFailed { addr: String, reason: String },

    // ── Protocol ─────────────────────────────────────────────────────
    #[error("Unexpected reply from engine: {message}")]
    #[diagnostic(
        code(ldmx::protocol),
        help("The device answered, but not the way a Lumize DMX Engine 2 does. Verify --host/--port.")
    )]
    Protocol { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Channel {channel} does not exist")]
    #[diagnostic(
        code(ldmx::wrong_channel),
        help("DMX channels are numbered 0 through 511.")
    )]
    WrongChannel { channel: u16 },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ldmx::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(ldmx::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: ldmx config init --profile {name} --host <HOST>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No engine configured")]
    #[diagnostic(
        code(ldmx::no_config),
        help(
            "Pass --host, or create a config with: ldmx config init --host <HOST>\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(ldmx::config_exists),
        help("Use --force to overwrite {path}")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(ldmx::config))]
    Config(#[from] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(ldmx::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Protocol { .. } => exit_code::PROTOCOL,
            Self::WrongChannel { .. } | Self::Validation { .. } => exit_code::USAGE,
            Self::ProfileNotFound { .. }
            | Self::NoConfig { .. }
            | Self::ConfigExists { .. }
            | Self::Config(_) => exit_code::CONFIG,
            Self::Io(_) | Self::Json(_) => exit_code::GENERAL,
        }
    }
}

// ── Core → CliError mapping ──────────────────────────────────────────

impl From<SendError> for CliError {
    fn from(err: SendError) -> Self {
        match err {
            SendError::NotConnected(ConnectionError::NotConnected { addr, reason }) => {
                Self::ConnectionFailed { addr, reason }
            }
            SendError::UnexpectedReply { command, reply } => Self::Protocol {
                message: format!("`{command}` was answered with {reply:?}"),
            },
            SendError::MalformedState { reply, reason } => Self::Protocol {
                message: format!("state reply {reply:?} ({reason})"),
            },
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::WrongChannel { channel } => Self::WrongChannel { channel },
            CoreError::Send(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_failures_exit_with_connection_code() {
        let err: CliError = SendError::NotConnected(ConnectionError::NotConnected {
            addr: "10.0.0.5:8056".into(),
            reason: "refused".into(),
        })
        .into();
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
        assert!(err.to_string().contains("10.0.0.5:8056"));
    }

    #[test]
    fn bad_replies_exit_with_protocol_code() {
        let err: CliError = CoreError::Send(SendError::UnexpectedReply {
            command: "on,1".into(),
            reply: "nope".into(),
        })
        .into();
        assert_eq!(err.exit_code(), exit_code::PROTOCOL);
    }

    #[test]
    fn wrong_channel_is_a_usage_error() {
        let err: CliError = CoreError::WrongChannel { channel: 512 }.into();
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}
