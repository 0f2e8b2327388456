//! Command dispatch: bridges CLI args -> engine operations -> output formatting.

pub mod check;
pub mod config_cmd;
pub mod light;
pub mod monitor;

use std::time::Duration;

use ldmx_core::{Engine, EngineConfig};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an engine-bound command to the appropriate handler.
///
/// One-shot commands run without a heartbeat; handlers validate their
/// arguments before starting the engine, and the engine is always stopped
/// afterwards.
pub async fn dispatch(
    cmd: Command,
    config: EngineConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Command::Monitor(args) = cmd {
        return monitor::handle(config, args, global).await;
    }

    let engine = Engine::new(config.with_keep_alive(Duration::ZERO));
    let result = match cmd {
        Command::On(args) => light::turn_on(&engine, args, global).await,
        Command::Off(args) => light::turn_off(&engine, args, global).await,
        Command::State(args) => light::state(&engine, args, global).await,
        Command::Check => check::handle(&engine, global).await,
        // Handled before dispatch
        Command::Monitor(_) | Command::Config(_) | Command::Completions(_) => Ok(()),
    };
    engine.stop().await;
    result
}

/// Parse a `--transition` value in seconds.
pub(crate) fn transition(seconds: Option<f64>) -> Result<Option<Duration>, CliError> {
    seconds
        .map(|s| {
            Duration::try_from_secs_f64(s).map_err(|_| CliError::Validation {
                field: "transition".into(),
                reason: format!("{s} is not a non-negative number of seconds"),
            })
        })
        .transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn transition_seconds() {
        assert_eq!(transition(None).unwrap(), None);
        assert_eq!(
            transition(Some(1.5)).unwrap(),
            Some(Duration::from_millis(1500))
        );
        assert!(transition(Some(-1.0)).is_err());
        assert!(transition(Some(f64::NAN)).is_err());
    }
}
