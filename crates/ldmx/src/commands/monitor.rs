//! Availability monitor: runs the heartbeat and prints every connection
//! state change until Ctrl-C.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

use ldmx_core::{ConnectionState, Engine, EngineConfig};

use crate::cli::{GlobalOpts, MonitorArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct StateEvent<'a> {
    engine: &'a str,
    state: &'static str,
}

fn state_name(state: ConnectionState) -> &'static str {
    match state {
        ConnectionState::Connected => "connected",
        ConnectionState::Disconnected => "disconnected",
    }
}

/// Heartbeat period: `--interval`, else the profile's `keep_alive`, else 10s.
fn heartbeat_interval(flag: Option<u64>, keep_alive: Duration) -> Duration {
    match flag {
        Some(secs) => Duration::from_secs(secs),
        None if !keep_alive.is_zero() => keep_alive,
        None => DEFAULT_INTERVAL,
    }
}

pub async fn handle(
    config: EngineConfig,
    args: MonitorArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let interval = heartbeat_interval(args.interval, config.keep_alive);
    debug!(interval_secs = interval.as_secs(), "monitoring engine");
    let engine = Engine::new(config.with_keep_alive(interval));
    let states = engine.connection_state();

    engine.start().await;
    let result = watch_states(&engine, states, global).await;
    engine.stop().await;
    result
}

async fn watch_states(
    engine: &Engine,
    mut states: watch::Receiver<ConnectionState>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let addr = format!("{}:{}", engine.config().host, engine.config().port);
    let format = global.output_format();
    let color = output::should_color(&global.color);

    let initial = *states.borrow_and_update();
    emit(&format, &addr, initial, color, global.quiet)?;

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                debug!("interrupted, stopping monitor");
                return Ok(());
            }
            changed = states.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let state = *states.borrow_and_update();
                emit(&format, &addr, state, color, global.quiet)?;
            }
        }
    }
}

fn emit(
    format: &OutputFormat,
    addr: &str,
    state: ConnectionState,
    color: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let event = StateEvent {
        engine: addr,
        state: state_name(state),
    };
    // One record per line, so pretty JSON is emitted compact here as well.
    let format = match format {
        OutputFormat::Json => &OutputFormat::JsonCompact,
        other => other,
    };
    let out = output::render_single(
        format,
        &event,
        |e| {
            let good = state == ConnectionState::Connected;
            format!("{} {}", e.engine, output::status(e.state, good, color))
        },
        |e| e.state.to_owned(),
    )?;
    output::print_output(&out, quiet);
    Ok(())
}
