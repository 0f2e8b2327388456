//! Channel command handlers: on, off, state.

use serde::Serialize;
use tabled::Tabled;

use ldmx_core::{Channel, Engine, Light};

use crate::cli::{GlobalOpts, OffArgs, OnArgs, StateArgs};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChannelState {
    channel: Channel,
    is_on: bool,
    brightness: u8,
}

#[derive(Tabled)]
struct StateRow {
    #[tabled(rename = "Channel")]
    channel: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Brightness")]
    brightness: String,
    #[tabled(rename = "Level")]
    level: String,
}

impl StateRow {
    fn new(s: &ChannelState, color: bool) -> Self {
        Self {
            channel: s.channel.to_string(),
            state: output::status(on_off(s.is_on), s.is_on, color),
            brightness: s.brightness.to_string(),
            level: format!("{}%", percent(s.brightness)),
        }
    }
}

fn on_off(is_on: bool) -> &'static str {
    if is_on { "on" } else { "off" }
}

/// 0-255 scaled to 0-100, rounded.
fn percent(brightness: u8) -> u32 {
    (u32::from(brightness) * 100 + 127) / 255
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn turn_on(engine: &Engine, args: OnArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let light = engine.light(args.channel)?;
    let transition = super::transition(args.transition)?;

    engine.start().await;
    light.turn_on(args.brightness, transition).await?;

    if !global.quiet {
        eprintln!("Channel {} on", light.channel());
    }
    Ok(())
}

pub async fn turn_off(engine: &Engine, args: OffArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let light = engine.light(args.channel)?;
    let transition = super::transition(args.transition)?;

    engine.start().await;
    light.turn_off(transition).await?;

    if !global.quiet {
        eprintln!("Channel {} off", light.channel());
    }
    Ok(())
}

pub async fn state(engine: &Engine, args: StateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let lights = args
        .channels
        .iter()
        .map(|&ch| engine.light(ch))
        .collect::<Result<Vec<Light>, _>>()?;

    engine.start().await;

    let mut states = Vec::with_capacity(lights.len());
    for light in &lights {
        let reply = light.get_state().await?;
        states.push(ChannelState {
            channel: light.channel(),
            is_on: reply.is_on,
            brightness: reply.brightness,
        });
    }

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output_format(),
        &states,
        |s| StateRow::new(s, color),
        |s| format!("{} {} {}", s.channel, on_off(s.is_on), s.brightness),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
