//! Clap derive structures for the `ldmx` CLI.
//!
//! Defines the command tree, global flags, and shared output types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ldmx -- control Lumize DMX Engine 2 lighting channels
#[derive(Debug, Parser)]
#[command(
    name = "ldmx",
    version,
    about = "Control Lumize DMX Engine 2 lighting channels from the command line",
    long_about = "Switch, dim and query DMX channels on a Lumize DMX Engine 2.\n\n\
        Engines are addressed by a named profile from the config file, or\n\
        directly with --host/--port.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Engine profile to use
    #[arg(long, short = 'p', env = "LDMX_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Engine host (overrides profile)
    #[arg(long, short = 'H', env = "LDMX_HOST", global = true)]
    pub host: Option<String>,

    /// Engine TCP port (overrides profile)
    #[arg(long, env = "LDMX_PORT", global = true)]
    pub port: Option<u16>,

    /// Reply timeout in seconds, 0 to wait indefinitely (overrides profile)
    #[arg(long, env = "LDMX_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "LDMX_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

impl GlobalOpts {
    /// Selected output format, falling back to a table.
    pub fn output_format(&self) -> OutputFormat {
        self.output.clone().unwrap_or(OutputFormat::Table)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one record per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Turn a channel on
    On(OnArgs),

    /// Turn a channel off
    Off(OffArgs),

    /// Show the current state of one or more channels
    #[command(alias = "st")]
    State(StateArgs),

    /// Verify the engine answers a connection check
    Check,

    /// Watch engine availability until interrupted
    Monitor(MonitorArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Channel commands ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct OnArgs {
    /// DMX channel (0-511)
    pub channel: u16,

    /// Brightness level (0-255)
    #[arg(long, short = 'b')]
    pub brightness: Option<u8>,

    /// Fade time in seconds
    #[arg(long, short = 't')]
    pub transition: Option<f64>,
}

#[derive(Debug, Args)]
pub struct OffArgs {
    /// DMX channel (0-511)
    pub channel: u16,

    /// Fade time in seconds
    #[arg(long, short = 't')]
    pub transition: Option<f64>,
}

#[derive(Debug, Args)]
pub struct StateArgs {
    /// DMX channels to query (0-511)
    #[arg(required = true, num_args = 1..)]
    pub channels: Vec<u16>,
}

#[derive(Debug, Args)]
pub struct MonitorArgs {
    /// Seconds between connection checks [default: profile keep_alive, else 10]
    #[arg(long, short = 'i', value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a config file with one profile built from --profile/--host/--port
    Init {
        /// Rewrite an existing config file, keeping its other profiles
        #[arg(long)]
        force: bool,
    },

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
