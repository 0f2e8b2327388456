mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, OutputFormat};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    };

    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut global = cli.global;

    match cli.command {
        // Config commands don't need an engine connection
        Command::Config(args) => commands::config_cmd::handle(&args, &global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "ldmx", &mut std::io::stdout());
            Ok(())
        }

        // All other commands talk to an engine
        cmd => {
            let cfg = config::load_config()?;
            if global.output.is_none() {
                global.output = OutputFormat::from_str(&cfg.defaults.output, true).ok();
            }
            let engine_config = config::resolve_engine_config(&global, &cfg)?;

            tracing::debug!(command = ?cmd, host = %engine_config.host, "dispatching command");
            commands::dispatch(cmd, engine_config, &global).await
        }
    }
}
