//! Config subcommand handlers.

use ldmx_config::ConfigError;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Profile};
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match &args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = match global.output_format() {
                OutputFormat::Json => serde_json::to_string_pretty(&cfg)?,
                OutputFormat::JsonCompact => serde_json::to_string(&cfg)?,
                OutputFormat::Table | OutputFormat::Plain => {
                    toml::to_string_pretty(&cfg).map_err(ConfigError::from)?
                }
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Init { force } => init(global, *force),
    }
}

/// Write a profile built from the global flags and make it the default.
///
/// With `--force`, other profiles already in the file are kept.
fn init(global: &GlobalOpts, force: bool) -> Result<(), CliError> {
    let path = config::config_path();
    if path.exists() && !force {
        return Err(CliError::ConfigExists {
            path: path.display().to_string(),
        });
    }

    let host = global.host.clone().ok_or_else(|| CliError::Validation {
        field: "host".into(),
        reason: "pass --host <HOST> to name the engine".into(),
    })?;
    let name = global.profile.clone().unwrap_or_else(|| "default".into());

    let mut profile = Profile::new(host);
    if let Some(port) = global.port {
        profile.port = port;
    }
    if let Some(timeout) = global.timeout {
        profile.request_timeout = timeout;
    }
    profile.validate(&name)?;

    let mut cfg = config::load_config_or_default();
    cfg.default_profile = Some(name.clone());
    cfg.profiles.insert(name, profile);
    config::save_config(&cfg)?;

    if !global.quiet {
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}
