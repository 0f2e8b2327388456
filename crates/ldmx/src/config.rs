//! CLI configuration: thin wrapper around `ldmx_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--profile, --host, --port, --timeout).

use ldmx_core::EngineConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use ldmx_config::{
    Config, ConfigError, Profile, config_path, load_config, load_config_or_default,
    profile_to_engine_config, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Build the `EngineConfig` for a command.
///
/// Flag overrides take priority over profile values. Without a matching
/// profile, `--host` alone is enough to address an engine.
pub fn resolve_engine_config(global: &GlobalOpts, config: &Config) -> Result<EngineConfig, CliError> {
    let (profile_name, base) = match (config.profile(global.profile.as_deref()), &global.host) {
        (Ok((name, profile)), _) => (name.to_owned(), profile.clone()),
        (Err(ConfigError::UnknownProfile { name }), Some(host)) => (name, Profile::new(host.clone())),
        (Err(ConfigError::UnknownProfile { name }), None) if global.profile.is_some() => {
            let mut names: Vec<_> = config.profiles.keys().cloned().collect();
            names.sort();
            return Err(CliError::ProfileNotFound {
                name,
                available: if names.is_empty() {
                    "(none)".into()
                } else {
                    names.join(", ")
                },
            });
        }
        (Err(ConfigError::UnknownProfile { .. }), None) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
        (Err(e), _) => return Err(e.into()),
    };

    let profile = apply_overrides(base, global);
    Ok(profile_to_engine_config(&profile, &profile_name)?)
}

fn apply_overrides(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if let Some(port) = global.port {
        profile.port = port;
    }
    if let Some(timeout) = global.timeout {
        profile.request_timeout = timeout;
    }
    profile
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut line = vec!["ldmx"];
        line.extend_from_slice(args);
        line.push("check");
        Cli::try_parse_from(line).unwrap().global
    }

    fn config_with(name: &str, profile: Profile) -> Config {
        let mut config = Config::default();
        config.profiles.insert(name.into(), profile);
        config
    }

    #[test]
    fn host_flag_works_without_config() {
        let engine = resolve_engine_config(&global(&["-H", "10.0.0.5"]), &Config::default()).unwrap();
        assert_eq!(engine.host, "10.0.0.5");
        assert_eq!(engine.port, 8056);
    }

    #[test]
    fn flags_override_profile() {
        let config = config_with("default", Profile::new("10.0.0.5"));
        let engine = resolve_engine_config(
            &global(&["--port", "9000", "--timeout", "0"]),
            &config,
        )
        .unwrap();
        assert_eq!(engine.host, "10.0.0.5");
        assert_eq!(engine.port, 9000);
        assert_eq!(engine.request_timeout, None);
        assert_eq!(engine.handshake_timeout, Duration::from_secs(5));
    }

    #[test]
    fn profile_keep_alive_survives_resolution() {
        let mut studio = Profile::new("10.0.0.5");
        studio.keep_alive = 30;
        let config = config_with("studio", studio);

        let engine = resolve_engine_config(&global(&["-p", "studio"]), &config).unwrap();
        assert_eq!(engine.keep_alive, Duration::from_secs(30));
    }

    #[test]
    fn unknown_profile_lists_available() {
        let config = config_with("studio", Profile::new("10.0.0.5"));
        let err = resolve_engine_config(&global(&["-p", "stage"]), &config).unwrap_err();
        match err {
            CliError::ProfileNotFound { name, available } => {
                assert_eq!(name, "stage");
                assert_eq!(available, "studio");
            }
            other => panic!("expected ProfileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn nothing_configured() {
        let err = resolve_engine_config(&global(&[]), &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::NoConfig { .. }));
    }
}
