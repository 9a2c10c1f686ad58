//! CLI configuration: thin wrapper around `towerwatch_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--gateway, --synthetic, --timeout).

use std::time::Duration;

use towerwatch_core::GatewaySettings;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use towerwatch_config::{Config, Profile, config_path, load_config, save_config};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Comma-separated, sorted profile names for help text.
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<&str> = config.profiles.keys().map(String::as_str).collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort_unstable();
    names.join(", ")
}

/// Build `GatewaySettings` from the config file, the active profile, and
/// CLI overrides. Flags win over profile values.
pub fn resolve_settings(global: &GlobalOpts) -> Result<GatewaySettings, CliError> {
    let cfg = load_config()?;
    let name = active_profile_name(global, &cfg);

    let mut settings = match cfg.profile(&name) {
        Some(profile) => profile.to_settings(&cfg.defaults)?,
        // An explicitly requested profile must exist; the implicit default
        // may be absent, in which case factory defaults apply.
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                available: available_profiles(&cfg),
                name,
            });
        }
        None => Profile::default().to_settings(&cfg.defaults)?,
    };

    if let Some(ref gateway) = global.gateway {
        settings.base_address.clone_from(gateway);
    }
    if global.synthetic {
        settings.synthetic = true;
    }
    if let Some(timeout) = global.timeout {
        if timeout == 0 {
            return Err(CliError::Validation {
                field: "timeout".into(),
                reason: "must be greater than zero".into(),
            });
        }
        settings.io_timeout = Duration::from_secs(timeout);
    }

    tracing::debug!(
        profile = %name,
        gateway = %settings.base_address,
        synthetic = settings.synthetic,
        "resolved gateway settings"
    );
    Ok(settings)
}
