//! Config subcommand handlers. None of these touch the gateway.

use dialoguer::{Confirm, Input};
use serde::Serialize;
use tabled::Tabled;

use towerwatch_core::{DEFAULT_BASE_ADDRESS, GatewayConfig};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Validate an address and return it in the form stored in profiles.
fn normalized_gateway(address: &str) -> Result<String, CliError> {
    let url = GatewayConfig::new(address, false)?.base_address();
    Ok(url.as_str().trim_end_matches('/').to_owned())
}

fn save(cfg: &Config, global: &GlobalOpts, what: &str) -> Result<(), CliError> {
    let path = config::save_config(cfg)?;
    output::notice(
        &format!("{what} (saved to {})", path.display()),
        global.quiet,
        output::should_color(global.color),
    );
    Ok(())
}

#[derive(Clone, Serialize, Tabled)]
struct ProfileRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Gateway")]
    gateway: String,
    #[tabled(rename = "Synthetic")]
    synthetic: bool,
    #[tabled(rename = "Interval")]
    interval: String,
    #[tabled(rename = "Default")]
    #[serde(rename = "default")]
    is_default: &'static str,
}

fn profile_rows(cfg: &Config) -> Vec<ProfileRow> {
    let active = cfg.active_profile_name(None);
    let mut rows: Vec<ProfileRow> = cfg
        .profiles
        .iter()
        .map(|(name, p)| ProfileRow {
            name: name.clone(),
            gateway: p.gateway.clone(),
            synthetic: p.synthetic,
            interval: format!(
                "{}ms",
                p.poll_interval_ms.unwrap_or(cfg.defaults.poll_interval_ms)
            ),
            is_default: if *name == active { "*" } else { "" },
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    rows
}

// ── Init ────────────────────────────────────────────────────────────

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load_config()?;
    let suggested_gateway = global.gateway.as_deref().unwrap_or(DEFAULT_BASE_ADDRESS);

    let (name, gateway, synthetic) = if global.yes {
        (
            global.profile.clone().unwrap_or_else(|| "default".into()),
            suggested_gateway.to_owned(),
            global.synthetic,
        )
    } else {
        eprintln!("towerwatch configuration");
        eprintln!("  Config path: {}\n", config::config_path().display());

        let name: String = Input::new()
            .with_prompt("Profile name")
            .default(global.profile.clone().unwrap_or_else(|| "default".into()))
            .interact_text()
            .map_err(prompt_err)?;
        let gateway: String = Input::new()
            .with_prompt("Gateway address")
            .default(suggested_gateway.to_owned())
            .interact_text()
            .map_err(prompt_err)?;
        let synthetic = Confirm::new()
            .with_prompt("Use the demo fleet instead of a gateway?")
            .default(global.synthetic)
            .interact()
            .map_err(prompt_err)?;
        (name, gateway, synthetic)
    };

    let profile = Profile {
        gateway: normalized_gateway(&gateway)?,
        synthetic,
        ..Profile::default()
    };
    cfg.profiles.insert(name.clone(), profile);
    cfg.default_profile = Some(name.clone());

    save(&cfg, global, &format!("Profile '{name}' created and set as default"))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = if global.output == OutputFormat::Table {
                toml::to_string_pretty(&cfg).map_err(|e| CliError::Validation {
                    field: "config".into(),
                    reason: format!("failed to render config: {e}"),
                })?
            } else {
                output::render_single(global.output, &cfg, |_| String::new(), |c| {
                    c.active_profile_name(global.profile.as_deref())
                })
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::SetGateway { address } => {
            let gateway = normalized_gateway(&address)?;
            let mut cfg = config::load_config()?;
            let name = config::active_profile_name(global, &cfg);
            cfg.profile_mut(&name).gateway.clone_from(&gateway);
            save(&cfg, global, &format!("Profile '{name}' now uses {gateway}"))
        }

        ConfigCommand::SetSynthetic { enabled } => {
            let mut cfg = config::load_config()?;
            let name = config::active_profile_name(global, &cfg);
            cfg.profile_mut(&name).synthetic = enabled;
            let state = if enabled { "enabled" } else { "disabled" };
            save(&cfg, global, &format!("Demo fleet {state} for profile '{name}'"))
        }

        ConfigCommand::SetInterval { ms } => {
            if ms == 0 {
                return Err(CliError::Validation {
                    field: "interval".into(),
                    reason: "must be greater than zero".into(),
                });
            }
            let mut cfg = config::load_config()?;
            let name = config::active_profile_name(global, &cfg);
            cfg.profile_mut(&name).poll_interval_ms = Some(ms);
            save(&cfg, global, &format!("Profile '{name}' polls every {ms}ms"))
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;
            if let Err(e) = cfg.set_default_profile(&name) {
                return Err(match e {
                    towerwatch_config::ConfigError::UnknownProfile { name } => {
                        CliError::ProfileNotFound {
                            available: config::available_profiles(&cfg),
                            name,
                        }
                    }
                    other => other.into(),
                });
            }
            save(&cfg, global, &format!("Default profile is now '{name}'"))
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config()?;
            let rows = profile_rows(&cfg);
            let out = output::render_list(
                global.output,
                &rows,
                ProfileRow::clone,
                |r| r.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
