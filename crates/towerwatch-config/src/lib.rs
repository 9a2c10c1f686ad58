//! Profile configuration for towerwatch.
//!
//! TOML profiles, layered loading (defaults, file, environment), saving,
//! and translation to `towerwatch_core::GatewaySettings`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use towerwatch_core::{DEFAULT_BASE_ADDRESS, GatewaySettings};

/// Prefix for environment overrides. Nested keys use `__`
/// (`TOWERWATCH_DEFAULTS__OUTPUT=json`).
pub const ENV_PREFIX: &str = "TOWERWATCH_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named gateway profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the active profile: explicit choice, else the configured
    /// default, else `"default"`.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    /// The named profile, or `None` if it is not defined.
    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    /// The named profile, created with defaults if missing.
    pub fn profile_mut(&mut self, name: &str) -> &mut Profile {
        self.profiles.entry(name.to_owned()).or_default()
    }

    /// Make an existing profile the default.
    pub fn set_default_profile(&mut self, name: &str) -> Result<(), ConfigError> {
        if !self.profiles.contains_key(name) {
            return Err(ConfigError::UnknownProfile { name: name.into() });
        }
        self.default_profile = Some(name.into());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_poll_interval_ms() -> u64 {
    5000
}

/// A named gateway profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Gateway base address (e.g., "http://192.168.4.1").
    #[serde(default = "default_gateway")]
    pub gateway: String,

    /// Serve the built-in demo fleet.
    #[serde(default)]
    pub synthetic: bool,

    /// Override the polling interval.
    pub poll_interval_ms: Option<u64>,

    /// Override the request timeout (seconds).
    pub timeout: Option<u64>,

    /// Override the connect timeout (seconds).
    pub connect_timeout: Option<u64>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            gateway: default_gateway(),
            synthetic: false,
            poll_interval_ms: None,
            timeout: None,
            connect_timeout: None,
        }
    }
}

fn default_gateway() -> String {
    DEFAULT_BASE_ADDRESS.into()
}

impl Profile {
    /// Build core settings, filling unset overrides from `defaults`.
    pub fn to_settings(&self, defaults: &Defaults) -> Result<GatewaySettings, ConfigError> {
        let poll_interval_ms = self.poll_interval_ms.unwrap_or(defaults.poll_interval_ms);
        if poll_interval_ms == 0 {
            return Err(ConfigError::Validation {
                field: "poll_interval_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }

        let base = GatewaySettings::default();
        Ok(GatewaySettings {
            base_address: self.gateway.clone(),
            synthetic: self.synthetic,
            poll_interval: Duration::from_millis(poll_interval_ms),
            connect_timeout: self
                .connect_timeout
                .map_or(base.connect_timeout, Duration::from_secs),
            io_timeout: Duration::from_secs(self.timeout.unwrap_or(defaults.timeout)),
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "towerwatch", "towerwatch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("towerwatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file path. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file is missing or broken.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn profile_inherits_defaults() {
        let settings = Profile::default().to_settings(&Defaults::default()).unwrap();
        assert_eq!(settings.base_address, "http://192.168.4.1");
        assert_eq!(settings.poll_interval, Duration::from_millis(5000));
        assert_eq!(settings.io_timeout, Duration::from_secs(30));
        assert_eq!(settings.connect_timeout, Duration::from_secs(10));
        assert!(!settings.synthetic);
    }

    #[test]
    fn profile_overrides_win() {
        let profile = Profile {
            gateway: "10.0.0.8".into(),
            synthetic: true,
            poll_interval_ms: Some(750),
            timeout: Some(5),
            connect_timeout: Some(2),
        };
        let settings = profile.to_settings(&Defaults::default()).unwrap();
        assert_eq!(settings.poll_interval, Duration::from_millis(750));
        assert_eq!(settings.io_timeout, Duration::from_secs(5));
        assert_eq!(settings.connect_timeout, Duration::from_secs(2));
        assert!(settings.synthetic);
    }

    #[test]
    fn zero_interval_is_invalid() {
        let profile = Profile {
            poll_interval_ms: Some(0),
            ..Profile::default()
        };
        let err = profile.to_settings(&Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "poll_interval_ms"));
    }

    #[test]
    fn active_profile_resolution() {
        let mut cfg = Config::default();
        assert_eq!(cfg.active_profile_name(None), "default");
        assert_eq!(cfg.active_profile_name(Some("farm")), "farm");
        cfg.default_profile = None;
        assert_eq!(cfg.active_profile_name(None), "default");
    }

    #[test]
    fn default_profile_must_exist() {
        let mut cfg = Config::default();
        let err = cfg.set_default_profile("farm").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProfile { ref name } if name == "farm"));
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));

        cfg.profile_mut("farm").synthetic = true;
        cfg.set_default_profile("farm").unwrap();
        assert_eq!(cfg.active_profile_name(None), "farm");
    }
}
