//! CLI error types with miette diagnostics.
//!
//! Maps core and config errors into user-facing errors with actionable help
//! text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use towerwatch_core::{ConfigError as GatewayConfigError, CoreError, FetchError};

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the gateway")]
    #[diagnostic(
        code(towerwatch::connection_failed),
        help(
            "Check that this machine is joined to the gateway's network.\n\
             Reason: {reason}\n\
             Try: towerwatch --synthetic towers list"
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Gateway request timed out")]
    #[diagnostic(
        code(towerwatch::timeout),
        help("Increase the timeout with --timeout or check the gateway's signal strength.")
    )]
    Timeout { reason: String },

    #[error("The gateway sent a malformed response: {message}")]
    #[diagnostic(
        code(towerwatch::malformed_response),
        help("Check that the configured address points at a tower gateway, not another device.")
    )]
    MalformedResponse { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(towerwatch::not_found),
        help("Run: towerwatch {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Tower {id} is offline")]
    #[diagnostic(
        code(towerwatch::tower_offline),
        help("The command would not reach the tower. Use --force to send it anyway.")
    )]
    TowerOffline { id: u32 },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(towerwatch::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(towerwatch::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: towerwatch config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(towerwatch::config))]
    Config(Box<towerwatch_config::ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(towerwatch::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    pub fn tower_not_found(id: u32) -> Self {
        Self::NotFound {
            resource_type: "tower".into(),
            identifier: id.to_string(),
            list_command: "towers list".into(),
        }
    }
}

// ── Core → CLI mapping ──────────────────────────────────────────────

impl From<FetchError> for CliError {
    fn from(err: FetchError) -> Self {
        if err.is_timeout() {
            return Self::Timeout {
                reason: err.to_string(),
            };
        }
        match err {
            FetchError::Network { message } => Self::ConnectionFailed { reason: message },
            FetchError::Decode { message } => Self::MalformedResponse { message },
        }
    }
}

impl From<GatewayConfigError> for CliError {
    fn from(err: GatewayConfigError) -> Self {
        let field = match err {
            GatewayConfigError::ZeroInterval => "interval",
            GatewayConfigError::EmptyAddress | GatewayConfigError::InvalidAddress { .. } => "gateway",
        };
        Self::Validation {
            field: field.into(),
            reason: err.to_string(),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Config(e) => e.into(),
            CoreError::Fetch(e) => e.into(),
        }
    }
}

impl From<towerwatch_config::ConfigError> for CliError {
    fn from(err: towerwatch_config::ConfigError) -> Self {
        match err {
            towerwatch_config::ConfigError::Validation { field, reason } => {
                Self::Validation { field, reason }
            }
            other => Self::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(CliError::from(FetchError::network("refused")).exit_code(), 7);
        assert_eq!(
            CliError::from(FetchError::network("request timed out: 30s")).exit_code(),
            8
        );
        assert_eq!(CliError::tower_not_found(9).exit_code(), 4);
        assert_eq!(CliError::from(GatewayConfigError::EmptyAddress).exit_code(), 2);
        assert_eq!(CliError::from(FetchError::decode("bad")).exit_code(), 1);
    }
}
