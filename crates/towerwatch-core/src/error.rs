// ── Core error types ──
//
// User-facing errors from towerwatch-core. Consumers never see reqwest or
// serde errors directly: `From<towerwatch_api::Error>` folds every transport
// failure into the network / decode split.

use thiserror::Error;

const TIMEOUT_PREFIX: &str = "request timed out";

/// Rejected configuration mutation. The previous value is always kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Gateway address cannot be empty")]
    EmptyAddress,

    #[error("Invalid gateway address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Poll interval must be greater than zero")]
    ZeroInterval,
}

/// Outcome of a single failed fetch or send.
///
/// `Clone` so that a coalesced refresh can hand the same failure to every
/// waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connectivity, timeout, or non-success HTTP status.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The gateway answered but the payload was malformed.
    #[error("Malformed response: {message}")]
    Decode { message: String },
}

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// A network failure caused by the transport timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network { message } if message.starts_with(TIMEOUT_PREFIX))
    }
}

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<towerwatch_api::Error> for FetchError {
    fn from(err: towerwatch_api::Error) -> Self {
        if err.is_decode() {
            return match err {
                towerwatch_api::Error::Deserialization { message, body: _ } => {
                    FetchError::Decode { message }
                }
                other => FetchError::Decode {
                    message: other.to_string(),
                },
            };
        }

        match err {
            towerwatch_api::Error::Transport(ref e) if e.is_timeout() => FetchError::Network {
                message: format!("{TIMEOUT_PREFIX}: {e}"),
            },
            towerwatch_api::Error::Transport(ref e) if e.is_connect() => FetchError::Network {
                message: format!(
                    "cannot reach gateway at {}: {e}",
                    e.url().map_or_else(|| "<unknown>".into(), ToString::to_string)
                ),
            },
            other => FetchError::Network {
                message: other.to_string(),
            },
        }
    }
}
