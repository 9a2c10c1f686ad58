// Shared transport configuration for building reqwest::Client instances.
//
// The gateway speaks plain HTTP on the local network, so the only tuning
// knobs are the connect ceiling and the per-request read/write ceiling.

use std::time::Duration;

/// Transport settings for building the gateway HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Ceiling for establishing the TCP connection.
    pub connect_timeout: Duration,
    /// Ceiling for the whole request once connected (read + write).
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.timeout)
            .user_agent(concat!("towerwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| crate::error::Error::ClientBuild(format!("failed to build HTTP client: {e}")))
    }
}
