// ── Gateway configuration ──
//
// `GatewaySettings` is the construction-time bundle handed in by the CLI.
// `GatewayConfig` is the live, shared handle: one writer path, lock-free
// reads, and a generation counter that tells the fetcher when its cached
// HTTP client is stale.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tracing::debug;
use url::Url;

use towerwatch_api::TransportConfig;

use crate::error::ConfigError;

/// Factory-default address of the gateway access point.
pub const DEFAULT_BASE_ADDRESS: &str = "http://192.168.4.1";

/// Default polling cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Settings used to build a [`TowerMonitor`](crate::TowerMonitor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySettings {
    /// Gateway base address (e.g., `http://192.168.4.1`).
    pub base_address: String,
    /// Serve the built-in demo fleet instead of talking to the network.
    pub synthetic: bool,
    pub poll_interval: Duration,
    pub connect_timeout: Duration,
    /// Whole-request (read/write) timeout.
    pub io_timeout: Duration,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_address: DEFAULT_BASE_ADDRESS.into(),
            synthetic: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
            connect_timeout: Duration::from_secs(10),
            io_timeout: Duration::from_secs(30),
        }
    }
}

impl GatewaySettings {
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            connect_timeout: self.connect_timeout,
            timeout: self.io_timeout,
        }
    }
}

// ── Live handle ─────────────────────────────────────────────────────

/// Immutable view of the configuration at one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayState {
    pub base_address: Url,
    pub synthetic: bool,
    pub generation: u64,
}

/// Shared gateway configuration. Clones point at the same state.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    state: Arc<ArcSwap<GatewayState>>,
}

impl GatewayConfig {
    pub fn new(base_address: &str, synthetic: bool) -> Result<Self, ConfigError> {
        let base_address = normalize_address(base_address)?;
        Ok(Self {
            state: Arc::new(ArcSwap::from_pointee(GatewayState {
                base_address,
                synthetic,
                generation: 0,
            })),
        })
    }

    pub fn from_settings(settings: &GatewaySettings) -> Result<Self, ConfigError> {
        Self::new(&settings.base_address, settings.synthetic)
    }

    /// Replace the base address. On error the previous address stays.
    pub fn set_base_address(&self, address: &str) -> Result<(), ConfigError> {
        let url = normalize_address(address)?;
        self.state.rcu(|current| GatewayState {
            base_address: url.clone(),
            synthetic: current.synthetic,
            generation: current.generation + 1,
        });
        debug!(address = %url, "gateway address updated");
        Ok(())
    }

    pub fn base_address(&self) -> Url {
        self.state.load().base_address.clone()
    }

    /// Switch demo mode. Counts as a configuration change, so a client
    /// cached before the switch is rebuilt on the next live call.
    pub fn set_synthetic(&self, synthetic: bool) {
        self.state.rcu(|current| GatewayState {
            base_address: current.base_address.clone(),
            synthetic,
            generation: current.generation + 1,
        });
        debug!(synthetic, "demo mode updated");
    }

    pub fn is_synthetic(&self) -> bool {
        self.state.load().synthetic
    }

    /// Bumped on every successful address or mode change.
    pub fn generation(&self) -> u64 {
        self.state.load().generation
    }

    /// Consistent view of address, mode and generation.
    pub fn snapshot(&self) -> Arc<GatewayState> {
        self.state.load_full()
    }
}

/// Trim, default the scheme to `http`, and validate.
fn normalize_address(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyAddress);
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("http://{trimmed}")
    };

    let invalid = |reason: String| ConfigError::InvalidAddress {
        address: trimmed.to_owned(),
        reason,
    };

    let url = Url::parse(&candidate).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".into()));
    }
    Ok(url)
}
