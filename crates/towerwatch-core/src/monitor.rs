// ── TowerMonitor ──
//
// Owns the shared config, the fetcher, the poller and the dispatcher for
// one gateway. Built once per process from `GatewaySettings`.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{GatewayConfig, GatewaySettings};
use crate::dispatcher::CommandDispatcher;
use crate::error::CoreError;
use crate::fetcher::FleetFetcher;
use crate::scheduler::Poller;

pub struct TowerMonitor {
    config: GatewayConfig,
    fetcher: Arc<FleetFetcher>,
    poller: Poller<FleetFetcher>,
    dispatcher: CommandDispatcher<FleetFetcher>,
    poll_interval: Duration,
}

impl TowerMonitor {
    pub fn new(settings: &GatewaySettings) -> Result<Self, CoreError> {
        let config = GatewayConfig::from_settings(settings)?;
        let fetcher = Arc::new(FleetFetcher::new(config.clone(), settings.transport()));
        Ok(Self::assemble(config, fetcher, settings.poll_interval))
    }

    /// Build around an existing fetcher (custom demo fleet, shared config).
    pub fn with_fetcher(fetcher: FleetFetcher, poll_interval: Duration) -> Self {
        let config = fetcher.config().clone();
        Self::assemble(config, Arc::new(fetcher), poll_interval)
    }

    fn assemble(config: GatewayConfig, fetcher: Arc<FleetFetcher>, poll_interval: Duration) -> Self {
        let poller = Poller::new(Arc::clone(&fetcher));
        let dispatcher = CommandDispatcher::new(poller.clone());
        Self {
            config,
            fetcher,
            poller,
            dispatcher,
            poll_interval,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &FleetFetcher {
        &self.fetcher
    }

    pub fn poller(&self) -> &Poller<FleetFetcher> {
        &self.poller
    }

    pub fn dispatcher(&self) -> &CommandDispatcher<FleetFetcher> {
        &self.dispatcher
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Start the schedule at the configured interval.
    pub async fn start_polling(&self) -> Result<(), CoreError> {
        self.poller.start(self.poll_interval).await?;
        Ok(())
    }

    pub async fn shutdown(&self) {
        self.poller.stop().await;
    }
}
