// Seam between the scheduler/dispatcher and the network.
//
// `FleetFetcher` is the production implementation; tests substitute fakes
// with counters and controllable latency.

use std::future::Future;

use towerwatch_api::Ack;

use crate::error::FetchError;
use crate::fetcher::FleetFetcher;
use crate::model::{ControlCommand, FleetSnapshot};

/// Operations the poller and command dispatcher need from a gateway.
pub trait TowerGateway: Send + Sync + 'static {
    fn fetch_fleet(&self) -> impl Future<Output = Result<FleetSnapshot, FetchError>> + Send;

    fn send_pump(&self, command: ControlCommand) -> impl Future<Output = Result<Ack, FetchError>> + Send;

    fn send_mode(&self, auto_mode: bool) -> impl Future<Output = Result<Ack, FetchError>> + Send;
}

impl TowerGateway for FleetFetcher {
    async fn fetch_fleet(&self) -> Result<FleetSnapshot, FetchError> {
        self.fetch_all_towers().await
    }

    async fn send_pump(&self, command: ControlCommand) -> Result<Ack, FetchError> {
        self.send_pump_command(command).await
    }

    async fn send_mode(&self, auto_mode: bool) -> Result<Ack, FetchError> {
        self.send_mode_command(auto_mode).await
    }
}
