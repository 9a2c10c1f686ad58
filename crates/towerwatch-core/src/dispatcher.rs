// ── Command dispatcher ──
//
// Sends one command, then refreshes the fleet whether or not the command
// went through, so the view always reflects what the gateway now reports.

use std::sync::Arc;

use tracing::{info, warn};

use towerwatch_api::Ack;

use crate::error::FetchError;
use crate::gateway::TowerGateway;
use crate::model::{ControlCommand, TowerId};
use crate::scheduler::{Poller, RefreshResult};

/// Result of a command plus its follow-up refresh. The two failures are
/// reported separately.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub sent: Result<Ack, FetchError>,
    pub refreshed: RefreshResult,
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        self.sent.is_ok()
    }
}

pub struct CommandDispatcher<G> {
    gateway: Arc<G>,
    poller: Poller<G>,
}

impl<G> Clone for CommandDispatcher<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            poller: self.poller.clone(),
        }
    }
}

impl<G: TowerGateway> CommandDispatcher<G> {
    pub fn new(poller: Poller<G>) -> Self {
        Self {
            gateway: Arc::clone(poller.gateway()),
            poller,
        }
    }

    /// Manual pump override. Takes the tower out of auto mode.
    pub async fn set_pump(&self, tower_id: TowerId, on: bool) -> CommandOutcome {
        let command = ControlCommand::manual_pump(tower_id, on);
        let sent = self.gateway.send_pump(command).await;
        match &sent {
            Ok(_) => info!(%tower_id, pump_on = on, "pump command accepted"),
            Err(e) => warn!(%tower_id, error = %e, "pump command failed"),
        }
        self.finish(sent).await
    }

    pub async fn set_auto_mode(&self, auto_mode: bool) -> CommandOutcome {
        let sent = self.gateway.send_mode(auto_mode).await;
        match &sent {
            Ok(_) => info!(auto_mode, "mode command accepted"),
            Err(e) => warn!(auto_mode, error = %e, "mode command failed"),
        }
        self.finish(sent).await
    }

    async fn finish(&self, sent: Result<Ack, FetchError>) -> CommandOutcome {
        let refreshed = self.poller.refresh_now().await;
        CommandOutcome { sent, refreshed }
    }
}
