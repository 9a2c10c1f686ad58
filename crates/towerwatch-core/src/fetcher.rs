// ── Fleet fetcher ──
//
// One request per call against the gateway, normalized into the domain
// model. Demo mode short-circuits every call without touching the network.
// The HTTP client is cached against the config generation and rebuilt the
// first time a call notices the address moved.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::Utc;
use tracing::debug;

use towerwatch_api::{Ack, PumpRequest, TowerClient, TransportConfig};

use crate::config::GatewayConfig;
use crate::error::FetchError;
use crate::model::{ControlCommand, FleetSnapshot, HistoryRecord, SystemStatus, Tower, TowerId};
use crate::synthetic::{SyntheticFleet, synthetic_ack};

#[derive(Debug)]
struct CachedClient {
    generation: u64,
    client: TowerClient,
}

/// Single-attempt gateway reads and writes. No retry, no fallback.
pub struct FleetFetcher {
    config: GatewayConfig,
    transport: TransportConfig,
    cached: ArcSwapOption<CachedClient>,
    demo: SyntheticFleet,
}

impl FleetFetcher {
    pub fn new(config: GatewayConfig, transport: TransportConfig) -> Self {
        Self {
            config,
            transport,
            cached: ArcSwapOption::empty(),
            demo: SyntheticFleet::now(),
        }
    }

    /// Use a fixed demo fleet instead of one stamped with the current time.
    pub fn with_demo_fleet(mut self, demo: SyntheticFleet) -> Self {
        self.demo = demo;
        self
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn demo_fleet(&self) -> &SyntheticFleet {
        &self.demo
    }

    // ── Reads ───────────────────────────────────────────────────────

    pub async fn fetch_all_towers(&self) -> Result<FleetSnapshot, FetchError> {
        if self.config.is_synthetic() {
            return Ok(self.demo.snapshot());
        }
        let records = self.client()?.list_towers().await?;
        FleetSnapshot::from_towers(records.into_iter().map(Tower::from).collect())
    }

    pub async fn fetch_status(&self) -> Result<SystemStatus, FetchError> {
        if self.config.is_synthetic() {
            return Ok(self.demo.status());
        }
        let record = self.client()?.get_status().await?;
        Ok(record.into())
    }

    /// `Ok(None)` when the gateway does not know the tower.
    pub async fn fetch_tower(&self, id: TowerId) -> Result<Option<Tower>, FetchError> {
        if self.config.is_synthetic() {
            return Ok(self.demo.tower(id));
        }
        match self.client()?.get_tower(id.get()).await {
            Ok(record) => Ok(Some(record.into())),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Samples in ascending timestamp order.
    pub async fn fetch_history(
        &self,
        tower_id: TowerId,
        hours: u32,
    ) -> Result<Vec<HistoryRecord>, FetchError> {
        if self.config.is_synthetic() {
            return Ok(self.demo.history(tower_id, hours, Utc::now()));
        }
        let entries = self.client()?.get_history(tower_id.get(), hours).await?;
        let mut records: Vec<HistoryRecord> = entries.into_iter().map(HistoryRecord::from).collect();
        records.sort_by_key(|r| r.timestamp_ms);
        Ok(records)
    }

    // ── Commands ────────────────────────────────────────────────────

    pub async fn send_pump_command(&self, command: ControlCommand) -> Result<Ack, FetchError> {
        if self.config.is_synthetic() {
            debug!(tower_id = %command.tower_id, pump_on = command.pump_on, "demo pump command");
            return Ok(synthetic_ack());
        }
        let request = PumpRequest::from(command);
        Ok(self.client()?.send_pump(&request).await?)
    }

    pub async fn send_mode_command(&self, auto_mode: bool) -> Result<Ack, FetchError> {
        if self.config.is_synthetic() {
            debug!(auto_mode, "demo mode command");
            return Ok(synthetic_ack());
        }
        Ok(self.client()?.send_mode(auto_mode).await?)
    }

    // ── Client cache ────────────────────────────────────────────────

    fn client(&self) -> Result<TowerClient, FetchError> {
        let state = self.config.snapshot();

        let cached = self.cached.load_full();
        if let Some(cached) = cached.filter(|c| c.generation == state.generation) {
            return Ok(cached.client.clone());
        }

        let client = TowerClient::new(state.base_address.clone(), &self.transport)?;
        debug!(
            address = %client.base_url(),
            generation = state.generation,
            "built gateway client"
        );
        self.cached.store(Some(Arc::new(CachedClient {
            generation: state.generation,
            client: client.clone(),
        })));
        Ok(client)
    }
}
