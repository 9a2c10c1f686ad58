// towerwatch-core: Polling, reconciliation and history aggregation for
// water-tower fleets.
//
// Sits between the raw `towerwatch-api` client and consumers (the CLI).
// `TowerMonitor` wires the pieces together; each piece is usable alone.

pub mod config;
pub mod convert;
pub mod dispatcher;
pub mod error;
pub mod fetcher;
pub mod gateway;
pub mod history;
pub mod model;
pub mod monitor;
pub mod reconcile;
pub mod scheduler;
pub mod synthetic;

// ── Primary re-exports ──────────────────────────────────────────
pub use config::{DEFAULT_BASE_ADDRESS, DEFAULT_POLL_INTERVAL, GatewayConfig, GatewaySettings};
pub use dispatcher::{CommandDispatcher, CommandOutcome};
pub use error::{ConfigError, CoreError, FetchError};
pub use fetcher::FleetFetcher;
pub use gateway::TowerGateway;
pub use history::{HistorySeries, LevelStats, aggregate, hours_since_day_start, level_label};
pub use monitor::TowerMonitor;
pub use reconcile::{FleetDiff, FleetUpdate, FleetView, diff};
pub use scheduler::{PollEvent, PollState, Poller, RefreshOutcome, RefreshResult};
pub use synthetic::{SyntheticFleet, synthetic_history};

pub use towerwatch_api::Ack;

// ── Model re-exports ─────────────────────────────────────────────
pub use model::{
    ControlCommand, FleetSnapshot, FleetSummary, HistoryRecord, ModeLabel, SystemStatus, Tower,
    TowerId,
};
