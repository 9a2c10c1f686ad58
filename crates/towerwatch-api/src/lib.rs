// towerwatch-api: Async Rust client for the water-tower gateway JSON API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::TowerClient;
pub use error::Error;
pub use models::{Ack, HistoryEntry, ModeRequest, PumpRequest, StatusRecord, TowerRecord};
pub use transport::TransportConfig;
