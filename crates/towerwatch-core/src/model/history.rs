use chrono::{DateTime, Utc};
use serde::Serialize;

use super::TowerId;

/// One historical level sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub tower_id: TowerId,
    /// Epoch milliseconds.
    #[serde(rename = "timestamp")]
    pub timestamp_ms: i64,
    pub water_level: u8,
    pub pump_status: bool,
}

impl HistoryRecord {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_ms)
    }
}
