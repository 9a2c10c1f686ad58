// Gateway wire models
//
// Raw JSON shapes as they come off the wire. The companion app surface uses
// camelCase keys; the master-node firmware answers with abbreviated keys and
// integer booleans, so both spellings are accepted here. Domain clamping and
// defaulting happen in `towerwatch-core`.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Opaque acknowledgment returned by command endpoints.
pub type Ack = serde_json::Map<String, serde_json::Value>;

/// One tower as reported by `GET api/towers` or `GET api/tower/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TowerRecord {
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
    /// Percentage; out-of-range values are clamped downstream.
    #[serde(alias = "level")]
    pub water_level: i64,
    #[serde(default, alias = "pump", deserialize_with = "flexible_bool")]
    pub pump_on: bool,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub online: bool,
    /// Epoch milliseconds as reported by the device.
    #[serde(default)]
    pub last_update: i64,
    #[serde(default = "default_true", deserialize_with = "flexible_bool")]
    pub auto_mode: bool,
    #[serde(default, alias = "alarm", deserialize_with = "flexible_bool")]
    pub low_water_alarm: bool,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub overflow_alarm: bool,
}

/// Aggregate status from `GET api/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    #[serde(default = "default_true", deserialize_with = "flexible_bool")]
    pub auto_mode: bool,
    #[serde(default)]
    pub total_towers: u32,
    #[serde(default)]
    pub online_towers: u32,
    #[serde(default)]
    pub alarm_count: u32,
    #[serde(default, alias = "well_water", deserialize_with = "flexible_bool")]
    pub well_water_ok: bool,
}

/// One sample from `GET api/history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub tower_id: u32,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub water_level: i64,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub pump_status: bool,
}

/// Body of `POST api/pump`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PumpRequest {
    pub tower_id: u32,
    pub pump_on: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_mode: Option<bool>,
}

/// Body of `POST api/mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeRequest {
    pub auto_mode: bool,
}

fn default_true() -> bool {
    true
}

/// Accept `true`/`false`, `0`/`1`, and the strings the firmware uses.
fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
        Str(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Bool(b) => Ok(b),
        Raw::Int(i) => Ok(i != 0),
        Raw::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "on" => Ok(true),
            "false" | "0" | "off" | "" => Ok(false),
            other => Err(de::Error::invalid_value(
                de::Unexpected::Str(other),
                &"a boolean, 0/1, or on/off",
            )),
        },
    }
}
