use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Gateway-assigned tower identifier. Small, positive and stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TowerId(pub u32);

impl TowerId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for TowerId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for TowerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One water tower as last reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tower {
    pub id: TowerId,
    pub name: String,
    /// Fill percentage, always within `0..=100`.
    pub water_level: u8,
    pub pump_on: bool,
    pub online: bool,
    /// Device-reported epoch milliseconds.
    #[serde(rename = "lastUpdate")]
    pub last_update_ms: i64,
    pub auto_mode: bool,
    pub low_water_alarm: bool,
    pub overflow_alarm: bool,
}

impl Tower {
    pub fn has_alarm(&self) -> bool {
        self.low_water_alarm || self.overflow_alarm
    }

    /// `None` when the device never reported or sent an out-of-range value.
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        if self.last_update_ms <= 0 {
            return None;
        }
        DateTime::from_timestamp_millis(self.last_update_ms)
    }
}

/// Clamp a raw level reading into `0..=100`.
pub(crate) fn clamp_level(raw: i64) -> u8 {
    u8::try_from(raw.clamp(0, 100)).unwrap_or(100)
}

// ── FleetSnapshot ───────────────────────────────────────────────────

/// Every tower from one successful fetch, in gateway order, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FleetSnapshot {
    towers: IndexMap<TowerId, Tower>,
}

impl FleetSnapshot {
    /// Build a snapshot, rejecting duplicate ids as a decode failure.
    pub fn from_towers(towers: Vec<Tower>) -> Result<Self, FetchError> {
        let mut map = IndexMap::with_capacity(towers.len());
        for tower in towers {
            let id = tower.id;
            if map.insert(id, tower).is_some() {
                return Err(FetchError::decode(format!("duplicate tower id {id}")));
            }
        }
        Ok(Self { towers: map })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tower> {
        self.towers.values()
    }

    pub fn get(&self, id: TowerId) -> Option<&Tower> {
        self.towers.get(&id)
    }

    pub fn contains(&self, id: TowerId) -> bool {
        self.towers.contains_key(&id)
    }

    pub fn first(&self) -> Option<&Tower> {
        self.towers.first().map(|(_, tower)| tower)
    }

    pub fn ids(&self) -> impl Iterator<Item = TowerId> + '_ {
        self.towers.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.towers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.towers.is_empty()
    }

    pub fn to_vec(&self) -> Vec<Tower> {
        self.towers.values().cloned().collect()
    }
}

impl<'a> IntoIterator for &'a FleetSnapshot {
    type Item = &'a Tower;
    type IntoIter = indexmap::map::Values<'a, TowerId, Tower>;

    fn into_iter(self) -> Self::IntoIter {
        self.towers.values()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn tower(id: u32, level: u8) -> Tower {
        Tower {
            id: TowerId(id),
            name: format!("Tower {id}"),
            water_level: level,
            pump_on: false,
            online: true,
            last_update_ms: 1_700_000_000_000,
            auto_mode: true,
            low_water_alarm: false,
            overflow_alarm: false,
        }
    }

    #[test]
    fn clamp_level_bounds() {
        assert_eq!(clamp_level(-5), 0);
        assert_eq!(clamp_level(42), 42);
        assert_eq!(clamp_level(250), 100);
    }

    #[test]
    fn snapshot_preserves_order() {
        let snap = FleetSnapshot::from_towers(vec![tower(3, 10), tower(1, 20), tower(2, 30)]).unwrap();
        let ids: Vec<u32> = snap.ids().map(TowerId::get).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(snap.first().map(|t| t.id), Some(TowerId(3)));
    }

    #[test]
    fn snapshot_rejects_duplicate_ids() {
        let err = FleetSnapshot::from_towers(vec![tower(1, 10), tower(1, 20)]).unwrap_err();
        assert!(err.is_decode());
        assert!(err.to_string().contains("duplicate tower id 1"));
    }

    #[test]
    fn last_update_none_for_unreported() {
        let mut t = tower(1, 50);
        t.last_update_ms = 0;
        assert!(t.last_update().is_none());
    }

    #[test]
    fn serializes_with_wire_names() {
        let value = serde_json::to_value(tower(7, 64)).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["waterLevel"], 64);
        assert_eq!(value["lastUpdate"], 1_700_000_000_000_i64);
    }
}
