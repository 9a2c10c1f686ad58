// Wire → domain conversion
//
// Bridges `towerwatch_api` records into the core model. Levels are clamped
// here; nothing downstream sees an out-of-range reading.

use towerwatch_api::{HistoryEntry, PumpRequest, StatusRecord, TowerRecord};

use crate::model::{ControlCommand, HistoryRecord, SystemStatus, Tower, TowerId, clamp_level};

impl From<TowerRecord> for Tower {
    fn from(r: TowerRecord) -> Self {
        let name = r
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Tower {}", r.id));

        Self {
            id: TowerId(r.id),
            name,
            water_level: clamp_level(r.water_level),
            pump_on: r.pump_on,
            online: r.online,
            last_update_ms: r.last_update,
            auto_mode: r.auto_mode,
            low_water_alarm: r.low_water_alarm,
            overflow_alarm: r.overflow_alarm,
        }
    }
}

impl From<StatusRecord> for SystemStatus {
    fn from(r: StatusRecord) -> Self {
        Self {
            auto_mode: r.auto_mode,
            total_towers: r.total_towers,
            online_towers: r.online_towers,
            alarm_count: r.alarm_count,
            well_water_ok: r.well_water_ok,
        }
    }
}

impl From<HistoryEntry> for HistoryRecord {
    fn from(e: HistoryEntry) -> Self {
        Self {
            tower_id: TowerId(e.tower_id),
            timestamp_ms: e.timestamp,
            water_level: clamp_level(e.water_level),
            pump_status: e.pump_status,
        }
    }
}

impl From<ControlCommand> for PumpRequest {
    fn from(c: ControlCommand) -> Self {
        Self {
            tower_id: c.tower_id.get(),
            pump_on: c.pump_on,
            auto_mode: c.auto_mode,
        }
    }
}
