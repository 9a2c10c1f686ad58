// ── Synthetic demo data ──
//
// Fixed five-tower fleet and a seeded per-tower history generator, used when
// no gateway is reachable (demo mode, or the CLI's history fallback).

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde_json::Value;

use towerwatch_api::Ack;

use crate::model::{FleetSnapshot, HistoryRecord, SystemStatus, Tower, TowerId, clamp_level};

const HOUR_MS: i64 = 3_600_000;

/// Demo fleet pinned to the instant it was created, so repeated polls
/// reconcile as unchanged.
#[derive(Debug, Clone)]
pub struct SyntheticFleet {
    epoch_ms: i64,
}

impl SyntheticFleet {
    pub fn new(epoch_ms: i64) -> Self {
        Self { epoch_ms }
    }

    pub fn now() -> Self {
        Self::new(Utc::now().timestamp_millis())
    }

    pub fn towers(&self) -> Vec<Tower> {
        // (id, level, pump, online, low alarm, overflow alarm)
        const FIXTURE: [(u32, u8, bool, bool, bool, bool); 5] = [
            (1, 75, false, true, false, false),
            (2, 45, true, true, false, false),
            (3, 18, true, true, true, false),
            (4, 96, false, true, false, true),
            (5, 52, false, false, false, false),
        ];

        FIXTURE
            .iter()
            .map(|&(id, level, pump_on, online, low, overflow)| Tower {
                id: TowerId(id),
                name: format!("Tower {id}"),
                water_level: level,
                pump_on,
                online,
                last_update_ms: self.epoch_ms,
                auto_mode: true,
                low_water_alarm: low,
                overflow_alarm: overflow,
            })
            .collect()
    }

    pub fn snapshot(&self) -> FleetSnapshot {
        // Fixture ids are unique.
        FleetSnapshot::from_towers(self.towers()).unwrap_or_default()
    }

    pub fn tower(&self, id: TowerId) -> Option<Tower> {
        self.towers().into_iter().find(|t| t.id == id)
    }

    pub fn status(&self) -> SystemStatus {
        let towers = self.towers();
        let count = |pred: fn(&Tower) -> bool| {
            u32::try_from(towers.iter().filter(|t| pred(t)).count()).unwrap_or(u32::MAX)
        };
        SystemStatus {
            auto_mode: true,
            total_towers: count(|_| true),
            online_towers: count(|t| t.online),
            alarm_count: count(Tower::has_alarm),
            well_water_ok: true,
        }
    }

    pub fn history(&self, tower_id: TowerId, hours: u32, now: DateTime<Utc>) -> Vec<HistoryRecord> {
        synthetic_history(tower_id, hours, now)
    }
}

/// `hours` hourly samples ending at the hour containing `now`, oldest first.
///
/// The level sequence depends only on `tower_id` and `hours`.
pub fn synthetic_history(tower_id: TowerId, hours: u32, now: DateTime<Utc>) -> Vec<HistoryRecord> {
    let mut rng = ChaCha20Rng::seed_from_u64(u64::from(tower_id.get()));
    let base = base_level(tower_id);
    let now_ms = now.timestamp_millis();
    let end = now_ms - now_ms.rem_euclid(HOUR_MS);

    (0..hours)
        .map(|i| {
            let level = clamp_level(base + rng.gen_range(-15_i64..=15));
            let back = i64::from(hours - 1 - i);
            HistoryRecord {
                tower_id,
                timestamp_ms: end - back * HOUR_MS,
                water_level: level,
                pump_status: level < 30 || level > 80,
            }
        })
        .collect()
}

fn base_level(tower_id: TowerId) -> i64 {
    match tower_id.get() {
        1 => 60,
        2 => 45,
        3 => 75,
        4 => 30,
        _ => 85,
    }
}

/// Acknowledgment returned for commands in demo mode.
pub fn synthetic_ack() -> Ack {
    let mut ack = Ack::new();
    ack.insert("success".into(), Value::Bool(true));
    ack.insert("synthetic".into(), Value::Bool(true));
    ack
}
