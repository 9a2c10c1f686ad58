use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::FleetSnapshot;

/// Aggregate gateway status from `api/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub auto_mode: bool,
    pub total_towers: u32,
    pub online_towers: u32,
    pub alarm_count: u32,
    pub well_water_ok: bool,
}

/// Fleet-wide control mode label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ModeLabel {
    Auto,
    Manual,
}

impl From<bool> for ModeLabel {
    fn from(auto: bool) -> Self {
        if auto { Self::Auto } else { Self::Manual }
    }
}

/// Counts derived from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FleetSummary {
    pub total: usize,
    pub online: usize,
    pub alarms: usize,
    pub mode: ModeLabel,
}

impl FleetSummary {
    /// The mode is read from the first tower only; the gateway applies one
    /// mode to the whole fleet. An empty fleet reads as manual.
    pub fn of(snapshot: &FleetSnapshot) -> Self {
        Self {
            total: snapshot.len(),
            online: snapshot.iter().filter(|t| t.online).count(),
            alarms: snapshot.iter().filter(|t| t.has_alarm()).count(),
            mode: snapshot
                .first()
                .map_or(ModeLabel::Manual, |t| ModeLabel::from(t.auto_mode)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::tower_fixture as tower;

    #[test]
    fn summary_counts_online_and_alarms() {
        let mut a = tower(1, 10);
        a.low_water_alarm = true;
        let mut b = tower(2, 99);
        b.overflow_alarm = true;
        b.low_water_alarm = true;
        let mut c = tower(3, 50);
        c.online = false;

        let snap = FleetSnapshot::from_towers(vec![a, b, c]).unwrap();
        let summary = FleetSummary::of(&snap);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.online, 2);
        assert_eq!(summary.alarms, 2);
        assert_eq!(summary.mode, ModeLabel::Auto);
    }

    #[test]
    fn mode_follows_first_tower() {
        let mut first = tower(1, 10);
        first.auto_mode = false;
        let snap = FleetSnapshot::from_towers(vec![first, tower(2, 20)]).unwrap();
        assert_eq!(FleetSummary::of(&snap).mode, ModeLabel::Manual);
    }

    #[test]
    fn empty_fleet_is_manual() {
        let summary = FleetSummary::of(&FleetSnapshot::default());
        assert_eq!(summary.total, 0);
        assert_eq!(summary.mode, ModeLabel::Manual);
    }

    #[test]
    fn mode_label_parses_case_insensitive() {
        assert_eq!("AUTO".parse::<ModeLabel>().unwrap(), ModeLabel::Auto);
        assert_eq!(ModeLabel::Manual.to_string(), "manual");
    }
}
