// ── History aggregation ──
//
// Statistics, chart series and range computation over history samples.
// Pure functions; fetching lives in the fetcher.

use std::fmt::Display;

use chrono::{DateTime, Local, NaiveDate, TimeZone};

use crate::model::HistoryRecord;

/// Placeholder shown where a statistic has no data.
pub const NO_DATA: &str = "--";

/// Summary statistics over a set of samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelStats {
    NoData,
    Summary {
        count: usize,
        min: u8,
        max: u8,
        /// Arithmetic mean rounded down.
        mean: u8,
    },
}

impl LevelStats {
    pub fn count(&self) -> usize {
        match self {
            Self::NoData => 0,
            Self::Summary { count, .. } => *count,
        }
    }

    pub fn min(&self) -> Option<u8> {
        match self {
            Self::NoData => None,
            Self::Summary { min, .. } => Some(*min),
        }
    }

    pub fn max(&self) -> Option<u8> {
        match self {
            Self::NoData => None,
            Self::Summary { max, .. } => Some(*max),
        }
    }

    pub fn mean(&self) -> Option<u8> {
        match self {
            Self::NoData => None,
            Self::Summary { mean, .. } => Some(*mean),
        }
    }
}

/// Render a level as `NN%`, or the placeholder when absent.
pub fn level_label(level: Option<u8>) -> String {
    level.map_or_else(|| NO_DATA.to_owned(), |l| format!("{l}%"))
}

pub fn aggregate(records: &[HistoryRecord]) -> LevelStats {
    let Some(first) = records.first() else {
        return LevelStats::NoData;
    };

    let (mut min, mut max, mut sum) = (first.water_level, first.water_level, 0_u64);
    for r in records {
        min = min.min(r.water_level);
        max = max.max(r.water_level);
        sum += u64::from(r.water_level);
    }

    let count = records.len();
    let mean = sum / u64::try_from(count).unwrap_or(u64::MAX);

    LevelStats::Summary {
        count,
        min,
        max,
        mean: u8::try_from(mean).unwrap_or(u8::MAX),
    }
}

// ── Chart series ────────────────────────────────────────────────────

/// Index-based series: x is the sample position, not wall-clock time, so
/// gaps in the record are not rendered as gaps on the axis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistorySeries {
    points: Vec<(usize, u8)>,
    timestamps: Vec<i64>,
}

impl HistorySeries {
    pub fn from_records(records: &[HistoryRecord]) -> Self {
        Self {
            points: records
                .iter()
                .enumerate()
                .map(|(i, r)| (i, r.water_level))
                .collect(),
            timestamps: records.iter().map(|r| r.timestamp_ms).collect(),
        }
    }

    pub fn points(&self) -> &[(usize, u8)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `HH:MM` label for the sample at `index`, in local time.
    pub fn label(&self, index: usize) -> Option<String> {
        self.label_in(index, &Local)
    }

    pub fn label_in<Tz>(&self, index: usize, tz: &Tz) -> Option<String>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let ms = *self.timestamps.get(index)?;
        let at = DateTime::from_timestamp_millis(ms)?.with_timezone(tz);
        Some(at.format("%H:%M").to_string())
    }
}

// ── Range computation ───────────────────────────────────────────────

/// Whole hours from the start of `day` (in `now`'s zone) to `now`, plus one.
///
/// Days in the future saturate to one hour. With `min_full_day` the result
/// is at least 24.
pub fn hours_since_day_start<Tz: TimeZone>(day: NaiveDate, now: &DateTime<Tz>, min_full_day: bool) -> u32 {
    let floor = if min_full_day { 24 } else { 1 };

    let Some(midnight) = day.and_hms_opt(0, 0, 0) else {
        return floor;
    };
    let tz = now.timezone();
    // A DST gap can swallow local midnight; fall back to reading it as UTC.
    let start = tz
        .from_local_datetime(&midnight)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight));

    let elapsed = now.clone().signed_duration_since(start).num_hours().max(0);
    let hours = u32::try_from(elapsed).unwrap_or(u32::MAX).saturating_add(1);
    hours.max(floor)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::TowerId;
    use chrono::{FixedOffset, Utc};
    use pretty_assertions::assert_eq;

    fn rec(ts: i64, level: u8) -> HistoryRecord {
        HistoryRecord {
            tower_id: TowerId(1),
            timestamp_ms: ts,
            water_level: level,
            pump_status: false,
        }
    }

    #[test]
    fn empty_records_have_no_data() {
        let stats = aggregate(&[]);
        assert_eq!(stats, LevelStats::NoData);
        assert_eq!(level_label(stats.min()), "--");
        assert_eq!(level_label(stats.mean()), "--");
        assert_eq!(stats.count(), 0);
    }

    #[test]
    fn aggregate_min_max_mean() {
        let stats = aggregate(&[rec(0, 40), rec(1, 60), rec(2, 80)]);
        assert_eq!(
            stats,
            LevelStats::Summary {
                count: 3,
                min: 40,
                max: 80,
                mean: 60
            }
        );
        assert_eq!(level_label(stats.max()), "80%");
    }

    #[test]
    fn mean_rounds_down() {
        let stats = aggregate(&[rec(0, 10), rec(1, 11)]);
        assert_eq!(stats.mean(), Some(10));
    }

    #[test]
    fn series_uses_sample_index() {
        let series = HistorySeries::from_records(&[rec(0, 5), rec(10_000_000, 7)]);
        assert_eq!(series.points(), &[(0, 5), (1, 7)]);
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn label_in_zone() {
        // 2024-01-01T13:05:00Z
        let series = HistorySeries::from_records(&[rec(1_704_114_300_000, 50)]);
        assert_eq!(series.label_in(0, &Utc).as_deref(), Some("13:05"));

        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(series.label_in(0, &plus_two).as_deref(), Some("15:05"));
        assert_eq!(series.label_in(1, &Utc), None);
    }

    #[test]
    fn hours_for_today_count_partial_hour() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 9, 30, 0).unwrap();
        assert_eq!(hours_since_day_start(day, &now, false), 10);
        assert_eq!(hours_since_day_start(day, &now, true), 24);
    }

    #[test]
    fn hours_for_earlier_day() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 0, 15, 0).unwrap();
        assert_eq!(hours_since_day_start(day, &now, false), 49);
    }

    #[test]
    fn future_day_saturates() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 12).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(hours_since_day_start(day, &now, false), 1);
        assert_eq!(hours_since_day_start(day, &now, true), 24);
    }

    #[test]
    fn day_start_uses_zone_of_now() {
        let tz = FixedOffset::east_opt(5 * 3600).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let now = tz.with_ymd_and_hms(2024, 3, 10, 3, 0, 0).unwrap();
        assert_eq!(hours_since_day_start(day, &now, false), 4);
    }
}
