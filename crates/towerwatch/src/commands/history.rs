//! History command handler.
//!
//! Falls back to generated demo samples when the gateway cannot serve
//! history, and says so in every output format.

use chrono::{Local, Utc};
use serde::Serialize;
use tabled::Tabled;
use tracing::warn;

use towerwatch_core::{
    HistoryRecord, HistorySeries, LevelStats, TowerId, TowerMonitor, aggregate,
    hours_since_day_start, level_label, synthetic_history,
};

use crate::cli::{GlobalOpts, HistoryArgs};
use crate::error::CliError;
use crate::output;

/// Fallback samples always cover at least a full day.
const FALLBACK_MIN_HOURS: u32 = 24;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryReport {
    tower_id: TowerId,
    hours: u32,
    demo: bool,
    stats: StatsView,
    records: Vec<HistoryRecord>,
}

#[derive(Serialize)]
struct StatsView {
    count: usize,
    min: Option<u8>,
    max: Option<u8>,
    average: Option<u8>,
}

impl From<LevelStats> for StatsView {
    fn from(s: LevelStats) -> Self {
        Self {
            count: s.count(),
            min: s.min(),
            max: s.max(),
            average: s.mean(),
        }
    }
}

#[derive(Tabled)]
struct SampleRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "Pump")]
    pump: &'static str,
}

fn detail(report: &HistoryReport, series: &HistorySeries) -> String {
    let rows: Vec<SampleRow> = series
        .points()
        .iter()
        .zip(&report.records)
        .map(|(&(index, level), record)| SampleRow {
            index,
            time: series.label(index).unwrap_or_else(|| "--:--".into()),
            level: format!("{level}%"),
            pump: output::on_off(record.pump_status),
        })
        .collect();

    let mut lines = Vec::with_capacity(3);
    if report.demo {
        lines.push("Showing demo data".to_owned());
    }
    lines.push(format!(
        "Tower {} over the last {} hours",
        report.tower_id, report.hours
    ));
    lines.push(output::render_table(&rows));
    lines.push(format!(
        "Samples: {}   Min: {}   Max: {}   Average: {}",
        report.stats.count,
        level_label(report.stats.min),
        level_label(report.stats.max),
        level_label(report.stats.average),
    ));
    lines.join("\n")
}

fn plain(report: &HistoryReport, series: &HistorySeries) -> String {
    series
        .points()
        .iter()
        .map(|&(index, level)| {
            let time = series.label(index).unwrap_or_else(|| "--:--".into());
            format!("{time} {level}")
        })
        .chain(report.demo.then(|| "# demo data".to_owned()))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    monitor: &TowerMonitor,
    args: HistoryArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let synthetic = monitor.config().is_synthetic();
    let hours = match args.hours {
        Some(0) => {
            return Err(CliError::Validation {
                field: "hours".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Some(hours) => hours,
        None => {
            let now = Local::now();
            let day = args.date.unwrap_or_else(|| now.date_naive());
            // Demo data is only interesting over a whole day.
            hours_since_day_start(day, &now, args.full_day || synthetic)
        }
    };

    let tower_id = TowerId(args.id);
    let (records, demo, hours) = match monitor.fetcher().fetch_history(tower_id, hours).await {
        Ok(records) => (records, synthetic, hours),
        Err(e) => {
            warn!(%tower_id, error = %e, "history unavailable, generating demo data");
            output::notice(
                &format!("Gateway history unavailable ({e}); showing demo data"),
                global.quiet,
                output::should_color(global.color),
            );
            let hours = hours.max(FALLBACK_MIN_HOURS);
            (synthetic_history(tower_id, hours, Utc::now()), true, hours)
        }
    };

    let series = HistorySeries::from_records(&records);
    let report = HistoryReport {
        tower_id,
        hours,
        demo,
        stats: aggregate(&records).into(),
        records,
    };

    let out = output::render_single(
        global.output,
        &report,
        |r| detail(r, &series),
        |r| plain(r, &series),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
