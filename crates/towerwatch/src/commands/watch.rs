//! Watch command: poll on a schedule and print what changed until Ctrl-C.

use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use towerwatch_core::{FleetSummary, FleetUpdate, PollEvent, Tower, TowerId, TowerMonitor};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::towers::{self, TowerRow};

/// One change record in structured output.
#[derive(Serialize)]
struct ChangeEvent<'a> {
    at: DateTime<Local>,
    summary: FleetSummary,
    changed: Vec<&'a Tower>,
    removed: Vec<TowerId>,
}

fn render_update(update: &FleetUpdate, global: &GlobalOpts) -> String {
    let changed: Vec<&Tower> = update
        .diff
        .changed()
        .filter_map(|id| update.snapshot.get(id))
        .collect();
    let event = ChangeEvent {
        at: Local::now(),
        summary: update.summary,
        changed,
        removed: update.diff.removed.clone(),
    };

    match global.output {
        OutputFormat::Table => {
            let mut lines = vec![format!(
                "[{}] {}",
                event.at.format("%H:%M:%S"),
                towers::summary_line(&event.summary)
            )];
            if !event.changed.is_empty() {
                let rows: Vec<TowerRow> =
                    event.changed.iter().map(|t| TowerRow::from(*t)).collect();
                lines.push(output::render_table(&rows));
            }
            if !event.removed.is_empty() {
                let ids: Vec<String> = event.removed.iter().map(ToString::to_string).collect();
                lines.push(format!("Gone: {}", ids.join(", ")));
            }
            lines.join("\n")
        }
        // One event per line so the stream stays parseable.
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json(&event, true),
        OutputFormat::Yaml => format!("---\n{}", output::render_yaml(&event)),
        OutputFormat::Plain => event
            .changed
            .iter()
            .map(|t| format!("{} {} {}", t.id, t.water_level, output::on_off(t.pump_on)))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

pub async fn handle(
    monitor: &TowerMonitor,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let interval = match args.interval_ms {
        Some(0) => {
            return Err(CliError::Validation {
                field: "interval".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Some(ms) => Duration::from_millis(ms),
        None => monitor.poll_interval(),
    };

    let poller = monitor.poller();
    let mut events = poller.subscribe();
    poller.start(interval).await?;

    let color = output::should_color(global.color);
    output::notice(
        &format!(
            "Watching {} every {}ms (Ctrl-C to stop)",
            monitor.config().base_address(),
            interval.as_millis()
        ),
        global.quiet,
        color,
    );

    // Show the fleet now instead of after the first interval. Its outcome
    // arrives through the event stream like any scheduled poll.
    let _ = poller.refresh_now().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                debug!("interrupt received, stopping watch");
                break;
            }
            event = events.recv() => match event {
                Ok(PollEvent::Updated(update)) => {
                    output::print_output(&render_update(&update, global), global.quiet);
                }
                Ok(PollEvent::Failed(e)) => {
                    output::notice(&format!("Poll failed: {e}"), global.quiet, color);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "watch output fell behind, some updates were dropped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    monitor.shutdown().await;
    Ok(())
}
