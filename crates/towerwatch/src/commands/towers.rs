//! Tower command handlers.

use tabled::Tabled;

use towerwatch_core::{FleetSummary, Tower, TowerId, TowerMonitor};

use crate::cli::{GlobalOpts, OutputFormat, TowersArgs, TowersCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct TowerRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "Pump")]
    pump: &'static str,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Mode")]
    mode: &'static str,
    #[tabled(rename = "Alarms")]
    alarms: String,
    #[tabled(rename = "Last Update")]
    updated: String,
}

impl From<&Tower> for TowerRow {
    fn from(t: &Tower) -> Self {
        Self {
            id: t.id.get(),
            name: t.name.clone(),
            level: format!("{}%", t.water_level),
            pump: output::on_off(t.pump_on),
            state: output::online_label(t.online, false),
            mode: if t.auto_mode { "auto" } else { "manual" },
            alarms: output::alarm_label(t, false),
            updated: util::last_seen(t),
        }
    }
}

pub fn detail(t: &Tower, color: bool) -> String {
    [
        format!("ID:          {}", t.id),
        format!("Name:        {}", t.name),
        format!("Level:       {}%", t.water_level),
        format!("Pump:        {}", output::on_off(t.pump_on)),
        format!("State:       {}", output::online_label(t.online, color)),
        format!("Mode:        {}", if t.auto_mode { "auto" } else { "manual" }),
        format!("Alarms:      {}", output::alarm_label(t, color)),
        format!("Last Update: {}", util::last_seen(t)),
    ]
    .join("\n")
}

pub fn summary_line(summary: &FleetSummary) -> String {
    format!(
        "{} towers, {} online, {} alarms, mode {}",
        summary.total, summary.online, summary.alarms, summary.mode
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    monitor: &TowerMonitor,
    args: TowersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        TowersCommand::List => {
            let snapshot = monitor.fetcher().fetch_all_towers().await?;
            let towers = snapshot.to_vec();
            let out = output::render_list(
                global.output,
                &towers,
                |t| TowerRow::from(t),
                |t| t.id.to_string(),
            );
            output::print_output(&out, global.quiet);

            if global.output == OutputFormat::Table && !towers.is_empty() {
                let summary = FleetSummary::of(&snapshot);
                output::print_output(&summary_line(&summary), global.quiet);
            }
            Ok(())
        }

        TowersCommand::Get { id } => {
            let tower = monitor
                .fetcher()
                .fetch_tower(TowerId(id))
                .await?
                .ok_or_else(|| CliError::tower_not_found(id))?;
            let color = output::should_color(global.color);
            let out = output::render_single(
                global.output,
                &tower,
                |t| detail(t, color),
                |t| t.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
