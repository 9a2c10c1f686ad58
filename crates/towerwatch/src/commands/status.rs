//! Gateway status handler.

use towerwatch_core::{ModeLabel, SystemStatus, TowerMonitor};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn detail(s: &SystemStatus, color: bool) -> String {
    [
        format!("Mode:        {}", ModeLabel::from(s.auto_mode)),
        format!("Towers:      {}", s.total_towers),
        format!("Online:      {}", s.online_towers),
        format!("Alarms:      {}", s.alarm_count),
        format!("Well water:  {}", output::state_label(s.well_water_ok, "ok", "low", color)),
    ]
    .join("\n")
}

pub async fn handle(monitor: &TowerMonitor, global: &GlobalOpts) -> Result<(), CliError> {
    let status = monitor.fetcher().fetch_status().await?;
    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        &status,
        |s| detail(s, color),
        |s| ModeLabel::from(s.auto_mode).to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
