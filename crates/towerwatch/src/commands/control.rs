//! Pump and mode command handlers.

use towerwatch_core::{CommandOutcome, ModeLabel, RefreshOutcome, TowerId, TowerMonitor};

use crate::cli::{GlobalOpts, ModeArgs, OutputFormat, PumpArgs};
use crate::error::CliError;
use crate::output;

use super::{towers, util};

/// Surface a failed follow-up refresh without failing the command.
fn refresh_notice(outcome: &CommandOutcome, global: &GlobalOpts) {
    if let Err(e) = &outcome.refreshed {
        output::notice(
            &format!("Command sent, but the fleet could not be refreshed: {e}"),
            global.quiet,
            output::should_color(global.color),
        );
    }
}

pub async fn handle_pump(
    monitor: &TowerMonitor,
    args: PumpArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let id = TowerId(args.id);
    let tower = monitor
        .fetcher()
        .fetch_tower(id)
        .await?
        .ok_or_else(|| CliError::tower_not_found(args.id))?;

    if !tower.online && !args.force {
        return Err(CliError::TowerOffline { id: args.id });
    }

    let on = args.state.is_on();
    let prompt = format!(
        "Turn the pump {} on {} (switches it to manual)?",
        output::on_off(on),
        tower.name
    );
    let color = output::should_color(global.color);
    if !util::confirm(&prompt, global.yes)? {
        output::notice("Cancelled", global.quiet, color);
        return Ok(());
    }

    let outcome = monitor.dispatcher().set_pump(id, on).await;
    refresh_notice(&outcome, global);
    let ack = outcome.sent?;

    if global.output != OutputFormat::Table {
        let out = output::render_single(global.output, &ack, |_| String::new(), |_| id.to_string());
        output::print_output(&out, global.quiet);
        return Ok(());
    }

    output::notice(
        &format!("Pump on {} switched {}", tower.name, output::on_off(on)),
        global.quiet,
        color,
    );
    let current = outcome
        .refreshed
        .as_ref()
        .ok()
        .and_then(RefreshOutcome::update)
        .and_then(|update| update.snapshot.get(id).cloned());
    if let Some(current) = current {
        output::print_output(&towers::detail(&current, color), global.quiet);
    }
    Ok(())
}

pub async fn handle_mode(
    monitor: &TowerMonitor,
    args: ModeArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let outcome = monitor
        .dispatcher()
        .set_auto_mode(args.mode == ModeLabel::Auto)
        .await;
    refresh_notice(&outcome, global);
    let ack = outcome.sent?;

    if global.output != OutputFormat::Table {
        let out = output::render_single(
            global.output,
            &ack,
            |_| String::new(),
            |_| args.mode.to_string(),
        );
        output::print_output(&out, global.quiet);
        return Ok(());
    }

    let color = output::should_color(global.color);
    output::notice(&format!("Fleet mode set to {}", args.mode), global.quiet, color);
    if let Some(update) = outcome.refreshed.as_ref().ok().and_then(RefreshOutcome::update) {
        output::print_output(&towers::summary_line(&update.summary), global.quiet);
    }
    Ok(())
}
