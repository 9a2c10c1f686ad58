//! Command dispatch: bridges CLI args -> core calls -> output formatting.

pub mod config_cmd;
pub mod control;
pub mod history;
pub mod status;
pub mod towers;
pub mod util;
pub mod watch;

use towerwatch_core::TowerMonitor;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a gateway-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    monitor: &TowerMonitor,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Towers(args) => towers::handle(monitor, args, global).await,
        Command::Status => status::handle(monitor, global).await,
        Command::History(args) => history::handle(monitor, args, global).await,
        Command::Pump(args) => control::handle_pump(monitor, args, global).await,
        Command::Mode(args) => control::handle_mode(monitor, args, global).await,
        Command::Watch(args) => watch::handle(monitor, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
