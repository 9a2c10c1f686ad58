// Domain model
//
// Normalized towers, fleet snapshots, status and history samples. Values are
// built fresh from every fetch and never mutated in place.

mod command;
mod history;
mod status;
mod tower;

pub use command::ControlCommand;
pub use history::HistoryRecord;
pub use status::{FleetSummary, ModeLabel, SystemStatus};
pub use tower::{FleetSnapshot, Tower, TowerId};

pub(crate) use tower::clamp_level;
#[cfg(test)]
pub(crate) use tower::tests::tower as tower_fixture;
