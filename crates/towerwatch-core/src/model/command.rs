use super::TowerId;

/// A pump command addressed to one tower.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlCommand {
    pub tower_id: TowerId,
    pub pump_on: bool,
    /// `None` leaves the gateway's mode untouched.
    pub auto_mode: Option<bool>,
}

impl ControlCommand {
    /// Manual pump override: the tower drops out of auto mode.
    pub fn manual_pump(tower_id: TowerId, pump_on: bool) -> Self {
        Self {
            tower_id,
            pump_on,
            auto_mode: Some(false),
        }
    }
}
