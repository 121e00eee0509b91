// ── Arming status domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Aggregate state of the alarm control panel entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlarmState {
    Disarmed,
    ArmedHome,
    ArmedNight,
    ArmedAway,
    Triggered,
}

/// Arming flags of one partition block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Block {
    /// 0 = unset, 1 = part set A, 2 = part set B, 3 = full set.
    pub arm_state: u8,
    pub in_alarm: bool,
    pub in_fault: bool,
    pub user_allowed: bool,
    pub inhibit: bool,
}

/// Ordered partition blocks as last reported by the panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelStatus {
    pub blocks: Vec<Block>,
}

impl PanelStatus {
    /// Collapse every block into one entity state.
    ///
    /// Any block in alarm wins, then the strongest arm level across blocks.
    pub fn alarm_state(&self) -> AlarmState {
        if self.blocks.iter().any(|b| b.in_alarm) {
            return AlarmState::Triggered;
        }
        let has = |level: u8| self.blocks.iter().any(|b| b.arm_state == level);
        if has(3) {
            AlarmState::ArmedAway
        } else if has(2) {
            AlarmState::ArmedNight
        } else if has(1) {
            AlarmState::ArmedHome
        } else {
            AlarmState::Disarmed
        }
    }
}

impl From<hkc_api::Block> for Block {
    fn from(b: hkc_api::Block) -> Self {
        Self {
            arm_state: b.arm_state,
            in_alarm: b.in_alarm,
            in_fault: b.in_fault,
            user_allowed: b.user_allowed,
            inhibit: b.inhibit,
        }
    }
}

impl From<hkc_api::SystemStatus> for PanelStatus {
    fn from(s: hkc_api::SystemStatus) -> Self {
        Self {
            blocks: s.blocks.into_iter().map(Block::from).collect(),
        }
    }
}
