// hkc-core: Polling coordinators, panel clock and entities between hkc-api and consumers.

pub mod clock;
pub mod command;
pub mod config;
pub mod config_flow;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod integration;
pub mod model;
pub mod panel;

#[cfg(test)]
mod test_support;

// ── Primary re-exports ──────────────────────────────────────────────
pub use clock::{PanelClock, parse_panel_display};
pub use command::{AlarmCommand, interpret_response};
pub use config::{
    CONF_UPDATE_INTERVAL, CONFIG_ENTRY_VERSION, DEFAULT_MIN_REFRESH_INTERVAL,
    DEFAULT_UPDATE_INTERVAL, DOMAIN, PanelConfig, PanelSettings, TlsVerification,
};
pub use config_flow::{
    ConfigEntryDraft, ConfigFlowError, OptionsInput, UserInput, ensure_unique,
    validate_user_input,
};
pub use coordinator::{AlarmCoordinator, AlarmSnapshot, SensorCoordinator, SensorSnapshot};
pub use entity::{AlarmPanelEntity, DeviceInfo, EntityState, ZoneSensorEntity};
pub use error::CoreError;
pub use integration::Integration;
pub use panel::PanelApi;

pub use model::{
    AlarmState, Block, InputRecord, NEVER_TRIPPED, PanelDisplay, PanelStatus, ZoneState,
    zone_state,
};
