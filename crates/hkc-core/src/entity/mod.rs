// ── Entities ──
//
// The two entity kinds a panel exposes. Entities hold no connection of
// their own; their state is pushed in from the coordinators.

mod alarm_panel;
mod zone_sensor;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::config::DOMAIN;

pub use alarm_panel::{AlarmPanelEntity, SupportedFeatures, execute};
pub use zone_sensor::{ZoneSensorEntity, zone_entities};

pub const DEVICE_NAME: &str = "HKC Alarm System";

/// Device registry entry shared by every entity of one panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub identifiers: (String, String),
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub sw_version: String,
}

impl DeviceInfo {
    pub fn for_panel(panel_id: &str) -> Self {
        Self {
            identifiers: (DOMAIN.to_owned(), panel_id.to_owned()),
            name: DEVICE_NAME.to_owned(),
            manufacturer: "HKC".to_owned(),
            model: "HKC Alarm".to_owned(),
            sw_version: "1.0.0".to_owned(),
        }
    }
}

/// Published state of one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityState {
    pub unique_id: String,
    pub name: String,
    /// `None` until the entity has seen coordinator data.
    pub state: Option<String>,
    pub available: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
}
