use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{DeviceInfo, EntityState};
use crate::model::{InputRecord, ZoneState, zone_state};

/// One sensor entity per described zone input.
#[derive(Debug, Clone)]
pub struct ZoneSensorEntity {
    panel_id: String,
    input: InputRecord,
    native_value: Option<ZoneState>,
}

/// Build entities for every input with a description. Inputs without one
/// are not wired to a zone.
pub fn zone_entities(panel_id: &str, inputs: &[InputRecord]) -> Vec<ZoneSensorEntity> {
    inputs
        .iter()
        .filter(|input| !input.description.is_empty())
        .map(|input| ZoneSensorEntity::new(panel_id, input.clone()))
        .collect()
}

impl ZoneSensorEntity {
    pub fn new(panel_id: impl Into<String>, input: InputRecord) -> Self {
        Self {
            panel_id: panel_id.into(),
            input,
            native_value: None,
        }
    }

    pub fn unique_id(&self) -> String {
        format!("{}{}", self.panel_id, self.input.input_id)
    }

    pub fn input_id(&self) -> &str {
        &self.input.input_id
    }

    /// Zone description, shown under the device name.
    pub fn name(&self) -> &str {
        &self.input.description
    }

    #[allow(clippy::unused_self)]
    pub fn has_entity_name(&self) -> bool {
        true
    }

    #[allow(clippy::unused_self)]
    pub fn should_poll(&self) -> bool {
        false
    }

    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo::for_panel(&self.panel_id)
    }

    pub fn native_value(&self) -> Option<ZoneState> {
        self.native_value
    }

    /// The input record the current state was derived from.
    pub fn input(&self) -> &InputRecord {
        &self.input
    }

    /// Pick this entity's input out of a fresh list and re-derive its state.
    ///
    /// An input missing from the list keeps the previous record and state.
    pub fn handle_coordinator_update(&mut self, inputs: &[InputRecord], panel_time: DateTime<Utc>) {
        let Some(fresh) = inputs.iter().find(|i| i.input_id == self.input.input_id) else {
            warn!(
                input_id = %self.input.input_id,
                "no matching sensor data found for input"
            );
            return;
        };

        self.input = fresh.clone();
        let state = zone_state(&self.input, panel_time);
        if self.native_value != Some(state) {
            debug!(
                input_id = %self.input.input_id,
                zone = %self.input.description,
                %state,
                "zone state changed"
            );
        }
        self.native_value = Some(state);
    }

    pub fn state(&self) -> EntityState {
        EntityState {
            unique_id: self.unique_id(),
            name: self.name().to_owned(),
            state: self.native_value.map(|s| s.to_string()),
            available: true,
            attributes: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;
    use crate::model::NEVER_TRIPPED as NEVER;

    fn record(id: &str, description: &str, timestamp: &str, state: i64) -> InputRecord {
        InputRecord {
            input_id: id.into(),
            description: description.into(),
            timestamp: timestamp.into(),
            input_state: state,
        }
    }

    #[test]
    fn undescribed_inputs_get_no_entity() {
        let inputs = vec![
            record("1", "Front Door", "0001-01-01T00:00:00", 0),
            record("2", "", "0001-01-01T00:00:00", 0),
            record("3", "Kitchen PIR", "0001-01-01T00:00:00", 0),
        ];
        let entities = zone_entities("999", &inputs);
        let ids: Vec<String> = entities.iter().map(ZoneSensorEntity::unique_id).collect();
        assert_eq!(ids, vec!["9991", "9993"]);
        assert_eq!(entities[1].name(), "Kitchen PIR");
    }

    #[test]
    fn update_uses_panel_time() {
        let panel_time = Utc::now();
        let tripped = (panel_time - TimeDelta::seconds(20))
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string();
        let mut entity = ZoneSensorEntity::new("999", record("1", "Front Door", NEVER, 0));

        entity.handle_coordinator_update(&[record("1", "Front Door", &tripped, 0)], panel_time);
        assert_eq!(entity.native_value(), Some(ZoneState::Open));

        // Two minutes later on the panel the trip is no longer recent.
        entity.handle_coordinator_update(
            &[record("1", "Front Door", &tripped, 0)],
            panel_time + TimeDelta::minutes(2),
        );
        assert_eq!(entity.state().state.as_deref(), Some("Closed"));
    }

    #[test]
    fn missing_input_keeps_previous_state() {
        let mut entity = ZoneSensorEntity::new("999", record("1", "Front Door", NEVER, 0));
        let now = Utc::now();
        entity.handle_coordinator_update(&[record("1", "Front Door", NEVER, 0)], now);
        assert_eq!(entity.native_value(), Some(ZoneState::Unused));

        entity.handle_coordinator_update(&[record("2", "Back Door", NEVER, 1)], now);
        assert_eq!(entity.native_value(), Some(ZoneState::Unused));
        assert_eq!(entity.input().input_id, "1");
    }
}
