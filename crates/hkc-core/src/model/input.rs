// ── Zone inputs and their derived state ──

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

/// Timestamp the panel reports for inputs that have never tripped.
pub const NEVER_TRIPPED: &str = "0001-01-01T00:00:00";

/// Panel timestamps have minute resolution; a trip inside this window of
/// panel time is treated as the zone currently being open.
const OPEN_WINDOW: TimeDelta = TimeDelta::seconds(60);

/// Trips older than this are stale and say nothing about the zone.
const STALE_AFTER: TimeDelta = TimeDelta::days(365);

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%dT%H:%M:%S"];

/// One zone input as last reported by the panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    /// Stable identifier, unique within the panel.
    pub input_id: String,
    /// Zone name; empty means the zone is not in use.
    pub description: String,
    /// Last trip time as an ISO-8601 string, see [`NEVER_TRIPPED`].
    pub timestamp: String,
    /// 1 = open, 2 = tamper, 5 = inhibited, anything else = closed.
    pub input_state: i64,
}

impl InputRecord {
    /// Parse the last trip time. `None` for unparsable strings.
    pub fn tripped_at(&self) -> Option<DateTime<Utc>> {
        TIMESTAMP_FORMATS.iter().find_map(|fmt| {
            NaiveDateTime::parse_from_str(&self.timestamp, fmt)
                .ok()
                .map(|naive| naive.and_utc())
        })
    }

    pub fn is_never_tripped(&self) -> bool {
        self.timestamp.trim_end_matches('Z') == NEVER_TRIPPED
    }
}

impl From<hkc_api::Input> for InputRecord {
    fn from(i: hkc_api::Input) -> Self {
        Self {
            input_id: i.input_id,
            description: i.description,
            timestamp: i.timestamp,
            input_state: i.input_state,
        }
    }
}

/// State shown by a zone sensor entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum ZoneState {
    Unused,
    Unknown,
    Open,
    Tamper,
    Inhibited,
    Closed,
}

/// Derive a zone's state from its record and the panel's clock.
///
/// Precedence: never tripped, unparsable timestamp, stale trip, recent trip,
/// then the raw input state. A stale trip reports `Closed` even when the
/// raw state says tamper.
pub fn zone_state(input: &InputRecord, panel_time: DateTime<Utc>) -> ZoneState {
    if input.is_never_tripped() {
        debug!(input_id = %input.input_id, "zone never tripped, unused");
        return ZoneState::Unused;
    }

    let Some(tripped_at) = input.tripped_at() else {
        debug!(
            input_id = %input.input_id,
            timestamp = %input.timestamp,
            "unparsable zone timestamp"
        );
        return ZoneState::Unknown;
    };

    let age = panel_time - tripped_at;

    if age > STALE_AFTER {
        debug!(input_id = %input.input_id, %tripped_at, "stale zone trip, closed");
        return ZoneState::Closed;
    }

    if age.abs() < OPEN_WINDOW {
        debug!(input_id = %input.input_id, "zone tripped within the last minute, open");
        return ZoneState::Open;
    }

    match input.input_state {
        1 => ZoneState::Open,
        2 => ZoneState::Tamper,
        5 => ZoneState::Inhibited,
        _ => ZoneState::Closed,
    }
}
