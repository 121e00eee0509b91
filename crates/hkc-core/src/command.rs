// ── Arming commands ──
//
// What can be sent to the panel, how long the panel needs before its status
// reflects a command, and how the vendor's reply is judged.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};
use tracing::debug;

use crate::error::CoreError;
use crate::panel::PanelApi;

/// Vendor result code for an accepted command.
const CODE_OK: i64 = 5;
/// Vendor result code for "already in the requested state".
const CODE_ALREADY: i64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlarmCommand {
    Disarm,
    ArmHome,
    ArmNight,
    ArmAway,
}

impl AlarmCommand {
    pub fn name(self) -> &'static str {
        match self {
            Self::Disarm => "disarm",
            Self::ArmHome => "arm_home",
            Self::ArmNight => "arm_night",
            Self::ArmAway => "arm_away",
        }
    }

    /// Time the panel needs before its status reflects the command.
    pub fn settle_delay(self) -> Duration {
        match self {
            Self::Disarm => Duration::from_secs(3),
            Self::ArmHome | Self::ArmNight | Self::ArmAway => Duration::from_secs(10),
        }
    }

    fn key_prefix(self) -> &'static str {
        match self {
            Self::Disarm => "disarm",
            Self::ArmHome | Self::ArmNight | Self::ArmAway => "arm",
        }
    }

    /// Send the command and return the panel's raw reply.
    pub async fn send<C: PanelApi>(self, client: &C) -> Result<Value, CoreError> {
        debug!(command = self.name(), "sending alarm command");
        let result = match self {
            Self::Disarm => client.disarm().await,
            Self::ArmHome => client.arm_partset_a().await,
            Self::ArmNight => client.arm_partset_b().await,
            Self::ArmAway => client.arm_fullset().await,
        };
        result.map_err(|e| match e {
            hkc_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            other => CoreError::CommandFailed {
                command: self.name().into(),
                reason: other.to_string(),
            },
        })
    }
}

/// Judge the panel's reply to `command`.
///
/// Code 5 is success. Code 4 and any other code carrying an `errors` list
/// are validation errors the user can act on. Anything else is unexpected.
pub fn interpret_response(command: AlarmCommand, response: &Value) -> Result<(), CoreError> {
    let code = response.get("code").and_then(Value::as_i64);

    if code == Some(CODE_OK) {
        debug!(command = command.name(), "command accepted");
        return Ok(());
    }

    if code == Some(CODE_ALREADY) {
        let (translation_key, message) = match command {
            AlarmCommand::Disarm => ("already_disarmed", "The alarm is already disarmed"),
            _ => ("already_armed", "The alarm is already armed"),
        };
        return Err(CoreError::Validation {
            translation_key: translation_key.into(),
            message: message.into(),
        });
    }

    let descriptions: Vec<&str> = response
        .get("errors")
        .and_then(Value::as_array)
        .map(|errors| errors.iter().filter_map(error_description).collect())
        .unwrap_or_default();

    if code.is_some() && !descriptions.is_empty() {
        return Err(CoreError::Validation {
            translation_key: format!("{}_rejected", command.key_prefix()),
            message: descriptions.join("; "),
        });
    }

    Err(CoreError::UnexpectedResponse {
        response: response.clone(),
    })
}

/// An `errors` entry is either a bare string or an object with a
/// `description`.
fn error_description(entry: &Value) -> Option<&str> {
    entry
        .as_str()
        .or_else(|| entry.get("description").and_then(Value::as_str))
        .filter(|s| !s.is_empty())
}
