// Wire types for the HKC panel API.
//
// Field names follow the vendor's camelCase JSON. The vendor is loose
// about some scalar types (LEDs arrive as 0/1 or true/false, input ids
// as strings or numbers). LEDs are kept exactly as sent; the others go
// through lenient decoders.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Response of the `status` endpoint: one block per partition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// Arming and fault flags for one partition block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct Block {
    /// 0 = unset, 1 = part set A, 2 = part set B, 3 = full set.
    #[serde(default)]
    pub arm_state: u8,
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default)]
    pub in_alarm: bool,
    #[serde(default)]
    pub in_fault: bool,
    #[serde(default)]
    pub user_allowed: bool,
    #[serde(default)]
    pub inhibit: bool,
}

/// Response of the `panel` endpoint: the keypad display mirror.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelData {
    /// LED state as the vendor sent it, usually `0`/`1`.
    #[serde(default)]
    pub green_led: Value,
    #[serde(default)]
    pub red_led: Value,
    #[serde(default)]
    pub amber_led: Value,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub cursor_on: bool,
    #[serde(default)]
    pub cursor_index: i64,
    /// Free-text keypad line, normally `"Dow DD Mon HH:MM"`.
    #[serde(default)]
    pub display: String,
    #[serde(default)]
    pub blink: String,
}

/// One zone input as reported by the `inputs` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    #[serde(deserialize_with = "lenient_id")]
    pub input_id: String,
    #[serde(default)]
    pub description: String,
    /// Last trip time, `"0001-01-01T00:00:00"` when never tripped.
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub input_state: i64,
}

/// Response of the `login` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub authenticated: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagRepr {
    Bool(bool),
    Int(i64),
    Null(()),
}

fn lenient_flag<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    Ok(match FlagRepr::deserialize(de)? {
        FlagRepr::Bool(b) => b,
        FlagRepr::Int(n) => n != 0,
        FlagRepr::Null(()) => false,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Str(String),
    Int(i64),
}

fn lenient_id<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(match IdRepr::deserialize(de)? {
        IdRepr::Str(s) => s,
        IdRepr::Int(n) => n.to_string(),
    })
}
