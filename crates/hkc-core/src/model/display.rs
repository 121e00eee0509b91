use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Mirror of the panel keypad: LEDs, cursor and the display line.
///
/// The display line doubles as the panel's clock, see [`crate::clock`].
/// LEDs keep whatever the vendor sent, normally `0` or `1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelDisplay {
    pub green_led: Value,
    pub red_led: Value,
    pub amber_led: Value,
    pub cursor_on: bool,
    pub cursor_index: i64,
    pub display: String,
    pub blink: String,
}

impl PanelDisplay {
    /// Extra state attributes shown on the alarm panel entity.
    pub fn attributes(&self) -> BTreeMap<String, Value> {
        BTreeMap::from([
            ("Green LED".to_owned(), self.green_led.clone()),
            ("Red LED".to_owned(), self.red_led.clone()),
            ("Amber LED".to_owned(), self.amber_led.clone()),
            ("Cursor On".to_owned(), Value::from(self.cursor_on)),
            ("Cursor Index".to_owned(), Value::from(self.cursor_index)),
            ("Display".to_owned(), Value::from(self.display.clone())),
            ("Blink".to_owned(), Value::from(self.blink.clone())),
        ])
    }
}

impl From<hkc_api::PanelData> for PanelDisplay {
    fn from(p: hkc_api::PanelData) -> Self {
        Self {
            green_led: p.green_led,
            red_led: p.red_led,
            amber_led: p.amber_led,
            cursor_on: p.cursor_on,
            cursor_index: p.cursor_index,
            display: p.display,
            blink: p.blink,
        }
    }
}
