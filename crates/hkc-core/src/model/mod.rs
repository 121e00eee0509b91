// ── Domain model ──
//
// Canonical types built from the panel API's wire types. Conversions live
// next to each type as `From` impls.

pub mod display;
pub mod input;
pub mod status;

pub use display::PanelDisplay;
pub use input::{InputRecord, NEVER_TRIPPED, ZoneState, zone_state};
pub use status::{AlarmState, Block, PanelStatus};
