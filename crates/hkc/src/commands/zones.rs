//! `hkc zones`: zone sensors and their derived state.

use serde::Serialize;
use tabled::Tabled;

use hkc_core::{Integration, PanelApi, ZoneSensorEntity};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct ZoneView {
    unique_id: String,
    input_id: String,
    name: String,
    state: Option<String>,
    last_tripped: String,
    input_state: i64,
}

impl From<&ZoneSensorEntity> for ZoneView {
    fn from(z: &ZoneSensorEntity) -> Self {
        Self {
            unique_id: z.unique_id(),
            input_id: z.input_id().to_owned(),
            name: z.name().to_owned(),
            state: z.native_value().map(|s| s.to_string()),
            last_tripped: z.input().timestamp.clone(),
            input_state: z.input().input_state,
        }
    }
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ZoneRow {
    #[tabled(rename = "Input")]
    input: String,
    #[tabled(rename = "Zone")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Last Tripped")]
    last_tripped: String,
}

fn row(z: &ZoneView, color: bool) -> ZoneRow {
    let last_tripped = if z.state.as_deref() == Some("Unused") {
        "never".into()
    } else {
        z.last_tripped.clone()
    };
    ZoneRow {
        input: z.input_id.clone(),
        name: z.name.clone(),
        state: output::paint_state(z.state.as_deref().unwrap_or("-"), color),
        last_tripped,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle<C: PanelApi>(
    integration: &Integration<C>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let zones: Vec<ZoneView> = integration.zones().await.iter().map(ZoneView::from).collect();
    let color = output::should_color(global.color);
    let out = output::render_list(
        global.output,
        &zones,
        |z| row(z, color),
        |z| format!("{}\t{}", z.input_id, z.state.as_deref().unwrap_or("-")),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
