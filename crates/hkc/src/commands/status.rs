//! `hkc status`: alarm state and keypad display.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use hkc_core::{Integration, PanelApi};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
pub struct StatusView {
    pub panel_id: String,
    pub state: Option<String>,
    pub available: bool,
    pub panel_time: DateTime<Utc>,
    pub attributes: BTreeMap<String, Value>,
}

impl StatusView {
    pub async fn collect<C: PanelApi>(integration: &Integration<C>) -> Self {
        let states = integration.entity_states().await;
        let alarm = states.into_iter().next();
        Self {
            panel_id: integration.panel_id().to_owned(),
            state: alarm.as_ref().and_then(|a| a.state.clone()),
            available: alarm.as_ref().is_some_and(|a| a.available),
            panel_time: integration.alarm().panel_time(),
            attributes: alarm.map(|a| a.attributes).unwrap_or_default(),
        }
    }

    fn detail(&self, color: bool) -> String {
        let state = self.state.as_deref().unwrap_or("unknown");
        let mut out = String::new();
        let _ = writeln!(out, "Panel:      {}", self.panel_id);
        let _ = writeln!(out, "State:      {}", output::paint_state(state, color));
        let _ = writeln!(out, "Available:  {}", if self.available { "yes" } else { "no" });
        let _ = write!(out, "Panel time: {}", self.panel_time.format("%a %d %b %H:%M"));
        for (key, value) in &self.attributes {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let _ = write!(out, "\n{:<12}{rendered}", format!("{key}:"));
        }
        out
    }
}

pub async fn handle<C: PanelApi>(
    integration: &Integration<C>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let view = StatusView::collect(integration).await;
    print(&view, global);
    Ok(())
}

pub fn print(view: &StatusView, global: &GlobalOpts) {
    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        view,
        |v| v.detail(color),
        |v| v.state.clone().unwrap_or_default(),
    );
    output::print_output(&out, global.quiet);
}
