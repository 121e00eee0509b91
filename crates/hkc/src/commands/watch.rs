//! `hkc watch`: run the poll loop and stream entity state changes until
//! interrupted.

use chrono::Local;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use hkc_core::{EntityState, Integration, OptionsInput, PanelApi};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle<C: PanelApi>(
    integration: &Integration<C>,
    args: &WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(update_interval) = args.interval {
        integration.update_options(OptionsInput { update_interval })?;
    }

    let mut states = integration.subscribe();
    integration.start().await;
    info!(
        interval_secs = integration.update_interval().as_secs(),
        "watching panel, Ctrl-C to stop"
    );

    let color = output::should_color(global.color);
    for state in integration.entity_states().await {
        emit(&state, global, color);
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            received = states.recv() => match received {
                Ok(state) => emit(&state, global, color),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "output fell behind, some state changes were skipped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }
    Ok(())
}

fn emit(state: &EntityState, global: &GlobalOpts, color: bool) {
    let line = match global.output {
        OutputFormat::Table | OutputFormat::Plain => format_line(state, color),
        // One document per change so the stream stays parseable.
        OutputFormat::Json | OutputFormat::JsonCompact => {
            structured(OutputFormat::JsonCompact, state)
        }
        OutputFormat::Yaml => format!("---\n{}", structured(OutputFormat::Yaml, state)),
    };
    output::print_output(&line, global.quiet);
}

fn structured(format: OutputFormat, state: &EntityState) -> String {
    output::render_single(format, state, |s| s.unique_id.clone(), |s| s.unique_id.clone())
}

fn format_line(state: &EntityState, color: bool) -> String {
    let value = state.state.as_deref().unwrap_or("unknown");
    let availability = if state.available { "" } else { " (unavailable)" };
    format!(
        "{}  {:<24} {}{availability}",
        Local::now().format("%H:%M:%S"),
        state.name,
        output::paint_state(value, color)
    )
}
