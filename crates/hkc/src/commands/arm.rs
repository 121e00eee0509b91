//! `hkc arm` / `hkc disarm`.

use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use hkc_core::{AlarmCommand, Integration, PanelApi};

use crate::cli::{ArmArgs, ArmMode, DisarmArgs, GlobalOpts};
use crate::error::CliError;

use super::status::{self, StatusView};

/// How long `--wait` listens for the alarm entity after the settle refresh.
const ENTITY_UPDATE_TIMEOUT: Duration = Duration::from_secs(5);

pub fn command_for(mode: ArmMode) -> AlarmCommand {
    match mode {
        ArmMode::Home => AlarmCommand::ArmHome,
        ArmMode::Night => AlarmCommand::ArmNight,
        ArmMode::Away => AlarmCommand::ArmAway,
    }
}

pub async fn handle_arm<C: PanelApi>(
    integration: &Integration<C>,
    args: &ArmArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    send(integration, command_for(args.mode), args.wait, global).await
}

pub async fn handle_disarm<C: PanelApi>(
    integration: &Integration<C>,
    args: &DisarmArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    send(integration, AlarmCommand::Disarm, args.wait, global).await
}

async fn send<C: PanelApi>(
    integration: &Integration<C>,
    command: AlarmCommand,
    wait: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    // Listeners must be running before the command so the settle refresh
    // reaches the alarm entity.
    let states = integration.subscribe();
    if wait {
        integration.start().await;
    }

    let refresh = integration.execute(command).await?;
    if !global.quiet {
        eprintln!("{} accepted by panel {}", command.name(), integration.panel_id());
    }

    if wait {
        if !global.quiet {
            eprintln!(
                "Waiting {}s for the panel to settle...",
                command.settle_delay().as_secs()
            );
        }
        wait_for_settle(integration, refresh, states).await;
        status::print(&StatusView::collect(integration).await, global);
    }
    Ok(())
}

async fn wait_for_settle<C: PanelApi>(
    integration: &Integration<C>,
    refresh: JoinHandle<()>,
    mut states: tokio::sync::broadcast::Receiver<hkc_core::EntityState>,
) {
    if let Err(e) = refresh.await {
        warn!(error = %e, "settle refresh task failed");
        return;
    }

    let alarm_id = integration
        .entity_states()
        .await
        .into_iter()
        .next()
        .map(|s| s.unique_id)
        .unwrap_or_default();

    let listen = async {
        loop {
            match states.recv().await {
                Ok(state) if state.unique_id == alarm_id => break,
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
    };
    if tokio::time::timeout(ENTITY_UPDATE_TIMEOUT, listen).await.is_err() {
        debug!("no alarm entity update after settle refresh");
    }
}
