//! Command dispatch: bridges CLI args -> core integration -> output formatting.

pub mod arm;
pub mod config_cmd;
pub mod options;
pub mod setup;
pub mod status;
pub mod util;
pub mod watch;
pub mod zones;

use hkc_core::{Integration, PanelConfig};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Set up the panel and hand a panel-bound command to its handler.
pub async fn dispatch(
    cmd: Command,
    panel: PanelConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let integration = Integration::connect(panel).await?;
    let result = match cmd {
        Command::Status => status::handle(&integration, global).await,
        Command::Zones => zones::handle(&integration, global).await,
        Command::Arm(args) => arm::handle_arm(&integration, &args, global).await,
        Command::Disarm(args) => arm::handle_disarm(&integration, &args, global).await,
        Command::Watch(args) => watch::handle(&integration, &args, global).await,
        // Handled in main before a panel is resolved
        Command::Setup(_) | Command::Options(_) | Command::Config(_) | Command::Completions(_) => {
            unreachable!()
        }
    };
    integration.unload().await;
    result
}
