//! `hkc options`: the options step of the config flow.

use hkc_core::{CONF_UPDATE_INTERVAL, OptionsInput};

use crate::cli::{GlobalOpts, OptionsArgs};
use crate::error::CliError;

pub fn handle(args: &OptionsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let options = OptionsInput {
        update_interval: args.update_interval,
    }
    .validate()?;

    let mut cfg = hkc_config::load_config()?;
    // Options only exist from the newest schema on.
    cfg.migrate()?;
    let entry = cfg.set_options(global.entry.as_deref(), options)?;
    let summary = format!(
        "✓ {} ({}): {CONF_UPDATE_INTERVAL} = {}s",
        entry.title,
        entry.entry_id,
        entry.update_interval()
    );
    hkc_config::save_config(&cfg)?;

    if !global.quiet {
        eprintln!("{summary}");
    }
    Ok(())
}
