//! `hkc setup`: the user step of the config flow.
//!
//! Asks for whatever the flags did not supply, checks the credentials
//! against the HKC cloud and stores a new config entry.

use dialoguer::Input;
use secrecy::SecretString;

use hkc_config::ConfigEntry;
use hkc_core::{UserInput, ensure_unique, validate_user_input};

use crate::cli::{GlobalOpts, SetupArgs};
use crate::config;
use crate::error::CliError;

use super::util::prompt_err;

pub async fn handle(args: SetupArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = hkc_config::load_config()?;
    let config_path = hkc_config::config_path();

    let panel_id = match args.panel_id {
        Some(id) => id,
        None => Input::new()
            .with_prompt("Panel id")
            .interact_text()
            .map_err(prompt_err)?,
    };

    // Refuse a duplicate before asking for secrets.
    let configured: Vec<String> = cfg.entries.iter().filter_map(ConfigEntry::panel_id).collect();
    ensure_unique(&panel_id, configured.iter().map(String::as_str))?;

    let panel_password = match args.panel_password {
        Some(p) => p,
        None => rpassword::prompt_password("Panel password: ").map_err(prompt_err)?,
    };
    let user_code = match args.user_code {
        Some(c) => c,
        None => rpassword::prompt_password("User code: ").map_err(prompt_err)?,
    };

    let input = UserInput {
        panel_id,
        panel_password: SecretString::from(panel_password),
        user_code: SecretString::from(user_code),
        update_interval: args.update_interval,
    };

    let settings = config::panel_settings(&cfg, global)?;
    let draft = validate_user_input(&input, &settings).await?;
    let title = draft.title.clone();

    let entry_id = cfg.add_entry(draft)?.entry_id.clone();
    if args.keyring {
        if let Some(entry) = cfg.entries.iter_mut().find(|e| e.entry_id == entry_id) {
            hkc_config::store_secrets_in_keyring(entry)?;
        }
    }
    hkc_config::save_config(&cfg)?;

    if !global.quiet {
        eprintln!("✓ {title} configured (entry {entry_id})");
        if args.keyring {
            eprintln!("  Panel password and user code stored in system keyring");
        }
        eprintln!("  Config written to {}", config_path.display());
        eprintln!("\n  Try it: hkc status");
    }
    Ok(())
}
