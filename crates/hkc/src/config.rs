//! Glue between the persisted config and the command handlers: load the
//! file, apply global flag overrides, pick an entry and build the
//! `PanelConfig` core consumes.

use tracing::info;

use hkc_config::{Config, Settings};
use hkc_core::{PanelConfig, PanelSettings};

use crate::cli::GlobalOpts;
use crate::error::CliError;

fn apply_overrides(settings: &mut Settings, global: &GlobalOpts) {
    if global.insecure {
        settings.insecure = true;
    }
    if let Some(timeout) = global.timeout {
        settings.timeout = timeout;
    }
}

/// Connection settings with `--insecure` / `--timeout` applied. Flags never
/// end up in the saved file.
pub fn panel_settings(cfg: &Config, global: &GlobalOpts) -> Result<PanelSettings, CliError> {
    let mut settings = cfg.settings.clone();
    apply_overrides(&mut settings, global);
    Ok(hkc_config::settings_to_panel_settings(&settings)?)
}

/// Resolve the selected entry into a runnable `PanelConfig`.
///
/// Entries written by older releases are migrated and saved back first.
pub fn resolve_panel(global: &GlobalOpts) -> Result<PanelConfig, CliError> {
    let mut cfg = hkc_config::load_config()?;
    if cfg.entries.is_empty() {
        return Err(CliError::NoConfig {
            path: hkc_config::config_path().display().to_string(),
        });
    }

    if cfg.migrate()? {
        hkc_config::save_config(&cfg)?;
        info!("config entries migrated to the current schema");
    }

    let entry = cfg.entry(global.entry.as_deref())?;
    let mut settings = cfg.settings.clone();
    apply_overrides(&mut settings, global);
    Ok(hkc_config::entry_to_panel_config(entry, &settings)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{ColorMode, OutputFormat};

    fn global(insecure: bool, timeout: Option<u64>) -> GlobalOpts {
        GlobalOpts {
            entry: None,
            output: OutputFormat::Table,
            color: ColorMode::Never,
            verbose: 0,
            quiet: false,
            yes: false,
            insecure,
            timeout,
        }
    }

    #[test]
    fn flags_override_file_settings() {
        let mut settings = Settings::default();
        apply_overrides(&mut settings, &global(true, Some(5)));
        assert!(settings.insecure);
        assert_eq!(settings.timeout, 5);
    }

    #[test]
    fn absent_flags_keep_file_settings() {
        let mut settings = Settings {
            insecure: true,
            timeout: 12,
            ..Settings::default()
        };
        apply_overrides(&mut settings, &global(false, None));
        assert!(settings.insecure);
        assert_eq!(settings.timeout, 12);
    }
}
