//! Config subcommand handlers.

use std::fmt::Write as _;

use serde::Serialize;
use serde_json::Value;
use tabled::{Table, Tabled, settings::Style};

use hkc_config::{Config, ConfigEntry, SecretField, Settings};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

const REDACTED: &str = "********";

// ── Show view ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ConfigView {
    path: String,
    default_entry: Option<String>,
    settings: Settings,
    entries: Vec<ConfigEntry>,
}

impl ConfigView {
    fn new(cfg: Config) -> Self {
        Self {
            path: hkc_config::config_path().display().to_string(),
            default_entry: cfg.default_entry,
            settings: cfg.settings,
            entries: cfg.entries.into_iter().map(redact).collect(),
        }
    }

    fn detail(&self) -> String {
        let s = &self.settings;
        let mut out = String::new();
        let _ = writeln!(out, "Config file:          {}", self.path);
        let _ = writeln!(out, "Base URL:             {}", s.base_url);
        let _ = writeln!(out, "Timeout:              {}s", s.timeout);
        let _ = writeln!(out, "Min refresh interval: {}s", s.min_refresh_interval);
        let _ = writeln!(out, "Insecure TLS:         {}", s.insecure);
        if let Some(ref ca) = s.ca_cert {
            let _ = writeln!(out, "CA certificate:       {}", ca.display());
        }

        if self.entries.is_empty() {
            out.push_str("\nNo panels configured. Add one with: hkc setup");
            return out;
        }

        let rows: Vec<EntryRow> = self
            .entries
            .iter()
            .map(|e| EntryRow::new(e, self.default_entry.as_deref()))
            .collect();
        let _ = write!(out, "\n{}", Table::new(rows).with(Style::rounded()));
        out
    }
}

/// Mask plaintext secrets; keyring-held ones are not in `data` at all.
fn redact(mut entry: ConfigEntry) -> ConfigEntry {
    for field in SecretField::ALL {
        if let Some(value) = entry.data.get_mut(field.data_key()) {
            *value = Value::from(REDACTED);
        }
    }
    entry
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Entry")]
    entry_id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Panel")]
    panel_id: String,
    #[tabled(rename = "Version")]
    version: u32,
    #[tabled(rename = "Interval")]
    interval: String,
    #[tabled(rename = "Default")]
    default: String,
}

impl EntryRow {
    fn new(e: &ConfigEntry, default_entry: Option<&str>) -> Self {
        Self {
            entry_id: e.entry_id.clone(),
            title: e.title.clone(),
            panel_id: e.panel_id().unwrap_or_else(|| "-".into()),
            version: e.version,
            interval: format!("{}s", e.update_interval()),
            default: if default_entry == Some(e.entry_id.as_str()) { "*" } else { "" }.into(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let view = ConfigView::new(hkc_config::load_config()?);
            let out = output::render_single(global.output, &view, ConfigView::detail, |v| {
                v.entries
                    .iter()
                    .map(|e| e.entry_id.clone())
                    .collect::<Vec<_>>()
                    .join("\n")
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&hkc_config::config_path().display().to_string(), false);
            Ok(())
        }

        ConfigCommand::Migrate => {
            let mut cfg = hkc_config::load_config()?;
            if cfg.migrate()? {
                hkc_config::save_config(&cfg)?;
                if !global.quiet {
                    eprintln!(
                        "✓ Entries migrated to schema version {}",
                        hkc_config::CURRENT_VERSION
                    );
                }
            } else if !global.quiet {
                eprintln!("Entries already at the current schema version");
            }
            Ok(())
        }

        ConfigCommand::Remove => {
            let mut cfg = hkc_config::load_config()?;
            let entry = cfg.entry(global.entry.as_deref())?;
            let prompt = format!("Remove {} ({})?", entry.title, entry.entry_id);
            if !util::confirm(&prompt, global.yes)? {
                return Ok(());
            }

            let removed = cfg.remove_entry(global.entry.as_deref())?;
            hkc_config::delete_keyring_secrets(&removed);
            hkc_config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Removed entry {}", removed.entry_id);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn plaintext_secrets_are_masked() {
        let entry = ConfigEntry {
            entry_id: "abc".into(),
            domain: "hkc_alarm".into(),
            title: "HKC Alarm".into(),
            version: 3,
            data: json!({ "panel_id": "12345", "panel_password": "pw", "user_code": "1234" })
                .as_object()
                .cloned()
                .unwrap(),
            options: serde_json::Map::new(),
        };
        let masked = redact(entry);
        assert_eq!(masked.data["panel_id"], json!("12345"));
        assert_eq!(masked.data["panel_password"], json!(REDACTED));
        assert_eq!(masked.data["user_code"], json!(REDACTED));
    }
}
