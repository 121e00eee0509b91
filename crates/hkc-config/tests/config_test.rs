#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};

use hkc_config::{
    Config, ConfigError, ConfigEntry, CURRENT_VERSION, Settings, entry_to_panel_config,
    load_config_from, save_config_to,
};
use hkc_core::{ConfigEntryDraft, OptionsInput};

fn draft(panel_id: &str) -> ConfigEntryDraft {
    let mut data = Map::new();
    data.insert("panel_id".into(), json!(panel_id));
    data.insert("panel_password".into(), json!("pw"));
    data.insert("user_code".into(), json!("1234"));
    let mut options = Map::new();
    options.insert("update_interval".into(), json!(60));
    ConfigEntryDraft {
        title: "HKC Alarm".into(),
        version: CURRENT_VERSION,
        unique_id: panel_id.into(),
        data,
        options,
    }
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
    assert_eq!(cfg.entries.len(), 0);
    assert_eq!(cfg.settings, Settings::default());
}

#[test]
fn save_then_load_keeps_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut cfg = Config::default();
    cfg.add_entry(draft("12345")).unwrap();
    save_config_to(&cfg, &path).unwrap();

    let loaded = load_config_from(&path).unwrap();
    assert_eq!(loaded, cfg);
    assert_eq!(loaded.entry(None).unwrap().panel_id().as_deref(), Some("12345"));
}

#[test]
fn legacy_file_migrates_on_demand() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[[entries]]
entry_id = "old"
title = "HKC Alarm"
version = 2

[entries.data]
panel_id = "12345"
panel_password = "pw"
user_code = "1234"
update_interval = 20
"#,
    )
    .unwrap();

    let mut cfg = load_config_from(&path).unwrap();
    let entry = cfg.entry(Some("old")).unwrap();
    assert_eq!(entry.domain, "hkc_alarm");
    assert_eq!(entry.update_interval(), 20);

    assert!(cfg.migrate().unwrap());
    let entry = cfg.entry(Some("12345")).unwrap();
    assert_eq!(entry.version, 3);
    assert_eq!(entry.options["update_interval"], json!(20));

    let panel = entry_to_panel_config(entry, &cfg.settings).unwrap();
    assert_eq!(panel.panel_id, "12345");
    assert_eq!(panel.update_interval.as_secs(), 20);
}

#[test]
fn duplicate_panel_is_refused() {
    let mut cfg = Config::default();
    cfg.add_entry(draft("12345")).unwrap();
    let err = cfg.add_entry(draft("12345")).unwrap_err();
    assert!(matches!(err, ConfigError::Flow(_)));
    assert_eq!(cfg.entries.len(), 1);
}

#[test]
fn selection_with_several_entries() {
    let mut cfg = Config::default();
    let first = cfg.add_entry(draft("111")).unwrap().entry_id.clone();
    cfg.add_entry(draft("222")).unwrap();

    // First entry becomes the default.
    assert_eq!(cfg.entry(None).unwrap().entry_id, first);
    assert_eq!(cfg.entry(Some("222")).unwrap().panel_id().as_deref(), Some("222"));
    assert!(matches!(
        cfg.entry(Some("333")),
        Err(ConfigError::NotFound { .. })
    ));

    cfg.remove_entry(None).unwrap();
    assert_eq!(cfg.entry(None).unwrap().panel_id().as_deref(), Some("222"));
}

#[test]
fn options_update_replaces_interval() {
    let mut cfg = Config::default();
    cfg.add_entry(draft("12345")).unwrap();
    let options = OptionsInput { update_interval: 15 }.validate().unwrap();
    let entry: &ConfigEntry = cfg.set_options(None, options).unwrap();
    assert_eq!(entry.options.get("update_interval"), Some(&Value::from(15)));
}
