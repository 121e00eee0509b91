//! Persisted configuration for HKC panel tools.
//!
//! A TOML file of config entries (one per panel) plus global connection
//! settings, versioned entry schemas with one-way migration, credential
//! resolution (env + keyring + plaintext), and translation to
//! `hkc_core::PanelConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::{debug, info};

use hkc_core::{
    CONF_UPDATE_INTERVAL, CONFIG_ENTRY_VERSION, ConfigEntryDraft, ConfigFlowError,
    DEFAULT_MIN_REFRESH_INTERVAL, DEFAULT_UPDATE_INTERVAL, DOMAIN, PanelConfig, PanelSettings,
    TlsVerification,
};

/// Newest entry schema. v1 had credentials only, v2 added the poll
/// interval to `data`, v3 moved it to `options`.
pub const CURRENT_VERSION: u32 = CONFIG_ENTRY_VERSION;

/// Environment variable pointing at an alternative config file.
pub const CONFIG_ENV: &str = "HKC_CONFIG";

const KEYRING_SERVICE: &str = "hkc";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no {field} configured for entry '{entry}'")]
    NoCredentials { entry: String, field: &'static str },

    #[error("no config entry matches '{selector}'")]
    NotFound { selector: String },

    #[error("entry '{entry_id}' has unsupported schema version {version}")]
    UnsupportedVersion { entry_id: String, version: u32 },

    #[error(transparent)]
    Flow(#[from] ConfigFlowError),

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl From<keyring::Error> for ConfigError {
    fn from(err: keyring::Error) -> Self {
        Self::Keyring(err.to_string())
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration file.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Entry used when no `--entry` is given and more than one exists.
    pub default_entry: Option<String>,

    #[serde(default)]
    pub settings: Settings,

    #[serde(default)]
    pub entries: Vec<ConfigEntry>,
}

/// Connection settings shared by every entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Floor between two fetches of the same coordinator, in seconds.
    #[serde(default = "default_min_refresh_interval")]
    pub min_refresh_interval: u64,

    #[serde(default)]
    pub insecure: bool,

    pub ca_cert: Option<PathBuf>,

    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            min_refresh_interval: default_min_refresh_interval(),
            insecure: false,
            ca_cert: None,
            output: default_output(),
        }
    }
}

fn default_base_url() -> String {
    hkc_core::config::DEFAULT_BASE_URL.to_owned()
}
fn default_timeout() -> u64 {
    30
}
fn default_min_refresh_interval() -> u64 {
    DEFAULT_MIN_REFRESH_INTERVAL
}
fn default_output() -> String {
    "table".into()
}
fn default_domain() -> String {
    DOMAIN.into()
}

/// One configured panel, stored the way the host stores config entries.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConfigEntry {
    pub entry_id: String,

    #[serde(default = "default_domain")]
    pub domain: String,

    pub title: String,

    /// Schema version of `data`/`options`, see [`CURRENT_VERSION`].
    pub version: u32,

    /// Set at creation: credentials.
    #[serde(default)]
    pub data: Map<String, Value>,

    /// Changed through the options step: poll interval.
    #[serde(default)]
    pub options: Map<String, Value>,
}

impl ConfigEntry {
    /// Build an entry from a validated config flow result.
    pub fn from_draft(draft: ConfigEntryDraft) -> Self {
        Self {
            entry_id: uuid::Uuid::new_v4().simple().to_string(),
            domain: DOMAIN.into(),
            title: draft.title,
            version: draft.version,
            data: draft.data,
            options: draft.options,
        }
    }

    pub fn panel_id(&self) -> Option<String> {
        match self.data.get("panel_id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Poll interval in seconds: options first, then data (pre-v3 entries),
    /// then the default.
    pub fn update_interval(&self) -> u64 {
        self.options
            .get(CONF_UPDATE_INTERVAL)
            .or_else(|| self.data.get(CONF_UPDATE_INTERVAL))
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_UPDATE_INTERVAL)
    }

    fn matches(&self, selector: &str) -> bool {
        self.entry_id == selector
            || self.panel_id().as_deref() == Some(selector)
            || self.title == selector
    }
}

// ── Schema migration ────────────────────────────────────────────────

/// Bring an entry up to [`CURRENT_VERSION`]. Returns whether it changed.
///
/// One-way: an entry written by a newer release is refused rather than
/// guessed at.
pub fn migrate_entry(entry: &mut ConfigEntry) -> Result<bool, ConfigError> {
    if entry.version > CURRENT_VERSION || entry.version == 0 {
        return Err(ConfigError::UnsupportedVersion {
            entry_id: entry.entry_id.clone(),
            version: entry.version,
        });
    }
    if entry.version == CURRENT_VERSION {
        return Ok(false);
    }

    let from = entry.version;
    if entry.version == 1 {
        migrate_v1_to_v2(entry);
    }
    if entry.version == 2 {
        migrate_v2_to_v3(entry);
    }

    info!(
        entry_id = %entry.entry_id,
        from,
        to = entry.version,
        "migrated config entry"
    );
    Ok(true)
}

/// v2 carries the poll interval in `data`.
fn migrate_v1_to_v2(entry: &mut ConfigEntry) {
    entry
        .data
        .entry(CONF_UPDATE_INTERVAL)
        .or_insert_with(|| json!(DEFAULT_UPDATE_INTERVAL));
    entry.version = 2;
}

/// v3 keeps the poll interval in `options`. An interval already set
/// through the options step wins over the one in `data`.
fn migrate_v2_to_v3(entry: &mut ConfigEntry) {
    let from_data = entry.data.remove(CONF_UPDATE_INTERVAL);
    if !entry.options.contains_key(CONF_UPDATE_INTERVAL) {
        let interval = from_data.unwrap_or_else(|| json!(DEFAULT_UPDATE_INTERVAL));
        entry.options.insert(CONF_UPDATE_INTERVAL.into(), interval);
    }
    entry.version = 3;
}

// ── Entry management ────────────────────────────────────────────────

impl Config {
    /// Migrate every entry. Returns whether anything changed.
    pub fn migrate(&mut self) -> Result<bool, ConfigError> {
        let mut changed = false;
        for entry in &mut self.entries {
            changed |= migrate_entry(entry)?;
        }
        Ok(changed)
    }

    /// Pick an entry by id, panel id or title; without a selector, the
    /// default entry or the only one.
    pub fn entry(&self, selector: Option<&str>) -> Result<&ConfigEntry, ConfigError> {
        let selector = selector.or(self.default_entry.as_deref());
        match selector {
            Some(sel) => self
                .entries
                .iter()
                .find(|e| e.matches(sel))
                .ok_or_else(|| ConfigError::NotFound {
                    selector: sel.into(),
                }),
            None => match self.entries.as_slice() {
                [only] => Ok(only),
                [] => Err(ConfigError::NotFound {
                    selector: "(none configured)".into(),
                }),
                _ => Err(ConfigError::Validation {
                    field: "entry".into(),
                    reason: "several panels are configured; pass --entry or set default_entry"
                        .into(),
                }),
            },
        }
    }

    /// Store a new entry. A second entry for the same panel is refused.
    pub fn add_entry(&mut self, draft: ConfigEntryDraft) -> Result<&ConfigEntry, ConfigError> {
        let existing: Vec<String> = self.entries.iter().filter_map(ConfigEntry::panel_id).collect();
        hkc_core::ensure_unique(&draft.unique_id, existing.iter().map(String::as_str))?;

        let entry = ConfigEntry::from_draft(draft);
        debug!(entry_id = %entry.entry_id, "adding config entry");
        if self.default_entry.is_none() {
            self.default_entry = Some(entry.entry_id.clone());
        }
        self.entries.push(entry);
        let last = self.entries.len() - 1;
        Ok(&self.entries[last])
    }

    /// Replace an entry's options.
    pub fn set_options(
        &mut self,
        selector: Option<&str>,
        options: Map<String, Value>,
    ) -> Result<&ConfigEntry, ConfigError> {
        let entry_id = self.entry(selector)?.entry_id.clone();
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.entry_id == entry_id)
            .ok_or(ConfigError::NotFound { selector: entry_id })?;
        entry.options.extend(options);
        Ok(entry)
    }

    pub fn remove_entry(&mut self, selector: Option<&str>) -> Result<ConfigEntry, ConfigError> {
        let entry_id = self.entry(selector)?.entry_id.clone();
        let idx = self
            .entries
            .iter()
            .position(|e| e.entry_id == entry_id)
            .ok_or_else(|| ConfigError::NotFound {
                selector: entry_id.clone(),
            })?;
        let removed = self.entries.remove(idx);
        if self.default_entry.as_deref() == Some(entry_id.as_str()) {
            self.default_entry = self.entries.first().map(|e| e.entry_id.clone());
        }
        Ok(removed)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `HKC_CONFIG`, else platform conventions.
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "hkc", "hkc-bridge").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("hkc-bridge");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load defaults, then the TOML file at `path` (if present), then
/// `HKC_`-prefixed env vars (`HKC_SETTINGS__TIMEOUT=10`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HKC_").split("__"));

    let config: Config = figment.extract()?;
    debug!(path = %path.display(), entries = config.entries.len(), "config loaded");
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// A secret an entry needs besides its panel id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretField {
    PanelPassword,
    UserCode,
}

impl SecretField {
    pub const ALL: [Self; 2] = [Self::PanelPassword, Self::UserCode];

    /// Key in the entry's `data`.
    pub fn data_key(self) -> &'static str {
        match self {
            Self::PanelPassword => "panel_password",
            Self::UserCode => "user_code",
        }
    }

    pub fn env_var(self) -> &'static str {
        match self {
            Self::PanelPassword => "HKC_PANEL_PASSWORD",
            Self::UserCode => "HKC_USER_CODE",
        }
    }

    fn keyring_user(self, entry_id: &str) -> String {
        match self {
            Self::PanelPassword => format!("{entry_id}/panel-password"),
            Self::UserCode => format!("{entry_id}/user-code"),
        }
    }
}

/// Resolve a secret: env var, then system keyring, then plaintext `data`.
pub fn resolve_secret(entry: &ConfigEntry, field: SecretField) -> Result<SecretString, ConfigError> {
    resolve_secret_from(
        entry,
        field,
        std::env::var(field.env_var()).ok(),
        || {
            keyring::Entry::new(KEYRING_SERVICE, &field.keyring_user(&entry.entry_id))
                .and_then(|e| e.get_password())
                .ok()
        },
    )
}

fn resolve_secret_from(
    entry: &ConfigEntry,
    field: SecretField,
    env_value: Option<String>,
    keyring_value: impl FnOnce() -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Env var
    if let Some(val) = env_value {
        return Ok(SecretString::from(val));
    }

    // 2. System keyring
    if let Some(val) = keyring_value() {
        return Ok(SecretString::from(val));
    }

    // 3. Plaintext in config
    if let Some(val) = entry.data.get(field.data_key()).and_then(Value::as_str) {
        return Ok(SecretString::from(val.to_owned()));
    }

    Err(ConfigError::NoCredentials {
        entry: entry.entry_id.clone(),
        field: field.data_key(),
    })
}

/// Move an entry's plaintext secrets into the system keyring.
pub fn store_secrets_in_keyring(entry: &mut ConfigEntry) -> Result<(), ConfigError> {
    for field in SecretField::ALL {
        let Some(secret) = entry.data.get(field.data_key()).and_then(Value::as_str) else {
            continue;
        };
        keyring::Entry::new(KEYRING_SERVICE, &field.keyring_user(&entry.entry_id))?
            .set_password(secret)?;
        entry.data.remove(field.data_key());
        debug!(entry_id = %entry.entry_id, field = field.data_key(), "secret stored in keyring");
    }
    Ok(())
}

/// Forget an entry's keyring secrets. Missing secrets are not an error.
pub fn delete_keyring_secrets(entry: &ConfigEntry) {
    for field in SecretField::ALL {
        if let Ok(k) = keyring::Entry::new(KEYRING_SERVICE, &field.keyring_user(&entry.entry_id)) {
            if let Err(e) = k.delete_credential() {
                debug!(field = field.data_key(), error = %e, "no keyring secret removed");
            }
        }
    }
}

// ── Translation to runtime config ───────────────────────────────────

/// Build the connection settings shared by every entry.
pub fn settings_to_panel_settings(settings: &Settings) -> Result<PanelSettings, ConfigError> {
    let base_url: url::Url = settings
        .base_url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("invalid URL: {}", settings.base_url),
        })?;

    let tls = if settings.insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = settings.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(PanelSettings {
        base_url,
        tls,
        timeout: Duration::from_secs(settings.timeout),
        min_refresh_interval: Duration::from_secs(settings.min_refresh_interval),
    })
}

/// Build a `PanelConfig` from a (migrated) entry and the global settings.
pub fn entry_to_panel_config(
    entry: &ConfigEntry,
    settings: &Settings,
) -> Result<PanelConfig, ConfigError> {
    if entry.version != CURRENT_VERSION {
        return Err(ConfigError::Validation {
            field: "version".into(),
            reason: format!(
                "entry '{}' is at schema version {}; run `hkc config migrate`",
                entry.entry_id, entry.version
            ),
        });
    }

    let panel_id = entry.panel_id().ok_or_else(|| ConfigError::NoCredentials {
        entry: entry.entry_id.clone(),
        field: "panel_id",
    })?;

    let update_interval = entry.update_interval();
    if update_interval == 0 {
        return Err(ConfigError::Validation {
            field: CONF_UPDATE_INTERVAL.into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let panel_password = resolve_secret(entry, SecretField::PanelPassword)?;
    let user_code = resolve_secret(entry, SecretField::UserCode)?;
    if user_code.expose_secret().is_empty() {
        return Err(ConfigError::NoCredentials {
            entry: entry.entry_id.clone(),
            field: SecretField::UserCode.data_key(),
        });
    }

    Ok(PanelConfig {
        panel_id,
        panel_password,
        user_code,
        update_interval: Duration::from_secs(update_interval),
        settings: settings_to_panel_settings(settings)?,
    })
}
