// ── Config flow ──
//
// The user step that turns typed-in credentials into a config entry, and
// the options step that changes the poll interval afterwards. Nothing here
// touches disk; hkc-config persists what these functions produce.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{
    CONF_UPDATE_INTERVAL, CONFIG_ENTRY_VERSION, DEFAULT_UPDATE_INTERVAL, PanelSettings,
};
use crate::panel::PanelApi;
use hkc_api::PanelCredentials;

pub const ENTRY_TITLE: &str = "HKC Alarm";

/// Form errors. `error_key()` is what the form shows.
#[derive(Debug, Error)]
pub enum ConfigFlowError {
    #[error("The panel rejected the panel id, password or user code")]
    InvalidAuth,

    #[error("Cannot reach the HKC cloud: {reason}")]
    CannotConnect { reason: String },

    #[error("Update interval must be at least 1 second (got {value})")]
    InvalidInterval { value: u64 },

    #[error("Panel {panel_id} is already configured")]
    AlreadyConfigured { panel_id: String },

    #[error("{field} is required")]
    MissingField { field: &'static str },
}

impl ConfigFlowError {
    pub fn error_key(&self) -> &'static str {
        match self {
            Self::InvalidAuth => "invalid_auth",
            Self::CannotConnect { .. } => "cannot_connect",
            Self::InvalidInterval { .. } => "invalid_interval",
            Self::AlreadyConfigured { .. } => "already_configured",
            Self::MissingField { .. } => "missing_field",
        }
    }
}

/// What the user step asks for.
#[derive(Debug, Clone)]
pub struct UserInput {
    pub panel_id: String,
    pub panel_password: SecretString,
    pub user_code: SecretString,
    pub update_interval: Option<u64>,
}

impl UserInput {
    pub fn credentials(&self) -> PanelCredentials {
        PanelCredentials::new(
            self.panel_id.trim(),
            self.panel_password.clone(),
            self.user_code.clone(),
        )
    }

    fn check_fields(&self) -> Result<(), ConfigFlowError> {
        if self.panel_id.trim().is_empty() {
            return Err(ConfigFlowError::MissingField { field: "panel_id" });
        }
        if self.panel_password.expose_secret().is_empty() {
            return Err(ConfigFlowError::MissingField {
                field: "panel_password",
            });
        }
        if self.user_code.expose_secret().is_empty() {
            return Err(ConfigFlowError::MissingField { field: "user_code" });
        }
        if let Some(value) = self.update_interval {
            check_interval(value)?;
        }
        Ok(())
    }
}

/// A config entry ready to be stored, in the newest schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigEntryDraft {
    pub title: String,
    pub version: u32,
    pub unique_id: String,
    pub data: Map<String, Value>,
    pub options: Map<String, Value>,
}

/// What the options step asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionsInput {
    pub update_interval: u64,
}

impl OptionsInput {
    pub fn validate(self) -> Result<Map<String, Value>, ConfigFlowError> {
        check_interval(self.update_interval)?;
        let mut options = Map::new();
        options.insert(CONF_UPDATE_INTERVAL.into(), json!(self.update_interval));
        Ok(options)
    }
}

fn check_interval(value: u64) -> Result<(), ConfigFlowError> {
    if value == 0 {
        return Err(ConfigFlowError::InvalidInterval { value });
    }
    Ok(())
}

/// Refuse a panel that already has an entry.
pub fn ensure_unique<'a>(
    panel_id: &str,
    configured: impl IntoIterator<Item = &'a str>,
) -> Result<(), ConfigFlowError> {
    let panel_id = panel_id.trim();
    if configured.into_iter().any(|id| id == panel_id) {
        return Err(ConfigFlowError::AlreadyConfigured {
            panel_id: panel_id.to_owned(),
        });
    }
    Ok(())
}

/// Check the credentials against the HKC cloud and build the entry.
pub async fn validate_user_input(
    input: &UserInput,
    settings: &PanelSettings,
) -> Result<ConfigEntryDraft, ConfigFlowError> {
    let client = settings
        .client(input.credentials())
        .map_err(|e| ConfigFlowError::CannotConnect {
            reason: e.to_string(),
        })?;
    validate_with(input, &client).await
}

/// Same as [`validate_user_input`] against an existing client.
pub async fn validate_with<C: PanelApi>(
    input: &UserInput,
    client: &C,
) -> Result<ConfigEntryDraft, ConfigFlowError> {
    input.check_fields()?;
    let panel_id = input.panel_id.trim();

    debug!(panel_id, "validating panel credentials");
    match client.check_login().await {
        Ok(true) => {}
        Ok(false) => {
            warn!(panel_id, "panel login rejected");
            return Err(ConfigFlowError::InvalidAuth);
        }
        Err(e) => {
            warn!(panel_id, error = %e, "panel login check failed");
            return Err(ConfigFlowError::CannotConnect {
                reason: e.to_string(),
            });
        }
    }

    let mut data = Map::new();
    data.insert("panel_id".into(), json!(panel_id));
    data.insert(
        "panel_password".into(),
        json!(input.panel_password.expose_secret()),
    );
    data.insert("user_code".into(), json!(input.user_code.expose_secret()));

    let mut options = Map::new();
    options.insert(
        CONF_UPDATE_INTERVAL.into(),
        json!(input.update_interval.unwrap_or(DEFAULT_UPDATE_INTERVAL)),
    );

    info!(panel_id, "panel credentials accepted");
    Ok(ConfigEntryDraft {
        title: ENTRY_TITLE.into(),
        version: CONFIG_ENTRY_VERSION,
        unique_id: panel_id.to_owned(),
        data,
        options,
    })
}
