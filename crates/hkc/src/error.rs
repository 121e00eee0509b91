//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError`, `ConfigError` and `ConfigFlowError` into user-facing
//! errors with actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use hkc_config::ConfigError;
use hkc_core::{ConfigFlowError, CoreError};

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the HKC cloud")]
    #[diagnostic(
        code(hkc::connection_failed),
        help(
            "Check your network connection and the base_url setting.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Panel update failed: {message}")]
    #[diagnostic(
        code(hkc::update_failed),
        help("The HKC cloud may be throttling requests. Try again in a minute.")
    )]
    UpdateFailed { message: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed")]
    #[diagnostic(
        code(hkc::auth_failed),
        help(
            "Verify the panel id, panel password and user code.\n\
             Re-run: hkc setup"
        )
    )]
    AuthFailed,

    #[error("No {field} configured for entry '{entry}'")]
    #[diagnostic(
        code(hkc::no_credentials),
        help("Set HKC_PANEL_PASSWORD / HKC_USER_CODE, or re-run: hkc setup")
    )]
    NoCredentials { entry: String, field: String },

    // ── Panel ────────────────────────────────────────────────────────

    #[error("Could not send {command} to the panel")]
    #[diagnostic(
        code(hkc::command_failed),
        help(
            "The command was not delivered; the alarm state is unchanged.\n\
             Reason: {reason}"
        )
    )]
    CommandFailed { command: String, reason: String },

    #[error("{message}")]
    #[diagnostic(
        code(hkc::panel_rejected),
        help("The panel refused the command ({translation_key}). Run: hkc status")
    )]
    PanelRejected {
        translation_key: String,
        message: String,
    },

    #[error("Unexpected response from panel: {response}")]
    #[diagnostic(code(hkc::unexpected_response))]
    UnexpectedResponse { response: String },

    // ── Entries ──────────────────────────────────────────────────────

    #[error("No config entry matches '{selector}'")]
    #[diagnostic(
        code(hkc::not_found),
        help("Run: hkc config show to list configured entries")
    )]
    NotFound { selector: String },

    #[error("Panel {panel_id} is already configured")]
    #[diagnostic(
        code(hkc::already_configured),
        help("Remove it first with: hkc config remove --entry {panel_id}")
    )]
    AlreadyConfigured { panel_id: String },

    #[error("Entry '{entry_id}' has unsupported schema version {version}")]
    #[diagnostic(
        code(hkc::unsupported_version),
        help("Remove the entry and run: hkc setup")
    )]
    UnsupportedVersion { entry_id: String, version: u32 },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(hkc::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("No panel configured")]
    #[diagnostic(
        code(hkc::no_config),
        help(
            "Add one with: hkc setup\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("{message}")]
    #[diagnostic(code(hkc::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(hkc::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::CommandFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::NoConfig { .. } => exit_code::NOT_FOUND,
            Self::PanelRejected { .. } | Self::AlreadyConfigured { .. } => exit_code::CONFLICT,
            Self::Validation { .. }
            | Self::UnsupportedVersion { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { reason } => Self::ConnectionFailed { reason },
            CoreError::AuthenticationFailed { message: _ } => Self::AuthFailed,
            CoreError::UpdateFailed { message } => Self::UpdateFailed { message },
            CoreError::CommandFailed { command, reason } => {
                Self::CommandFailed { command, reason }
            }
            CoreError::Validation {
                translation_key,
                message,
            } => Self::PanelRejected {
                translation_key,
                message,
            },
            CoreError::UnexpectedResponse { response } => Self::UnexpectedResponse {
                response: response.to_string(),
            },
            CoreError::Config { message } | CoreError::Internal(message) => {
                Self::Config { message }
            }
        }
    }
}

impl From<ConfigFlowError> for CliError {
    fn from(err: ConfigFlowError) -> Self {
        match err {
            ConfigFlowError::InvalidAuth => Self::AuthFailed,
            ConfigFlowError::CannotConnect { reason } => Self::ConnectionFailed { reason },
            ConfigFlowError::AlreadyConfigured { panel_id } => {
                Self::AlreadyConfigured { panel_id }
            }
            e @ (ConfigFlowError::InvalidInterval { .. } | ConfigFlowError::MissingField { .. }) => {
                Self::Validation {
                    field: e.error_key().into(),
                    reason: e.to_string(),
                }
            }
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials { entry, field } => Self::NoCredentials {
                entry,
                field: field.into(),
            },
            ConfigError::NotFound { selector } => Self::NotFound { selector },
            ConfigError::UnsupportedVersion { entry_id, version } => {
                Self::UnsupportedVersion { entry_id, version }
            }
            ConfigError::Flow(e) => e.into(),
            ConfigError::Io(e) => Self::Io(e),
            e @ (ConfigError::Keyring(_)
            | ConfigError::Serialization(_)
            | ConfigError::Figment(_)) => Self::Config {
                message: e.to_string(),
            },
        }
    }
}
