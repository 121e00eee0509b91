// ── Core error types ──
//
// User-facing errors from hkc-core. Consumers never see HTTP status codes
// or JSON parse failures directly: the `From<hkc_api::Error>` impl
// translates transport-layer errors into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to the HKC cloud: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── Polling errors ───────────────────────────────────────────────
    /// A coordinator fetch failed. Cached data is left untouched.
    #[error("Update failed: {message}")]
    UpdateFailed { message: String },

    // ── Command errors ───────────────────────────────────────────────
    /// A command never got a reply from the panel. Nothing is refreshed.
    #[error("Failed to send {command}: {reason}")]
    CommandFailed { command: String, reason: String },

    /// The panel refused a command for a reason the user can act on
    /// (already in the requested state, zone open, ...). Not a fault.
    #[error("{message}")]
    Validation {
        /// Stable key identifying the condition, e.g. `already_armed`.
        translation_key: String,
        message: String,
    },

    /// The panel answered a command with something we do not recognise.
    #[error("Unexpected response from panel: {response}")]
    UnexpectedResponse { response: serde_json::Value },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The translation key of a validation error, if this is one.
    pub fn translation_key(&self) -> Option<&str> {
        match self {
            Self::Validation {
                translation_key, ..
            } => Some(translation_key),
            _ => None,
        }
    }

    pub(crate) fn update_failed(err: impl std::fmt::Display) -> Self {
        Self::UpdateFailed {
            message: err.to_string(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<hkc_api::Error> for CoreError {
    fn from(err: hkc_api::Error) -> Self {
        match err {
            hkc_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            hkc_api::Error::Transport(ref e) => {
                if e.is_timeout() || e.is_connect() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::UpdateFailed {
                        message: e.to_string(),
                    }
                }
            }
            hkc_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            hkc_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                reason: format!("TLS error: {msg}"),
            },
            hkc_api::Error::Api { status, message } => CoreError::UpdateFailed {
                message: format!("HTTP {status}: {message}"),
            },
            hkc_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
