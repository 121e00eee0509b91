// ── Runtime panel configuration ──
//
// These types describe *how* to reach one panel and how often to poll it.
// They carry credential data and tuning, but never touch disk.
// hkc-config (or a test) constructs a `PanelConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

pub use hkc_api::DEFAULT_BASE_URL;
use hkc_api::{HkcClient, PanelCredentials, TlsMode, TransportConfig};

use crate::error::CoreError;

/// Integration domain identifier.
pub const DOMAIN: &str = "hkc_alarm";

/// Default poll interval in seconds.
pub const DEFAULT_UPDATE_INTERVAL: u64 = 60;

/// Default minimum spacing between outbound fetches, in seconds.
pub const DEFAULT_MIN_REFRESH_INTERVAL: u64 = 30;

/// Schema version written by the config flow.
pub const CONFIG_ENTRY_VERSION: u32 = 3;

/// Option key for the poll interval.
pub const CONF_UPDATE_INTERVAL: &str = "update_interval";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification.
    DangerAcceptInvalid,
}

/// Connection settings shared by every panel: where the API lives and
/// how to talk to it.
#[derive(Debug, Clone)]
pub struct PanelSettings {
    pub base_url: Url,
    pub tls: TlsVerification,
    pub timeout: Duration,
    /// Floor between two outbound fetches of the same coordinator.
    pub min_refresh_interval: Duration,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            min_refresh_interval: Duration::from_secs(DEFAULT_MIN_REFRESH_INTERVAL),
        }
    }
}

impl PanelSettings {
    pub fn client(&self, credentials: PanelCredentials) -> Result<HkcClient, CoreError> {
        Ok(HkcClient::new(
            self.base_url.clone(),
            credentials,
            &self.transport(),
        )?)
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }
}

/// Everything needed to run one configured panel.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    pub panel_id: String,
    pub panel_password: SecretString,
    pub user_code: SecretString,
    /// How often the poll tasks ask the coordinators to refresh.
    pub update_interval: Duration,
    pub settings: PanelSettings,
}

impl PanelConfig {
    pub fn credentials(&self) -> PanelCredentials {
        PanelCredentials::new(
            self.panel_id.clone(),
            self.panel_password.clone(),
            self.user_code.clone(),
        )
    }

    /// Build an HTTP client for this panel.
    pub fn client(&self) -> Result<HkcClient, CoreError> {
        self.settings.client(self.credentials())
    }
}
