use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

/// The credential triple every panel API call carries.
///
/// The panel id identifies the panel on the HKC cloud; the panel password
/// authenticates the app, and the user code is the keypad code used for
/// arming and disarming.
#[derive(Debug, Clone)]
pub struct PanelCredentials {
    pub panel_id: String,
    pub panel_password: SecretString,
    pub user_code: SecretString,
}

impl PanelCredentials {
    pub fn new(
        panel_id: impl Into<String>,
        panel_password: SecretString,
        user_code: SecretString,
    ) -> Self {
        Self {
            panel_id: panel_id.into(),
            panel_password,
            user_code,
        }
    }

    /// Request body fragment sent with every call.
    pub(crate) fn body(&self) -> CredentialBody<'_> {
        CredentialBody {
            panel_id: &self.panel_id,
            panel_password: self.panel_password.expose_secret(),
            user_code: self.user_code.expose_secret(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CredentialBody<'a> {
    panel_id: &'a str,
    panel_password: &'a str,
    user_code: &'a str,
}
