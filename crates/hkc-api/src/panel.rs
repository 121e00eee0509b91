// Panel read endpoints
//
// Login probe, arming status, keypad display mirror and zone inputs.

use tracing::debug;

use crate::client::HkcClient;
use crate::error::Error;
use crate::models::{Input, LoginResponse, PanelData, SystemStatus};

impl HkcClient {
    /// Check whether the panel accepts the configured credentials.
    ///
    /// `POST {base}/login`
    ///
    /// A credential rejection is `Ok(false)`, not an error: the setup flow
    /// turns it into a form error. Transport failures still propagate.
    pub async fn check_login(&self) -> Result<bool, Error> {
        debug!("checking panel login");
        match self.post::<LoginResponse>("login").await {
            Ok(resp) => Ok(resp.authenticated),
            Err(e) if e.is_auth_failure() => {
                debug!(error = %e, "panel login rejected");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Get per-partition arming status.
    ///
    /// `POST {base}/status`
    pub async fn get_system_status(&self) -> Result<SystemStatus, Error> {
        debug!("fetching system status");
        self.post("status").await
    }

    /// Get the keypad display mirror (LEDs, cursor, display text).
    ///
    /// `POST {base}/panel`
    pub async fn get_panel(&self) -> Result<PanelData, Error> {
        debug!("fetching panel display");
        self.post("panel").await
    }

    /// List every zone input the panel knows about, including unused ones.
    ///
    /// `POST {base}/inputs`
    pub async fn get_all_inputs(&self) -> Result<Vec<Input>, Error> {
        debug!("fetching all inputs");
        self.post("inputs").await
    }
}
