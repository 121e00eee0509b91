// Arming commands
//
// The panel answers commands with a small JSON object carrying a result
// code and, on rejection, an `errors` list. The shape is not stable across
// firmware, so the raw value is returned and interpreted by `hkc-core`.

use serde_json::Value;
use tracing::debug;

use crate::client::HkcClient;
use crate::error::Error;

impl HkcClient {
    /// Arm part set A (home).
    ///
    /// `POST {base}/arm/partset-a`
    pub async fn arm_partset_a(&self) -> Result<Value, Error> {
        self.command("arm/partset-a").await
    }

    /// Arm part set B (night).
    ///
    /// `POST {base}/arm/partset-b`
    pub async fn arm_partset_b(&self) -> Result<Value, Error> {
        self.command("arm/partset-b").await
    }

    /// Arm every zone (away).
    ///
    /// `POST {base}/arm/fullset`
    pub async fn arm_fullset(&self) -> Result<Value, Error> {
        self.command("arm/fullset").await
    }

    /// Disarm the panel.
    ///
    /// `POST {base}/disarm`
    pub async fn disarm(&self) -> Result<Value, Error> {
        self.command("disarm").await
    }

    async fn command(&self, path: &str) -> Result<Value, Error> {
        debug!(command = path, "sending panel command");
        self.post(path).await
    }
}
