// ── Panel API seam ──
//
// Coordinators and entities are generic over this trait so they can be
// driven by the real HTTP client or by an in-memory panel in tests.

use std::future::Future;

use serde_json::Value;

use hkc_api::{HkcClient, Input, PanelData, SystemStatus};

/// The vendor calls the integration makes against one panel.
pub trait PanelApi: Send + Sync + 'static {
    fn check_login(&self) -> impl Future<Output = Result<bool, hkc_api::Error>> + Send;

    fn get_system_status(&self)
    -> impl Future<Output = Result<SystemStatus, hkc_api::Error>> + Send;

    fn get_panel(&self) -> impl Future<Output = Result<PanelData, hkc_api::Error>> + Send;

    fn get_all_inputs(&self) -> impl Future<Output = Result<Vec<Input>, hkc_api::Error>> + Send;

    fn arm_partset_a(&self) -> impl Future<Output = Result<Value, hkc_api::Error>> + Send;

    fn arm_partset_b(&self) -> impl Future<Output = Result<Value, hkc_api::Error>> + Send;

    fn arm_fullset(&self) -> impl Future<Output = Result<Value, hkc_api::Error>> + Send;

    fn disarm(&self) -> impl Future<Output = Result<Value, hkc_api::Error>> + Send;
}

impl PanelApi for HkcClient {
    fn check_login(&self) -> impl Future<Output = Result<bool, hkc_api::Error>> + Send {
        HkcClient::check_login(self)
    }

    fn get_system_status(
        &self,
    ) -> impl Future<Output = Result<SystemStatus, hkc_api::Error>> + Send {
        HkcClient::get_system_status(self)
    }

    fn get_panel(&self) -> impl Future<Output = Result<PanelData, hkc_api::Error>> + Send {
        HkcClient::get_panel(self)
    }

    fn get_all_inputs(&self) -> impl Future<Output = Result<Vec<Input>, hkc_api::Error>> + Send {
        HkcClient::get_all_inputs(self)
    }

    fn arm_partset_a(&self) -> impl Future<Output = Result<Value, hkc_api::Error>> + Send {
        HkcClient::arm_partset_a(self)
    }

    fn arm_partset_b(&self) -> impl Future<Output = Result<Value, hkc_api::Error>> + Send {
        HkcClient::arm_partset_b(self)
    }

    fn arm_fullset(&self) -> impl Future<Output = Result<Value, hkc_api::Error>> + Send {
        HkcClient::arm_fullset(self)
    }

    fn disarm(&self) -> impl Future<Output = Result<Value, hkc_api::Error>> + Send {
        HkcClient::disarm(self)
    }
}
