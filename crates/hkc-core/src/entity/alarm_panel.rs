use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{DEVICE_NAME, DeviceInfo, EntityState};
use crate::command::{AlarmCommand, interpret_response};
use crate::coordinator::{AlarmCoordinator, AlarmSnapshot};
use crate::error::CoreError;
use crate::model::{AlarmState, PanelDisplay};
use crate::panel::PanelApi;

/// Arming modes the entity offers. Disarm is always available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct SupportedFeatures {
    pub arm_home: bool,
    pub arm_away: bool,
    pub arm_night: bool,
    pub arm_vacation: bool,
    pub trigger: bool,
}

/// The alarm control panel entity.
pub struct AlarmPanelEntity<C> {
    panel_id: String,
    coordinator: AlarmCoordinator<C>,
    alarm_state: Option<AlarmState>,
    display: Option<PanelDisplay>,
}

impl<C: PanelApi> AlarmPanelEntity<C> {
    pub fn new(panel_id: impl Into<String>, coordinator: AlarmCoordinator<C>) -> Self {
        Self {
            panel_id: panel_id.into(),
            coordinator,
            alarm_state: None,
            display: None,
        }
    }

    pub fn unique_id(&self) -> String {
        format!("{}panel", self.panel_id)
    }

    #[allow(clippy::unused_self)]
    pub fn name(&self) -> &'static str {
        DEVICE_NAME
    }

    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo::for_panel(&self.panel_id)
    }

    #[allow(clippy::unused_self)]
    pub fn supported_features(&self) -> SupportedFeatures {
        SupportedFeatures {
            arm_home: true,
            arm_away: true,
            arm_night: true,
            arm_vacation: false,
            trigger: false,
        }
    }

    #[allow(clippy::unused_self)]
    pub fn code_arm_required(&self) -> bool {
        false
    }

    #[allow(clippy::unused_self)]
    pub fn should_poll(&self) -> bool {
        false
    }

    pub fn alarm_state(&self) -> Option<AlarmState> {
        self.alarm_state
    }

    /// Available once a display payload has been received.
    pub fn available(&self) -> bool {
        self.display.is_some()
    }

    pub fn extra_state_attributes(&self) -> Option<BTreeMap<String, Value>> {
        self.display.as_ref().map(PanelDisplay::attributes)
    }

    /// Re-derive state from a fresh coordinator snapshot.
    pub fn handle_coordinator_update(&mut self, snapshot: &AlarmSnapshot) {
        let state = snapshot.status.alarm_state();
        if self.alarm_state != Some(state) {
            debug!(from = ?self.alarm_state, to = %state, "alarm state changed");
        }
        self.alarm_state = Some(state);
        self.display = Some(snapshot.display.clone());
    }

    pub fn state(&self) -> EntityState {
        EntityState {
            unique_id: self.unique_id(),
            name: self.name().to_owned(),
            state: self.alarm_state.map(|s| s.to_string()),
            available: self.available(),
            attributes: self.extra_state_attributes().unwrap_or_default(),
        }
    }

    pub async fn execute(&self, command: AlarmCommand) -> Result<JoinHandle<()>, CoreError> {
        execute(&self.coordinator, command).await
    }

    // The panel needs no code; an entered code is ignored.

    pub async fn alarm_disarm(&self, _code: Option<&str>) -> Result<JoinHandle<()>, CoreError> {
        self.execute(AlarmCommand::Disarm).await
    }

    pub async fn alarm_arm_home(&self, _code: Option<&str>) -> Result<JoinHandle<()>, CoreError> {
        self.execute(AlarmCommand::ArmHome).await
    }

    pub async fn alarm_arm_night(&self, _code: Option<&str>) -> Result<JoinHandle<()>, CoreError> {
        self.execute(AlarmCommand::ArmNight).await
    }

    pub async fn alarm_arm_away(&self, _code: Option<&str>) -> Result<JoinHandle<()>, CoreError> {
        self.execute(AlarmCommand::ArmAway).await
    }
}

/// Send `command`, judge the reply and, on success only, schedule a forced
/// alarm refresh once the panel has had time to settle.
///
/// The refresh is not cancellable. The returned handle may be awaited by
/// callers that would otherwise exit before it runs.
pub async fn execute<C: PanelApi>(
    coordinator: &AlarmCoordinator<C>,
    command: AlarmCommand,
) -> Result<JoinHandle<()>, CoreError> {
    let response = command.send(coordinator.client().as_ref()).await?;
    interpret_response(command, &response)?;

    let delay = command.settle_delay();
    info!(
        command = command.name(),
        settle_secs = delay.as_secs(),
        "command accepted, refreshing after settle delay"
    );

    let coordinator = coordinator.clone();
    Ok(tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if let Err(e) = coordinator.force_refresh().await {
            warn!(error = %e, "refresh after command failed");
        }
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;
    use tokio::time::Instant;

    use super::*;
    use crate::test_support::FakePanel;

    const MIN: Duration = Duration::from_secs(30);

    fn entity(panel: &Arc<FakePanel>) -> AlarmPanelEntity<FakePanel> {
        AlarmPanelEntity::new("12345", AlarmCoordinator::new(Arc::clone(panel), MIN))
    }

    #[tokio::test(start_paused = true)]
    async fn state_follows_coordinator_updates() {
        let panel = Arc::new(FakePanel::armed(2));
        let mut entity = entity(&panel);
        assert!(!entity.available());
        assert_eq!(entity.extra_state_attributes(), None);

        let snapshot = entity.coordinator.refresh().await.unwrap();
        entity.handle_coordinator_update(&snapshot);
        assert_eq!(entity.alarm_state(), Some(AlarmState::ArmedNight));
        assert!(entity.available());

        panel.set_in_alarm(true);
        let snapshot = entity.coordinator.force_refresh().await.unwrap();
        entity.handle_coordinator_update(&snapshot);

        let state = entity.state();
        assert_eq!(state.unique_id, "12345panel");
        assert_eq!(state.state.as_deref(), Some("triggered"));
        assert_eq!(state.attributes["Green LED"], json!(1));
        assert_eq!(state.attributes["Display"], json!("Mon 12 May 20:55"));
    }

    #[test]
    fn device_and_features() {
        let panel = Arc::new(FakePanel::armed(0));
        let entity = entity(&panel);
        let device = entity.device_info();
        assert_eq!(device.identifiers, ("hkc_alarm".to_owned(), "12345".to_owned()));
        assert_eq!(device.model, "HKC Alarm");
        assert!(!entity.code_arm_required());
        let features = entity.supported_features();
        assert!(features.arm_home && features.arm_away && features.arm_night);
        assert!(!features.arm_vacation);
    }

    #[tokio::test(start_paused = true)]
    async fn each_command_hits_its_endpoint() {
        let panel = Arc::new(FakePanel::armed(0));
        let entity = entity(&panel);

        entity.alarm_arm_home(None).await.unwrap();
        entity.alarm_arm_night(None).await.unwrap();
        entity.alarm_arm_away(Some("1234")).await.unwrap();
        entity.alarm_disarm(None).await.unwrap();

        assert_eq!(
            panel.commands(),
            vec!["arm_partset_a", "arm_partset_b", "arm_fullset", "disarm"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn success_refreshes_after_settle_delay() {
        let panel = Arc::new(FakePanel::armed(0));
        let entity = entity(&panel);
        entity.coordinator.refresh().await.unwrap();

        let start = Instant::now();
        let handle = entity.execute(AlarmCommand::ArmAway).await.unwrap();
        // Let the spawned task register its timer.
        tokio::task::yield_now().await;

        tokio::time::advance(Duration::from_secs(9)).await;
        assert_eq!(panel.status_calls(), 1);

        handle.await.unwrap();
        assert_eq!(panel.status_calls(), 2);
        assert!(start.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn disarm_settles_faster() {
        let panel = Arc::new(FakePanel::armed(3));
        let entity = entity(&panel);

        let start = Instant::now();
        entity.execute(AlarmCommand::Disarm).await.unwrap().await.unwrap();

        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(3));
        assert!(waited < Duration::from_secs(10));
        assert_eq!(panel.status_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_command_schedules_nothing() {
        let panel = Arc::new(FakePanel::armed(3));
        panel.set_command_response(json!({ "code": 4 }));
        let entity = entity(&panel);

        let err = entity.execute(AlarmCommand::ArmAway).await.unwrap_err();
        assert_eq!(err.translation_key(), Some("already_armed"));

        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(panel.status_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn unsent_command_is_not_an_update_failure() {
        let panel = Arc::new(FakePanel::armed(0));
        panel.fail_commands(true);
        let entity = entity(&panel);

        let err = entity.execute(AlarmCommand::ArmAway).await.unwrap_err();
        match err {
            CoreError::CommandFailed { command, reason } => {
                assert_eq!(command, "arm_away");
                assert!(reason.contains("503"), "reason: {reason}");
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
        assert_eq!(panel.commands(), vec!["arm_fullset"]);

        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(panel.status_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn unexpected_reply_schedules_nothing() {
        let panel = Arc::new(FakePanel::armed(0));
        panel.set_command_response(json!({ "status": "weird" }));
        let entity = entity(&panel);

        let err = entity.execute(AlarmCommand::Disarm).await.unwrap_err();
        assert!(matches!(err, CoreError::UnexpectedResponse { .. }));

        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(panel.status_calls(), 0);
    }
}
