// ── Integration runtime ──
//
// Lifecycle of one configured panel: first refresh, entity creation,
// background polling, live option changes and teardown. Entity states are
// pushed to subscribers over a broadcast channel whenever a coordinator
// delivers fresh data.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock, broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use hkc_api::HkcClient;

use crate::command::AlarmCommand;
use crate::config::PanelConfig;
use crate::config_flow::{ConfigFlowError, OptionsInput};
use crate::coordinator::{AlarmCoordinator, SensorCoordinator};
use crate::entity::{self, AlarmPanelEntity, EntityState, ZoneSensorEntity, zone_entities};
use crate::error::CoreError;
use crate::panel::PanelApi;

const STATE_CHANNEL_SIZE: usize = 256;

/// One running panel.
pub struct Integration<C> {
    config: PanelConfig,
    alarm: AlarmCoordinator<C>,
    sensors: SensorCoordinator<C>,
    alarm_entity: Arc<RwLock<AlarmPanelEntity<C>>>,
    zones: Arc<RwLock<Vec<ZoneSensorEntity>>>,
    update_interval: watch::Sender<Duration>,
    states: broadcast::Sender<EntityState>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Integration<HkcClient> {
    /// Build the HTTP client from `config` and set up.
    pub async fn connect(config: PanelConfig) -> Result<Self, CoreError> {
        let client = config.client()?;
        Self::setup(config, Arc::new(client)).await
    }
}

impl<C: PanelApi> Integration<C> {
    /// Create the coordinators, run the first refresh and build entities.
    ///
    /// A failed first refresh fails setup; nothing is left running.
    pub async fn setup(config: PanelConfig, client: Arc<C>) -> Result<Self, CoreError> {
        info!(panel_id = %config.panel_id, "setting up panel");

        let min_interval = config.settings.min_refresh_interval;
        let alarm = AlarmCoordinator::new(client, min_interval);
        let sensors = SensorCoordinator::new(alarm.clone(), min_interval);

        let alarm_snapshot = alarm.refresh().await?;
        let sensor_snapshot = sensors.refresh().await?;

        let mut alarm_entity = AlarmPanelEntity::new(config.panel_id.clone(), alarm.clone());
        alarm_entity.handle_coordinator_update(&alarm_snapshot);

        let panel_time = alarm.panel_time();
        let mut zones = zone_entities(&config.panel_id, &sensor_snapshot.inputs);
        for zone in &mut zones {
            zone.handle_coordinator_update(&sensor_snapshot.inputs, panel_time);
        }
        info!(
            panel_id = %config.panel_id,
            zones = zones.len(),
            skipped = sensor_snapshot.inputs.len() - zones.len(),
            "panel entities created"
        );

        let (update_interval, _) = watch::channel(config.update_interval);
        let (states, _) = broadcast::channel(STATE_CHANNEL_SIZE);

        Ok(Self {
            config,
            alarm,
            sensors,
            alarm_entity: Arc::new(RwLock::new(alarm_entity)),
            zones: Arc::new(RwLock::new(zones)),
            update_interval,
            states,
            cancel: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
        })
    }

    pub fn panel_id(&self) -> &str {
        &self.config.panel_id
    }

    pub fn alarm(&self) -> &AlarmCoordinator<C> {
        &self.alarm
    }

    pub fn sensors(&self) -> &SensorCoordinator<C> {
        &self.sensors
    }

    /// Current poll interval.
    pub fn update_interval(&self) -> Duration {
        *self.update_interval.borrow()
    }

    /// Spawn the poll and listener tasks.
    pub async fn start(&self) {
        let mut tasks = self.tasks.lock().await;
        if !tasks.is_empty() {
            debug!("background tasks already running");
            return;
        }

        let alarm = self.alarm.clone();
        tasks.push(tokio::spawn(poll_task(
            "alarm",
            self.update_interval.subscribe(),
            self.cancel.clone(),
            move || {
                let alarm = alarm.clone();
                async move { alarm.refresh().await.map(drop) }
            },
        )));

        let sensors = self.sensors.clone();
        tasks.push(tokio::spawn(poll_task(
            "sensor",
            self.update_interval.subscribe(),
            self.cancel.clone(),
            move || {
                let sensors = sensors.clone();
                async move { sensors.refresh().await.map(drop) }
            },
        )));

        tasks.push(tokio::spawn(alarm_listener(
            self.alarm.subscribe(),
            Arc::clone(&self.alarm_entity),
            self.states.clone(),
            self.cancel.clone(),
        )));

        tasks.push(tokio::spawn(zone_listener(
            self.sensors.clone(),
            Arc::clone(&self.zones),
            self.states.clone(),
            self.cancel.clone(),
        )));

        debug!(
            interval_secs = self.update_interval().as_secs(),
            "background tasks started"
        );
    }

    /// Apply new options; poll tasks pick the interval up immediately.
    pub fn update_options(&self, options: OptionsInput) -> Result<(), ConfigFlowError> {
        options.validate()?;
        let interval = Duration::from_secs(options.update_interval);
        self.update_interval.send_replace(interval);
        info!(
            panel_id = %self.config.panel_id,
            interval_secs = options.update_interval,
            "update interval changed"
        );
        Ok(())
    }

    /// Stop every background task and wait for it to finish.
    pub async fn unload(&self) {
        self.cancel.cancel();
        let mut tasks = self.tasks.lock().await;
        for handle in tasks.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "background task ended abnormally");
            }
        }
        info!(panel_id = %self.config.panel_id, "panel unloaded");
    }

    /// Alarm entity first, then zones in panel order.
    pub async fn entity_states(&self) -> Vec<EntityState> {
        let mut states = vec![self.alarm_entity.read().await.state()];
        states.extend(self.zones.read().await.iter().map(ZoneSensorEntity::state));
        states
    }

    /// Zone sensor entities in panel order.
    pub async fn zones(&self) -> Vec<ZoneSensorEntity> {
        self.zones.read().await.clone()
    }

    /// Entity states as they change.
    pub fn subscribe(&self) -> broadcast::Receiver<EntityState> {
        self.states.subscribe()
    }

    /// Send an arming command, see [`entity::execute`].
    pub async fn execute(&self, command: AlarmCommand) -> Result<JoinHandle<()>, CoreError> {
        entity::execute(&self.alarm, command).await
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Refresh every `interval`, restarting the wait when the interval changes.
async fn poll_task<F, Fut>(
    name: &'static str,
    mut interval: watch::Receiver<Duration>,
    cancel: CancellationToken,
    refresh: F,
) where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<(), CoreError>>,
{
    loop {
        let period = *interval.borrow_and_update();
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = interval.changed() => {
                if changed.is_err() {
                    break;
                }
                debug!(coordinator = name, "poll interval changed");
            }
            () = tokio::time::sleep(period) => {
                if let Err(e) = refresh().await {
                    warn!(coordinator = name, error = %e, "periodic refresh failed");
                }
            }
        }
    }
}

async fn alarm_listener<C: PanelApi>(
    mut rx: watch::Receiver<Option<Arc<crate::coordinator::AlarmSnapshot>>>,
    entity: Arc<RwLock<AlarmPanelEntity<C>>>,
    states: broadcast::Sender<EntityState>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let Some(snapshot) = rx.borrow_and_update().clone() else { continue };
                let mut entity = entity.write().await;
                entity.handle_coordinator_update(&snapshot);
                let _ = states.send(entity.state());
            }
        }
    }
}

async fn zone_listener<C: PanelApi>(
    sensors: SensorCoordinator<C>,
    zones: Arc<RwLock<Vec<ZoneSensorEntity>>>,
    states: broadcast::Sender<EntityState>,
    cancel: CancellationToken,
) {
    let mut rx = sensors.subscribe();
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let Some(snapshot) = rx.borrow_and_update().clone() else { continue };
                let panel_time = sensors.alarm().panel_time();
                let mut zones = zones.write().await;
                for zone in zones.iter_mut() {
                    zone.handle_coordinator_update(&snapshot.inputs, panel_time);
                    let _ = states.send(zone.state());
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::PanelSettings;
    use crate::test_support::{FakePanel, input};

    fn config() -> PanelConfig {
        PanelConfig {
            panel_id: "12345".into(),
            panel_password: SecretString::from("pw"),
            user_code: SecretString::from("1234"),
            update_interval: Duration::from_secs(60),
            settings: PanelSettings::default(),
        }
    }

    fn panel() -> Arc<FakePanel> {
        Arc::new(FakePanel::armed(0).with_inputs(vec![
            input("1", "Front Door", "0001-01-01T00:00:00", 0),
            input("2", "", "0001-01-01T00:00:00", 0),
            input("3", "Garage", "2020-01-01T00:00:00Z", 2),
        ]))
    }

    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn setup_creates_described_entities() {
        let panel = panel();
        let integration = Integration::setup(config(), Arc::clone(&panel))
            .await
            .unwrap();

        let states = integration.entity_states().await;
        let ids: Vec<&str> = states.iter().map(|s| s.unique_id.as_str()).collect();
        assert_eq!(ids, vec!["12345panel", "123451", "123453"]);
        assert_eq!(states[0].state.as_deref(), Some("disarmed"));
        assert_eq!(states[1].state.as_deref(), Some("Unused"));
        assert_eq!(states[2].state.as_deref(), Some("Closed"));
        let zones = integration.zones().await;
        assert_eq!(zones[1].input_id(), "3");
        assert_eq!(panel.status_calls(), 1);
        assert_eq!(panel.inputs_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn setup_fails_when_first_refresh_fails() {
        let panel = panel();
        panel.fail_status(true);
        let result = Integration::setup(config(), panel).await;
        assert!(matches!(result, Err(CoreError::UpdateFailed { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn poll_pushes_state_changes() {
        let panel = panel();
        let integration = Integration::setup(config(), Arc::clone(&panel))
            .await
            .unwrap();
        let mut states = integration.subscribe();
        integration.start().await;
        settle().await;

        panel.set_arm_state(3);
        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;

        let alarm = loop {
            let state = states.recv().await.unwrap();
            if state.unique_id == "12345panel" {
                break state;
            }
        };
        assert_eq!(alarm.state.as_deref(), Some("armed_away"));
        assert_eq!(panel.status_calls(), 2);
        assert_eq!(panel.inputs_calls(), 2);

        integration.unload().await;
    }

    #[tokio::test(start_paused = true)]
    async fn new_interval_applies_without_restart() {
        let panel = panel();
        let integration = Integration::setup(config(), Arc::clone(&panel))
            .await
            .unwrap();
        integration.start().await;
        settle().await;

        integration
            .update_options(OptionsInput { update_interval: 300 })
            .unwrap();
        settle().await;
        assert_eq!(integration.update_interval(), Duration::from_secs(300));

        tokio::time::advance(Duration::from_secs(200)).await;
        settle().await;
        assert_eq!(panel.status_calls(), 1);

        tokio::time::advance(Duration::from_secs(100)).await;
        settle().await;
        assert_eq!(panel.status_calls(), 2);

        integration.unload().await;
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_is_refused() {
        let integration = Integration::setup(config(), panel()).await.unwrap();
        let err = integration
            .update_options(OptionsInput { update_interval: 0 })
            .unwrap_err();
        assert_eq!(err.error_key(), "invalid_interval");
        assert_eq!(integration.update_interval(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn unload_stops_polling() {
        let panel = panel();
        let integration = Integration::setup(config(), Arc::clone(&panel))
            .await
            .unwrap();
        integration.start().await;
        settle().await;
        integration.unload().await;

        tokio::time::advance(Duration::from_secs(600)).await;
        settle().await;
        assert_eq!(panel.status_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unload_survives_panicked_task() {
        let panel = panel();
        let integration = Integration::setup(config(), Arc::clone(&panel))
            .await
            .unwrap();
        integration.start().await;
        integration
            .tasks
            .lock()
            .await
            .push(tokio::spawn(async { panic!("listener blew up") }));
        settle().await;

        integration.unload().await;
        assert!(integration.tasks.lock().await.is_empty());

        tokio::time::advance(Duration::from_secs(600)).await;
        settle().await;
        assert_eq!(panel.status_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn command_refresh_reaches_entity() {
        let panel = panel();
        let integration = Integration::setup(config(), Arc::clone(&panel))
            .await
            .unwrap();
        integration.start().await;
        settle().await;

        panel.set_arm_state(1);
        integration
            .execute(AlarmCommand::ArmHome)
            .await
            .unwrap()
            .await
            .unwrap();
        settle().await;

        let states = integration.entity_states().await;
        assert_eq!(states[0].state.as_deref(), Some("armed_home"));
        assert_eq!(panel.commands(), vec!["arm_partset_a"]);

        integration.unload().await;
    }
}
