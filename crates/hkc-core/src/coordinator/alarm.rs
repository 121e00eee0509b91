use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::{Throttle, cached_or_throttled, lock};
use crate::clock::PanelClock;
use crate::error::CoreError;
use crate::model::{PanelDisplay, PanelStatus};
use crate::panel::PanelApi;

/// Arming status plus keypad mirror from one fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlarmSnapshot {
    pub status: PanelStatus,
    pub display: PanelDisplay,
    /// Panel clock derived from `display` (or the last known offset).
    pub panel_time: DateTime<Utc>,
    pub fetched_at: DateTime<Utc>,
}

/// Owns the arming status, the display payload and the panel clock.
///
/// Cheaply cloneable; every clone shares the same cache and throttle.
pub struct AlarmCoordinator<C> {
    inner: Arc<AlarmInner<C>>,
}

struct AlarmInner<C> {
    client: Arc<C>,
    throttle: Throttle,
    clock: Mutex<PanelClock>,
    data: watch::Sender<Option<Arc<AlarmSnapshot>>>,
    last_update_success: AtomicBool,
}

impl<C> Clone for AlarmCoordinator<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: PanelApi> AlarmCoordinator<C> {
    pub fn new(client: Arc<C>, min_refresh_interval: Duration) -> Self {
        let (data, _) = watch::channel(None);
        Self {
            inner: Arc::new(AlarmInner {
                client,
                throttle: Throttle::new(min_refresh_interval),
                clock: Mutex::new(PanelClock::new()),
                data,
                last_update_success: AtomicBool::new(false),
            }),
        }
    }

    pub fn client(&self) -> &Arc<C> {
        &self.inner.client
    }

    /// Fetch status and display unless a fetch already ran inside the
    /// minimum interval, in which case the cached snapshot is returned.
    pub async fn refresh(&self) -> Result<Arc<AlarmSnapshot>, CoreError> {
        if !self.inner.throttle.try_begin() {
            return cached_or_throttled(self.current(), "alarm");
        }
        self.fetch().await
    }

    /// Clear the throttle window and fetch.
    pub async fn force_refresh(&self) -> Result<Arc<AlarmSnapshot>, CoreError> {
        debug!("forced alarm refresh");
        self.inner.throttle.clear();
        self.refresh().await
    }

    /// The last successfully fetched snapshot.
    pub fn current(&self) -> Option<Arc<AlarmSnapshot>> {
        self.inner.data.borrow().clone()
    }

    /// Notified after every successful fetch.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<AlarmSnapshot>>> {
        self.inner.data.subscribe()
    }

    /// Outcome of the most recent fetch attempt.
    pub fn last_update_success(&self) -> bool {
        self.inner.last_update_success.load(Ordering::Acquire)
    }

    /// Current panel time: from the last snapshot, or wall clock plus the
    /// last known offset before anything was fetched.
    pub fn panel_time(&self) -> DateTime<Utc> {
        match self.current() {
            Some(snapshot) => snapshot.panel_time,
            None => lock(&self.inner.clock).at(Utc::now()),
        }
    }

    async fn fetch(&self) -> Result<Arc<AlarmSnapshot>, CoreError> {
        debug!("fetching alarm status and panel display");
        let client = &self.inner.client;
        let (status, panel) = tokio::join!(client.get_system_status(), client.get_panel());

        let (status, panel) = match (status, panel) {
            (Ok(status), Ok(panel)) => (status, panel),
            (Err(e), _) | (_, Err(e)) => {
                self.inner
                    .last_update_success
                    .store(false, Ordering::Release);
                let err = CoreError::from(e);
                warn!(error = %err, "alarm status update failed");
                return Err(CoreError::update_failed(err));
            }
        };

        let now = Utc::now();
        let display = PanelDisplay::from(panel);
        let panel_time = lock(&self.inner.clock).observe(&display.display, now);

        let snapshot = Arc::new(AlarmSnapshot {
            status: PanelStatus::from(status),
            display,
            panel_time,
            fetched_at: now,
        });

        self.inner
            .last_update_success
            .store(true, Ordering::Release);
        self.inner.data.send_replace(Some(Arc::clone(&snapshot)));

        debug!(
            state = %snapshot.status.alarm_state(),
            %panel_time,
            "alarm status updated"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::AlarmState;
    use crate::test_support::FakePanel;

    const MIN: Duration = Duration::from_secs(30);

    #[tokio::test(start_paused = true)]
    async fn second_refresh_inside_window_is_served_from_cache() {
        let panel = Arc::new(FakePanel::armed(3));
        let coordinator = AlarmCoordinator::new(Arc::clone(&panel), MIN);

        let first = coordinator.refresh().await.unwrap();
        let second = coordinator.refresh().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(panel.status_calls(), 1);
        assert_eq!(panel.panel_calls(), 1);
        assert_eq!(first.status.alarm_state(), AlarmState::ArmedAway);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_after_window_fetches_again() {
        let panel = Arc::new(FakePanel::armed(0));
        let coordinator = AlarmCoordinator::new(Arc::clone(&panel), MIN);

        coordinator.refresh().await.unwrap();
        tokio::time::advance(MIN).await;
        coordinator.refresh().await.unwrap();

        assert_eq!(panel.status_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn force_refresh_bypasses_window() {
        let panel = Arc::new(FakePanel::armed(0));
        let coordinator = AlarmCoordinator::new(Arc::clone(&panel), MIN);

        coordinator.refresh().await.unwrap();
        panel.set_arm_state(1);
        let snapshot = coordinator.force_refresh().await.unwrap();

        assert_eq!(panel.status_calls(), 2);
        assert_eq!(snapshot.status.alarm_state(), AlarmState::ArmedHome);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_keeps_cached_snapshot() {
        let panel = Arc::new(FakePanel::armed(2));
        let coordinator = AlarmCoordinator::new(Arc::clone(&panel), MIN);

        let good = coordinator.refresh().await.unwrap();
        assert!(coordinator.last_update_success());

        panel.fail_status(true);
        let err = coordinator.force_refresh().await.unwrap_err();

        assert!(matches!(err, CoreError::UpdateFailed { .. }));
        assert!(!coordinator.last_update_success());
        let cached = coordinator.current().unwrap();
        assert!(Arc::ptr_eq(&good, &cached));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_first_fetch_then_throttled_call_reports_update_failed() {
        let panel = Arc::new(FakePanel::armed(0));
        panel.fail_status(true);
        let coordinator = AlarmCoordinator::new(Arc::clone(&panel), MIN);

        assert!(coordinator.refresh().await.is_err());
        let err = coordinator.refresh().await.unwrap_err();

        assert!(matches!(err, CoreError::UpdateFailed { .. }));
        assert_eq!(panel.status_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unparsable_display_reuses_offset() {
        let panel = Arc::new(FakePanel::armed(0));
        let coordinator = AlarmCoordinator::new(Arc::clone(&panel), MIN);

        let now = Utc::now();
        let panel_clock = now + chrono::TimeDelta::minutes(5);
        panel.set_display(&panel_clock.format("%a %d %b %H:%M").to_string());
        let first = coordinator.refresh().await.unwrap();

        panel.set_display("SYSTEM SET");
        let second = coordinator.force_refresh().await.unwrap();

        let first_offset = first.panel_time - first.fetched_at;
        let second_offset = second.panel_time - second.fetched_at;
        assert_eq!(first_offset, second_offset);
        assert!(first_offset > chrono::TimeDelta::minutes(4));
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_new_snapshot() {
        let panel = Arc::new(FakePanel::armed(1));
        let coordinator = AlarmCoordinator::new(Arc::clone(&panel), MIN);
        let mut rx = coordinator.subscribe();

        coordinator.refresh().await.unwrap();

        rx.changed().await.unwrap();
        let seen = rx.borrow_and_update().clone().unwrap();
        assert_eq!(seen.status.alarm_state(), AlarmState::ArmedHome);
    }
}
