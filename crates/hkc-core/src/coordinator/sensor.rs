use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::{AlarmCoordinator, Throttle, cached_or_throttled};
use crate::error::CoreError;
use crate::model::InputRecord;
use crate::panel::PanelApi;

/// Zone inputs from one fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorSnapshot {
    pub inputs: Vec<InputRecord>,
    pub fetched_at: DateTime<Utc>,
}

impl SensorSnapshot {
    pub fn input(&self, input_id: &str) -> Option<&InputRecord> {
        self.inputs.iter().find(|i| i.input_id == input_id)
    }
}

/// Owns the zone input list.
///
/// Every refresh goes through the alarm coordinator first so zone states
/// are derived against a current panel clock.
pub struct SensorCoordinator<C> {
    inner: Arc<SensorInner<C>>,
}

struct SensorInner<C> {
    alarm: AlarmCoordinator<C>,
    throttle: Throttle,
    data: watch::Sender<Option<Arc<SensorSnapshot>>>,
    last_update_success: AtomicBool,
}

impl<C> Clone for SensorCoordinator<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: PanelApi> SensorCoordinator<C> {
    pub fn new(alarm: AlarmCoordinator<C>, min_refresh_interval: Duration) -> Self {
        let (data, _) = watch::channel(None);
        Self {
            inner: Arc::new(SensorInner {
                alarm,
                throttle: Throttle::new(min_refresh_interval),
                data,
                last_update_success: AtomicBool::new(false),
            }),
        }
    }

    pub fn alarm(&self) -> &AlarmCoordinator<C> {
        &self.inner.alarm
    }

    /// Refresh the alarm coordinator, then the inputs unless a fetch
    /// already ran inside the minimum interval.
    ///
    /// An alarm failure is logged and does not stop the input fetch.
    pub async fn refresh(&self) -> Result<Arc<SensorSnapshot>, CoreError> {
        if let Err(e) = self.inner.alarm.refresh().await {
            warn!(error = %e, "alarm refresh ahead of input fetch failed");
        }

        if !self.inner.throttle.try_begin() {
            return cached_or_throttled(self.current(), "sensor");
        }

        debug!("fetching zone inputs");
        let inputs = match self.inner.alarm.client().get_all_inputs().await {
            Ok(inputs) => inputs,
            Err(e) => {
                self.inner
                    .last_update_success
                    .store(false, Ordering::Release);
                let err = CoreError::from(e);
                warn!(error = %err, "zone input update failed");
                return Err(CoreError::update_failed(err));
            }
        };

        let snapshot = Arc::new(SensorSnapshot {
            inputs: inputs.into_iter().map(InputRecord::from).collect(),
            fetched_at: Utc::now(),
        });

        self.inner
            .last_update_success
            .store(true, Ordering::Release);
        self.inner.data.send_replace(Some(Arc::clone(&snapshot)));

        debug!(inputs = snapshot.inputs.len(), "zone inputs updated");
        Ok(snapshot)
    }

    pub fn current(&self) -> Option<Arc<SensorSnapshot>> {
        self.inner.data.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<SensorSnapshot>>> {
        self.inner.data.subscribe()
    }

    pub fn last_update_success(&self) -> bool {
        self.inner.last_update_success.load(Ordering::Acquire)
    }
}
