// ── Update coordinators ──
//
// Each coordinator owns one slice of cached panel data and the throttle
// that guards its vendor calls. Entities never fetch on their own: they
// subscribe to a coordinator and re-derive their state from its snapshot.

mod alarm;
mod sensor;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::error::CoreError;

pub use alarm::{AlarmCoordinator, AlarmSnapshot};
pub use sensor::{SensorCoordinator, SensorSnapshot};

/// Minimum spacing between two outbound fetches.
///
/// Stamped when a fetch starts, whatever its outcome. The lock is held for
/// the compare-and-stamp only, never across a vendor call, so concurrent
/// callers are not queued behind a fetch in flight.
#[derive(Debug)]
pub struct Throttle {
    min_interval: Duration,
    last_attempt: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_attempt: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Whether the last attempt is still inside the window.
    pub fn is_fresh(&self) -> bool {
        lock(&self.last_attempt).is_some_and(|at| at.elapsed() < self.min_interval)
    }

    /// Claim the window for a new fetch. `false` means a fetch already
    /// happened inside it and the caller should serve cached data.
    pub fn try_begin(&self) -> bool {
        let mut last = lock(&self.last_attempt);
        if last.is_some_and(|at| at.elapsed() < self.min_interval) {
            return false;
        }
        *last = Some(Instant::now());
        true
    }

    /// Forget the last attempt so the next `try_begin` succeeds.
    pub fn clear(&self) {
        *lock(&self.last_attempt) = None;
    }
}

/// Throttled call: hand back the cache, or fail when nothing was ever fetched.
fn cached_or_throttled<T>(cached: Option<Arc<T>>, what: &str) -> Result<Arc<T>, CoreError> {
    if let Some(snapshot) = cached {
        debug!(coordinator = what, "inside minimum refresh interval, serving cache");
        return Ok(snapshot);
    }
    Err(CoreError::UpdateFailed {
        message: format!("{what} refresh throttled and no data has been fetched yet"),
    })
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn window_opens_after_min_interval() {
        let throttle = Throttle::new(Duration::from_secs(30));
        assert!(!throttle.is_fresh());
        assert!(throttle.try_begin());
        assert!(throttle.is_fresh());
        assert!(!throttle.try_begin());

        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(!throttle.try_begin());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!throttle.is_fresh());
        assert!(throttle.try_begin());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_reopens_window() {
        let throttle = Throttle::new(Duration::from_secs(30));
        assert!(throttle.try_begin());
        throttle.clear();
        assert!(throttle.try_begin());
    }

    #[test]
    fn throttled_without_cache_is_update_failed() {
        let err = cached_or_throttled::<u8>(None, "alarm").unwrap_err();
        assert!(matches!(err, CoreError::UpdateFailed { .. }));
        assert_eq!(*cached_or_throttled(Some(Arc::new(7u8)), "alarm").unwrap(), 7);
    }
}
