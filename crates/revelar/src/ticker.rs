//! Repeating frame tick.
//!
//! Stand-in for the host's animation-frame clock: a single-owner, cancelable
//! repeating tick driving position sampling and derived-view recomputation.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Default tick period (~60 Hz).
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(16);

/// Single-owner repeating tick handle.
///
/// The tick task runs until canceled or dropped; dropping the handle stops
/// the task.
#[derive(Debug)]
pub struct FrameTicker {
    handle: Option<JoinHandle<()>>,
}

impl FrameTicker {
    /// Spawn a tick task invoking `on_tick` every `period`.
    ///
    /// Must be called within a Tokio runtime.
    #[must_use]
    pub fn start<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                on_tick();
            }
        });
        Self {
            handle: Some(handle),
        }
    }

    /// Stop the tick task.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Whether the tick task is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for FrameTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_tick_fires_repeatedly() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticks_clone = Arc::clone(&ticks);
        let _ticker = FrameTicker::start(Duration::from_millis(10), move || {
            ticks_clone.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(55)).await;
        // First tick fires immediately, then every 10ms.
        assert!(ticks.load(Ordering::SeqCst) >= 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticks_clone = Arc::clone(&ticks);
        let mut ticker = FrameTicker::start(Duration::from_millis(10), move || {
            ticks_clone.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(25)).await;
        ticker.cancel();
        let seen = ticks.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), seen);
        assert!(!ticker.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_ticks() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticks_clone = Arc::clone(&ticks);
        {
            let _ticker = FrameTicker::start(Duration::from_millis(10), move || {
                ticks_clone.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        let seen = ticks.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), seen);
    }
}
