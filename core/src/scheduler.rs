//! Second-aligned redraw scheduler
//!
//! Runs only while the surface is visible and interactive. Each wake
//! re-derives its delay from the fresh wall clock instead of incrementing
//! the previous deadline, so jitter never accumulates into drift.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::state::DisplayMode;

const TICK_PERIOD_MS: i64 = 1000;

/// Delay from `now_ms` to the next wall-clock second boundary
pub fn delay_to_next_second(now_ms: i64) -> u64 {
    (TICK_PERIOD_MS - now_ms.rem_euclid(TICK_PERIOD_MS)) as u64
}

/// Periodic redraw driver.
///
/// Holds at most one timer task; stopping is idempotent and aborting the
/// task synchronously removes any pending wake.
#[derive(Debug)]
pub struct TickScheduler {
    redraw: UnboundedSender<()>,
    task: Option<JoinHandle<()>>,
}

impl TickScheduler {
    pub fn new(redraw: UnboundedSender<()>) -> Self {
        Self { redraw, task: None }
    }

    /// Recompute the desired state after a visibility or mode change.
    ///
    /// Restarting on every call keeps the transition logic trivial; the
    /// first wake is re-aligned to the second boundary either way.
    pub fn update(&mut self, visible: bool, mode: DisplayMode) {
        self.stop();
        if visible && mode == DisplayMode::Interactive {
            self.start();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Cancel any pending wake. Safe to call when already stopped.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("tick scheduler stopped");
        }
    }

    fn start(&mut self) {
        let redraw = self.redraw.clone();
        debug!("tick scheduler running");
        self.task = Some(tokio::spawn(async move {
            loop {
                let now_ms = chrono::Utc::now().timestamp_millis();
                tokio::time::sleep(Duration::from_millis(delay_to_next_second(now_ms))).await;
                if redraw.send(()).is_err() {
                    break;
                }
            }
        }));
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_delay_aligns_to_second_boundary() {
        assert_eq!(delay_to_next_second(0), 1000);
        assert_eq!(delay_to_next_second(1), 999);
        assert_eq!(delay_to_next_second(999), 1);
        assert_eq!(delay_to_next_second(1000), 1000);
        assert_eq!(delay_to_next_second(12_345), 655);
    }

    #[test]
    fn test_delay_is_never_zero_or_oversized() {
        for now in [0, 1, 500, 999, 1000, 123_456_789] {
            let delay = delay_to_next_second(now);
            assert!(delay >= 1 && delay <= 1000, "delay {delay} for now {now}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_only_while_visible_and_interactive() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut scheduler = TickScheduler::new(tx);

        scheduler.update(true, DisplayMode::Interactive);
        assert!(scheduler.is_running());

        scheduler.update(true, DisplayMode::Ambient);
        assert!(!scheduler.is_running());

        scheduler.update(false, DisplayMode::Interactive);
        assert!(!scheduler.is_running());

        scheduler.update(false, DisplayMode::Ambient);
        assert!(!scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_arrive_while_running_and_stop_after() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = TickScheduler::new(tx);

        scheduler.update(true, DisplayMode::Interactive);
        assert!(rx.recv().await.is_some(), "expected a redraw tick");

        scheduler.stop();
        scheduler.stop(); // idempotent

        // Drain anything sent before the abort, then verify silence.
        while rx.try_recv().is_ok() {}
        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err(), "no ticks after stop");
    }
}
