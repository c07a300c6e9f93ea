//! System clock change detection.
//!
//! [`ClockWatcher`] polls the wall clock and compares how far it moved
//! against how far the monotonic clock moved over the same interval. When
//! the two disagree by more than the configured threshold, someone changed
//! the system time (or the time zone) and the registered callback runs.
//!
//! The watcher is a background tokio task tied to a [`ClockWatchGuard`];
//! dropping the guard unregisters it.

use crate::config::ClockWatchConfig;
use chrono::{Local, NaiveDateTime, TimeDelta};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info};

/// A detected wall-clock jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockChange {
    /// Wall-clock reading after the jump.
    pub now: NaiveDateTime,
    /// How far the wall clock moved beyond (positive) or short of (negative)
    /// the monotonic clock, in milliseconds.
    pub drift_ms: i64,
}

/// Difference between wall-clock and monotonic progress, in milliseconds.
pub fn drift_millis(wall_elapsed: TimeDelta, mono_elapsed: Duration) -> i64 {
    let mono_ms = i64::try_from(mono_elapsed.as_millis()).unwrap_or(i64::MAX);
    wall_elapsed.num_milliseconds().saturating_sub(mono_ms)
}

/// Whether a drift is large enough to count as a clock change.
pub fn is_clock_change(drift_ms: i64, threshold: Duration) -> bool {
    u128::from(drift_ms.unsigned_abs()) > threshold.as_millis()
}

type WallClock = Box<dyn Fn() -> NaiveDateTime + Send>;
type ChangeCallback = Box<dyn Fn(ClockChange) + Send>;

/// Polls for wall-clock jumps and reports them to a callback.
pub struct ClockWatcher {
    poll_interval: Duration,
    threshold: Duration,
    wall: WallClock,
    on_change: ChangeCallback,
}

impl ClockWatcher {
    /// Create a watcher reading the local clock.
    pub fn new<F>(config: &ClockWatchConfig, on_change: F) -> Self
    where
        F: Fn(ClockChange) + Send + 'static,
    {
        Self {
            poll_interval: Duration::from_secs(config.poll_interval_secs.max(1)),
            threshold: Duration::from_secs(config.drift_threshold_secs),
            wall: Box::new(|| Local::now().naive_local()),
            on_change: Box::new(on_change),
        }
    }

    /// Replace the wall clock reading (used by tests).
    pub fn with_wall_clock<W>(mut self, wall: W) -> Self
    where
        W: Fn() -> NaiveDateTime + Send + 'static,
    {
        self.wall = Box::new(wall);
        self
    }

    /// Run the watcher on a background task until the guard is dropped.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self) -> ClockWatchGuard {
        let cancel = CancellationToken::new();
        tokio::spawn(self.run(cancel.clone()));
        ClockWatchGuard {
            _drop: cancel.drop_guard(),
        }
    }

    /// Poll until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        let mut last_wall = (self.wall)();
        let mut last_mono = Instant::now();
        info!(
            poll_interval_secs = self.poll_interval.as_secs(),
            threshold_secs = self.threshold.as_secs(),
            "clock watcher started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("clock watcher cancelled");
                    break;
                }
                _ = tokio::time::sleep(self.poll_interval) => {
                    let wall = (self.wall)();
                    let mono = Instant::now();
                    let drift_ms = drift_millis(wall - last_wall, mono - last_mono);
                    if is_clock_change(drift_ms, self.threshold) {
                        info!(now = %wall, drift_ms, "system clock changed");
                        (self.on_change)(ClockChange { now: wall, drift_ms });
                    }
                    last_wall = wall;
                    last_mono = mono;
                }
            }
        }
    }
}

/// Registration token for a spawned [`ClockWatcher`].
///
/// Dropping it, or calling [`release`](Self::release), stops the watcher.
#[must_use = "dropping the guard stops the clock watcher"]
pub struct ClockWatchGuard {
    _drop: DropGuard,
}

impl ClockWatchGuard {
    /// Stop the watcher now.
    pub fn release(self) {
        drop(self);
    }
}
