//! Time sources: "now" plus a single re-armable wake-up alarm.
//!
//! The engine reasons in local wall-clock time ([`NaiveDateTime`]) but the
//! alarm itself is relative: it is armed with a delay and rings on the
//! monotonic clock. A wall-clock jump therefore leaves an armed alarm pointing
//! at the wrong moment until it is re-armed.

use crate::error::{Result, SyncError};
use chrono::{Local, NaiveDateTime};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Source of the current time and owner of the one outstanding alarm.
pub trait TimeSource {
    /// Current local wall-clock time.
    fn now(&self) -> NaiveDateTime;

    /// Arm the alarm to ring `delay` from now, replacing any armed alarm.
    fn arm(&mut self, delay: Duration);

    /// Cancel the armed alarm, if any.
    fn disarm(&mut self);

    /// Monotonic instant the armed alarm rings at, for event loops to await.
    fn deadline(&self) -> Option<Instant>;
}

/// The real clock: local wall time and a tokio deadline.
#[derive(Debug)]
pub struct SystemClock {
    deadline: Option<Instant>,
}

impl SystemClock {
    /// Create the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Scheduler`] when called outside a tokio runtime,
    /// where no timer facility exists to back the alarm.
    pub fn new() -> Result<Self> {
        tokio::runtime::Handle::try_current().map_err(|e| {
            SyncError::Scheduler(format!("alarm needs a running tokio runtime: {e}"))
        })?;
        Ok(Self { deadline: None })
    }
}

impl TimeSource for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn arm(&mut self, delay: Duration) {
        self.deadline = Some(Instant::now() + delay);
    }

    fn disarm(&mut self) {
        self.deadline = None;
    }

    fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

#[derive(Debug)]
struct ManualState {
    now: NaiveDateTime,
    armed: Option<Duration>,
    deadline: Option<Instant>,
    arm_count: usize,
}

/// Hand-driven clock for tests and simulations.
///
/// Clones share state, so a test can keep one handle while the engine owns
/// another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    state: Arc<Mutex<ManualState>>,
}

impl ManualClock {
    /// Create a clock reading `now`, with no alarm armed.
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManualState {
                now,
                armed: None,
                deadline: None,
                arm_count: 0,
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the wall clock, forwards or backwards. The alarm is not touched.
    pub fn set(&self, now: NaiveDateTime) {
        self.lock().now = now;
    }

    /// Move the wall clock forward by `by`.
    pub fn advance(&self, by: chrono::Duration) {
        let mut state = self.lock();
        state.now += by;
    }

    /// Delay the alarm was last armed with, or `None` when disarmed.
    pub fn armed_delay(&self) -> Option<Duration> {
        self.lock().armed
    }

    /// Number of times the alarm has been armed.
    pub fn arm_count(&self) -> usize {
        self.lock().arm_count
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.lock().now
    }

    fn arm(&mut self, delay: Duration) {
        let mut state = self.lock();
        state.armed = Some(delay);
        state.deadline = Some(Instant::now() + delay);
        state.arm_count += 1;
    }

    fn disarm(&mut self) {
        let mut state = self.lock();
        state.armed = None;
        state.deadline = None;
    }

    fn deadline(&self) -> Option<Instant> {
        self.lock().deadline
    }
}

/// Delay from `now` until `due`; zero when `due` is not in the future.
pub fn delay_until(now: NaiveDateTime, due: NaiveDateTime) -> Duration {
    (due - now).to_std().unwrap_or(Duration::ZERO)
}
