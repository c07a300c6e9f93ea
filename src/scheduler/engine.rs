//! Time-ordered callback scheduler.
//!
//! [`ScheduleEngine`] keeps pending entries sorted by due time (ties in
//! insertion order) and keeps exactly one alarm armed for the earliest of
//! them. When the alarm rings, every entry whose due time has passed is
//! removed and handed out in ascending order; entries still in the future are
//! left alone and the alarm is re-armed for the new earliest one.
//!
//! Due times are absolute wall-clock values. After the system clock is
//! changed, [`ScheduleEngine::on_clock_changed`] re-arms the relative alarm so
//! it rings at the right wall-clock moment again.

use crate::scheduler::clock::{TimeSource, delay_until};
use chrono::NaiveDateTime;
use std::fmt;
use tracing::{debug, warn};

/// Handle for one scheduled entry, usable with [`ScheduleEngine::cancel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

/// A pending callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry<E> {
    /// Handle returned by [`ScheduleEngine::schedule`].
    pub id: EntryId,
    /// Wall-clock time at which the entry becomes due.
    pub due: NaiveDateTime,
    /// Data handed to the callback.
    pub payload: E,
}

/// The single wake-up alarm as seen by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlarmState {
    wake_at: Option<NaiveDateTime>,
}

impl AlarmState {
    /// Whether an alarm is outstanding.
    pub fn is_armed(&self) -> bool {
        self.wake_at.is_some()
    }

    /// Due time the alarm was armed for.
    pub fn wake_at(&self) -> Option<NaiveDateTime> {
        self.wake_at
    }
}

/// Ordered set of future callbacks driving one re-armable alarm.
pub struct ScheduleEngine<T, E> {
    time: T,
    entries: Vec<ScheduleEntry<E>>,
    alarm: AlarmState,
    next_id: u64,
}

impl<T: TimeSource, E> ScheduleEngine<T, E> {
    /// Create an empty engine with the alarm disarmed.
    pub fn new(time: T) -> Self {
        Self {
            time,
            entries: Vec::new(),
            alarm: AlarmState::default(),
            next_id: 0,
        }
    }

    /// Insert an entry due at `due`.
    ///
    /// The alarm is re-armed when nothing was armed or the new entry is
    /// earlier than the current wake time.
    pub fn schedule(&mut self, due: NaiveDateTime, payload: E) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;

        // After every entry due at or before `due`: equal due times stay in
        // insertion order.
        let index = self.entries.partition_point(|entry| entry.due <= due);
        self.entries.insert(index, ScheduleEntry { id, due, payload });
        debug!(?id, %due, pending = self.entries.len(), "entry scheduled");

        let earlier = match self.alarm.wake_at {
            Some(wake_at) => due < wake_at,
            None => true,
        };
        if earlier {
            self.arm_for(due);
        }
        id
    }

    /// Remove a pending entry, returning its payload.
    pub fn cancel(&mut self, id: EntryId) -> Option<E> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        let entry = self.entries.remove(index);
        debug!(?id, due = %entry.due, "entry cancelled");
        if index == 0 {
            self.rearm();
        }
        Some(entry.payload)
    }

    /// Remove and return every entry due at or before now, earliest first.
    ///
    /// Scanning stops at the first entry still in the future. The alarm is
    /// then disarmed (nothing left) or re-armed for the new earliest entry.
    pub fn take_due(&mut self) -> Vec<ScheduleEntry<E>> {
        let now = self.time.now();
        let count = self.entries.partition_point(|entry| entry.due <= now);
        let due: Vec<_> = self.entries.drain(..count).collect();
        debug!(%now, fired = due.len(), pending = self.entries.len(), "alarm fired");
        self.rearm();
        due
    }

    /// Fire every due entry through `callback`, earliest first.
    ///
    /// Each due entry is passed to `callback` exactly once and is gone from
    /// the engine afterwards. An `Err` from the callback is logged and the
    /// remaining entries still fire. Returns the number of entries fired.
    pub fn on_alarm_fired<F, Er>(&mut self, mut callback: F) -> usize
    where
        F: FnMut(ScheduleEntry<E>) -> Result<(), Er>,
        Er: fmt::Display,
    {
        let due = self.take_due();
        let fired = due.len();
        for entry in due {
            let id = entry.id;
            if let Err(e) = callback(entry) {
                warn!(?id, error = %e, "scheduled callback failed");
            }
        }
        fired
    }

    /// Re-arm after a system clock change.
    ///
    /// Entries and their due times are unchanged; only the relative alarm is
    /// recomputed against the new current time.
    pub fn on_clock_changed(&mut self) {
        debug!(now = %self.time.now(), "clock changed, re-arming alarm");
        self.rearm();
    }

    /// Number of pending entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest pending due time.
    pub fn next_due(&self) -> Option<NaiveDateTime> {
        self.entries.first().map(|entry| entry.due)
    }

    /// Pending entries in firing order.
    pub fn entries(&self) -> impl Iterator<Item = &ScheduleEntry<E>> {
        self.entries.iter()
    }

    /// Current alarm state.
    pub fn alarm(&self) -> AlarmState {
        self.alarm
    }

    /// The time source backing the alarm.
    pub fn time_source(&self) -> &T {
        &self.time
    }

    fn rearm(&mut self) {
        match self.entries.first().map(|entry| entry.due) {
            Some(due) => self.arm_for(due),
            None => {
                self.time.disarm();
                self.alarm.wake_at = None;
            }
        }
    }

    fn arm_for(&mut self, due: NaiveDateTime) {
        let delay = delay_until(self.time.now(), due);
        self.time.arm(delay);
        self.alarm.wake_at = Some(due);
    }
}
