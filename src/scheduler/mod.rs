//! Time-based callback scheduling.
//!
//! [`ScheduleEngine`] holds future entries ordered by due time and drives one
//! re-armable alarm provided by a [`TimeSource`].

pub mod clock;
pub mod engine;

pub use clock::{ManualClock, SystemClock, TimeSource, delay_until};
pub use engine::{AlarmState, EntryId, ScheduleEngine, ScheduleEntry};
