//! mydns-sync: keeps a MyDNS dynamic-DNS registration current.
//!
//! Once a day, at local midnight, the daemon logs in to the provider with
//! HTTP Basic authentication; a successful login is what refreshes the
//! registered address. The response page is scanned for the provider's
//! success line to tell whether the update went through.
//!
//! # Architecture
//!
//! - **Scheduler**: [`ScheduleEngine`] keeps future entries in due order and
//!   drives one re-armable alarm from a [`TimeSource`]
//! - **Coordinator**: [`SyncCoordinator`] keeps one daily check pending,
//!   runs it on its own task and schedules the next midnight
//! - **Check**: [`mydns_check::SyncChecker`] does the HTTP round trip and
//!   the success-marker scan
//! - **Clock watch**: [`clock_watch::ClockWatcher`] notices system clock
//!   changes so the alarm can be re-armed
//! - **Credentials**: the login lives in the OS credential store and is read
//!   fresh for every check

pub mod app_dirs;
pub mod clock_watch;
pub mod config;
pub mod coordinator;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod scheduler;

pub use config::AppConfig;
pub use coordinator::{
    CoordinatorEvent, CoordinatorHandle, CoordinatorState, CoordinatorStatus, ImmediateSync,
    ImmediateSyncResult, SyncCoordinator, SyncJob, next_midnight,
};
pub use error::{Result, SyncError};
pub use scheduler::{ScheduleEngine, SystemClock, TimeSource};
