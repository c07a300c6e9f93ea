//! Daily synchronization policy.
//!
//! [`SyncCoordinator`] owns the [`ScheduleEngine`] and keeps exactly one
//! daily check pending, due at the next local midnight. When it fires, the
//! credential lookup (never prompting) and the check run on their own tokio
//! task; the outcome comes back as [`CoordinatorEvent::CheckFinished`] and the
//! next midnight is scheduled whatever the result. A check task that panics
//! or is aborted reports a transport failure.
//!
//! All engine mutations happen on the coordinator's own task. Other tasks
//! talk to it through a [`CoordinatorHandle`].
//!
//! [`ImmediateSync`] is the user-triggered path: same check, no scheduling.

use crate::config::SyncConfig;
use crate::credentials::{self, CredentialPrompt, CredentialStore};
use crate::error::{Result, SyncError};
use crate::scheduler::{ScheduleEngine, TimeSource};
use chrono::{NaiveDateTime, NaiveTime};
use mydns_check::{FailureReason, SyncCheck, SyncOutcome};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Payload of a scheduled entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncJob {
    /// Run the login check for the credential stored under `credential_target`.
    DailyCheck {
        /// Credential store key.
        credential_target: String,
    },
}

/// Messages delivered to the coordinator task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorEvent {
    /// The system clock or time zone changed.
    ClockChanged,
    /// A spawned check completed.
    CheckFinished(SyncOutcome),
    /// A due check found no usable credential and did not run.
    CheckSkipped,
    /// Stop the event loop.
    Shutdown,
}

/// Lifecycle of the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// Nothing scheduled (auto sync disabled or not started).
    Idle,
    /// A daily check is pending.
    Waiting,
    /// A check is in flight.
    Checking,
}

impl fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Waiting => "waiting",
            Self::Checking => "checking",
        };
        f.write_str(s)
    }
}

/// Snapshot published after every state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorStatus {
    /// Current state.
    pub state: CoordinatorState,
    /// Due time of the pending daily check.
    pub next_due: Option<NaiveDateTime>,
    /// Outcome of the most recent scheduled check.
    pub last_outcome: Option<SyncOutcome>,
    /// Number of scheduled checks completed so far.
    pub completed_checks: u64,
}

impl Default for CoordinatorStatus {
    fn default() -> Self {
        Self {
            state: CoordinatorState::Idle,
            next_due: None,
            last_outcome: None,
            completed_checks: 0,
        }
    }
}

/// Start of the next calendar day.
pub fn next_midnight(now: NaiveDateTime) -> NaiveDateTime {
    now.date()
        .succ_opt()
        .map_or(NaiveDateTime::MAX, |day| day.and_time(NaiveTime::MIN))
}

/// Cloneable sender side of a running coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    events: mpsc::UnboundedSender<CoordinatorEvent>,
    status: watch::Receiver<CoordinatorStatus>,
}

impl CoordinatorHandle {
    /// Report a system clock change.
    pub fn clock_changed(&self) {
        self.send(CoordinatorEvent::ClockChanged);
    }

    /// Ask the event loop to stop.
    pub fn shutdown(&self) {
        self.send(CoordinatorEvent::Shutdown);
    }

    /// Subscribe to status snapshots.
    pub fn status(&self) -> watch::Receiver<CoordinatorStatus> {
        self.status.clone()
    }

    fn send(&self, event: CoordinatorEvent) {
        if self.events.send(event).is_err() {
            debug!("coordinator already stopped");
        }
    }
}

/// Drives the daily check on top of a [`ScheduleEngine`].
pub struct SyncCoordinator<T: TimeSource, C> {
    engine: ScheduleEngine<T, SyncJob>,
    store: Arc<dyn CredentialStore>,
    checker: Arc<C>,
    settings: SyncConfig,
    state: CoordinatorState,
    events_tx: mpsc::UnboundedSender<CoordinatorEvent>,
    events_rx: mpsc::UnboundedReceiver<CoordinatorEvent>,
    status_tx: watch::Sender<CoordinatorStatus>,
}

impl<T, C> SyncCoordinator<T, C>
where
    T: TimeSource,
    C: SyncCheck + 'static,
{
    /// Create an idle coordinator. Nothing is scheduled until [`start`](Self::start).
    pub fn new(
        time: T,
        store: Arc<dyn CredentialStore>,
        checker: Arc<C>,
        settings: SyncConfig,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (status_tx, _) = watch::channel(CoordinatorStatus::default());
        Self {
            engine: ScheduleEngine::new(time),
            store,
            checker,
            settings,
            state: CoordinatorState::Idle,
            events_tx,
            events_rx,
            status_tx,
        }
    }

    /// Handle for other tasks (clock watcher, signal handler).
    pub fn handle(&self) -> CoordinatorHandle {
        CoordinatorHandle {
            events: self.events_tx.clone(),
            status: self.status_tx.subscribe(),
        }
    }

    /// Current state.
    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// The underlying engine.
    pub fn engine(&self) -> &ScheduleEngine<T, SyncJob> {
        &self.engine
    }

    /// Schedule the first daily check, unless auto sync is disabled.
    ///
    /// A missing credential is reported but does not prevent scheduling; it
    /// is looked up again when the check fires.
    pub async fn start(&mut self) {
        if !self.settings.enable_auto_sync {
            info!("auto sync disabled, nothing scheduled");
            self.set_state(CoordinatorState::Idle);
            return;
        }

        let target = self.settings.credential_target.clone();
        let store = Arc::clone(&self.store);
        match credentials::fetch_credential(store, target.clone(), None).await {
            Ok(Some(_)) => {}
            Ok(None) => warn!(
                credential_target = %target,
                "no credential stored, scheduled checks will be skipped until one is saved"
            ),
            Err(e) => warn!(credential_target = %target, error = %e, "credential lookup failed"),
        }

        self.schedule_daily();
    }

    /// Dispatch every due job.
    pub fn on_alarm_fired(&mut self) {
        for entry in self.engine.take_due() {
            match entry.payload {
                SyncJob::DailyCheck { credential_target } => self.begin_check(&credential_target),
            }
        }
        self.publish();
    }

    /// Record a finished check and schedule the next one.
    pub fn on_check_finished(&mut self, outcome: SyncOutcome) {
        match outcome.failure_reason() {
            None => info!("scheduled sync check succeeded"),
            Some(reason) => warn!(%reason, "scheduled sync check failed"),
        }
        self.status_tx.send_modify(|status| {
            status.last_outcome = Some(outcome);
            status.completed_checks += 1;
        });
        self.set_state(CoordinatorState::Waiting);
        self.schedule_daily();
    }

    /// A due check did not run; schedule the next one.
    pub fn on_check_skipped(&mut self) {
        self.set_state(CoordinatorState::Waiting);
        self.schedule_daily();
    }

    /// Re-arm the alarm after a system clock change.
    pub fn on_clock_changed(&mut self) {
        self.engine.on_clock_changed();
        self.publish();
    }

    /// Apply one event. Returns `false` when the loop should stop.
    pub fn handle_event(&mut self, event: CoordinatorEvent) -> bool {
        match event {
            CoordinatorEvent::ClockChanged => self.on_clock_changed(),
            CoordinatorEvent::CheckFinished(outcome) => self.on_check_finished(outcome),
            CoordinatorEvent::CheckSkipped => self.on_check_skipped(),
            CoordinatorEvent::Shutdown => {
                info!("coordinator shutting down");
                return false;
            }
        }
        true
    }

    /// Event loop: alarm deadline, incoming events and cancellation.
    ///
    /// A check still in flight when the loop exits is abandoned.
    pub async fn run(&mut self, cancel: CancellationToken) {
        info!(state = %self.state, next_due = ?self.engine.next_due(), "coordinator running");
        loop {
            let deadline = self.engine.time_source().deadline();
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("coordinator cancelled");
                    break;
                }
                _ = sleep_until(deadline) => self.on_alarm_fired(),
                event = self.events_rx.recv() => match event {
                    Some(event) => {
                        if !self.handle_event(event) {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }
    }

    fn begin_check(&mut self, credential_target: &str) {
        if self.state == CoordinatorState::Checking {
            warn!("previous sync check still running, skipping this one");
            self.schedule_daily();
            return;
        }

        self.set_state(CoordinatorState::Checking);

        let check = scheduled_check(
            Arc::clone(&self.store),
            Arc::clone(&self.checker),
            credential_target.to_owned(),
            self.settings.login_endpoint.clone(),
            self.settings.success_pattern.clone(),
        );
        let events = self.events_tx.clone();
        // The inner task isolates panics so the coordinator always hears back.
        tokio::spawn(async move {
            let event = match tokio::spawn(check).await {
                Ok(Some(outcome)) => CoordinatorEvent::CheckFinished(outcome),
                Ok(None) => CoordinatorEvent::CheckSkipped,
                Err(e) => {
                    error!(error = %e, "sync check task failed");
                    CoordinatorEvent::CheckFinished(SyncOutcome::Failure(
                        FailureReason::TransportError,
                    ))
                }
            };
            if events.send(event).is_err() {
                debug!("coordinator stopped before check finished");
            }
        });
    }

    /// Keep exactly one daily check pending.
    fn schedule_daily(&mut self) {
        if !self.settings.enable_auto_sync {
            return;
        }
        if let Some(due) = self.engine.next_due() {
            debug!(%due, "daily check already pending");
            return;
        }

        let due = next_midnight(self.engine.time_source().now());
        self.engine.schedule(
            due,
            SyncJob::DailyCheck {
                credential_target: self.settings.credential_target.clone(),
            },
        );
        info!(%due, "next sync check scheduled");
        if self.state != CoordinatorState::Checking {
            self.set_state(CoordinatorState::Waiting);
        } else {
            self.publish();
        }
    }

    fn set_state(&mut self, state: CoordinatorState) {
        if self.state != state {
            debug!(from = %self.state, to = %state, "coordinator state");
        }
        self.state = state;
        self.publish();
    }

    fn publish(&self) {
        let state = self.state;
        let next_due = self.engine.next_due();
        self.status_tx.send_if_modified(|status| {
            let changed = status.state != state || status.next_due != next_due;
            status.state = state;
            status.next_due = next_due;
            changed
        });
    }
}

/// Look up the credential and run one check. `None` means no check ran.
async fn scheduled_check<C: SyncCheck>(
    store: Arc<dyn CredentialStore>,
    checker: Arc<C>,
    credential_target: String,
    login_endpoint: String,
    success_pattern: String,
) -> Option<SyncOutcome> {
    let lookup = credentials::fetch_credential(store, credential_target.clone(), None).await;
    let credential = match lookup {
        Ok(Some(credential)) => credential,
        Ok(None) => {
            warn!(%credential_target, "no credential stored, skipping sync check");
            return None;
        }
        Err(e) => {
            warn!(%credential_target, error = %e, "credential lookup failed, skipping sync check");
            return None;
        }
    };

    info!(%credential_target, "starting scheduled sync check");
    Some(checker.check(&credential, &login_endpoint, &success_pattern).await)
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Result of a user-triggered check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImmediateSyncResult {
    /// No credential stored and none entered.
    NoCredential,
    /// The check ran and failed.
    Failed(FailureReason),
    /// The check ran and the success marker was found.
    Succeeded,
}

impl ImmediateSyncResult {
    /// Message shown to the user. All failure reasons share one text.
    pub fn message(&self) -> &'static str {
        match self {
            Self::NoCredential => {
                "No MyDNS login is stored. Run `mydns-sync login` or retry with --prompt."
            }
            Self::Failed(_) => "Synchronization with MyDNS failed. See the log for details.",
            Self::Succeeded => "Synchronization with MyDNS succeeded.",
        }
    }

    /// Whether the check succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl fmt::Display for ImmediateSyncResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Schedule-independent check on demand.
pub struct ImmediateSync<C> {
    store: Arc<dyn CredentialStore>,
    checker: Arc<C>,
    settings: SyncConfig,
}

impl<C: SyncCheck> ImmediateSync<C> {
    /// Create an immediate-sync runner.
    pub fn new(store: Arc<dyn CredentialStore>, checker: Arc<C>, settings: SyncConfig) -> Self {
        Self {
            store,
            checker,
            settings,
        }
    }

    /// Look up the credential (asking through `prompt` if given and nothing
    /// is stored) and run one check.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Credential`] when the store or the prompt fails.
    pub async fn run(
        &self,
        prompt: Option<Arc<dyn CredentialPrompt>>,
    ) -> Result<ImmediateSyncResult> {
        let target = self.settings.credential_target.clone();
        let store = Arc::clone(&self.store);
        let lookup = credentials::fetch_credential(store, target.clone(), prompt).await;
        let Some(credential) = lookup.map_err(SyncError::from)? else {
            info!(credential_target = %target, "immediate sync skipped, no credential");
            return Ok(ImmediateSyncResult::NoCredential);
        };

        info!(credential_target = %target, "starting immediate sync check");
        let outcome = self
            .checker
            .check(
                &credential,
                &self.settings.login_endpoint,
                &self.settings.success_pattern,
            )
            .await;

        Ok(match outcome {
            SyncOutcome::Success => {
                info!("immediate sync check succeeded");
                ImmediateSyncResult::Succeeded
            }
            SyncOutcome::Failure(reason) => {
                warn!(%reason, "immediate sync check failed");
                ImmediateSyncResult::Failed(reason)
            }
        })
    }
}
