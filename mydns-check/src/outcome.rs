//! Result of one synchronization check.

use std::fmt;

/// Why a check did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// Connection error, timeout, or unreadable response body.
    TransportError,
    /// The provider answered with a non-2xx status.
    AuthRejected,
    /// 2xx response whose body lacks the success marker line.
    MarkerNotFound,
}

impl FailureReason {
    /// Stable identifier used in structured log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TransportError => "transport_error",
            Self::AuthRejected => "auth_rejected",
            Self::MarkerNotFound => "marker_not_found",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`SyncChecker::check`](crate::SyncChecker::check).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncOutcome {
    /// The provider confirmed the address update.
    Success,
    /// The check failed for the given reason.
    Failure(FailureReason),
}

impl SyncOutcome {
    /// Returns `true` for [`SyncOutcome::Success`].
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// The failure reason, if any.
    pub fn failure_reason(self) -> Option<FailureReason> {
        match self {
            Self::Success => None,
            Self::Failure(reason) => Some(reason),
        }
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Failure(reason) => write!(f, "failure ({reason})"),
        }
    }
}
