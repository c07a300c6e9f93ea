//! Error types for the sync daemon.

use crate::credentials::CredentialError;

/// Top-level error type for mydns-sync.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Configuration error (unreadable, unparsable or invalid values).
    #[error("config error: {0}")]
    Config(String),

    /// Credential store error.
    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),

    /// Check transport construction error.
    #[error("check error: {0}")]
    Check(#[from] mydns_check::CheckError),

    /// Scheduler or alarm facility error.
    #[error("scheduler error: {0}")]
    Scheduler(String),

    /// Logging setup error.
    #[error("logging error: {0}")]
    Logging(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, SyncError>;
