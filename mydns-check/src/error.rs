//! Error types for the mydns-check crate.
//!
//! Messages never contain the credential being checked.

/// Errors raised while building or using the check transport.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// The HTTP request could not be completed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Invalid check configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for mydns-check results.
pub type Result<T> = std::result::Result<T, CheckError>;
