//! Core types for credential management.

/// Errors that can occur during credential operations.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Platform credential store access failed.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// A stored entry exists but cannot be decoded.
    #[error("Invalid stored credential: {0}")]
    InvalidEntry(String),

    /// Reading interactive input failed.
    #[error("Prompt error: {0}")]
    Prompt(String),
}
