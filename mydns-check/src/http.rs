//! Shared HTTP client construction.
//!
//! One [`reqwest::Client`] is built per process and shared by every check so
//! connection setup is paid once.

use crate::config::CheckConfig;
use crate::error::CheckError;
use std::time::Duration;

/// Build a [`reqwest::Client`] configured for the provider login endpoint.
///
/// The client has:
/// - a finite whole-request timeout from config
/// - the configured User-Agent
/// - a bounded redirect policy
///
/// # Errors
///
/// Returns [`CheckError::Config`] for an invalid config and
/// [`CheckError::Http`] if the client cannot be constructed.
pub fn build_client(config: &CheckConfig) -> Result<reqwest::Client, CheckError> {
    config.validate()?;

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| CheckError::Http(format!("failed to build HTTP client: {e}")))
}
