//! Transport configuration with sensible defaults.

use crate::error::CheckError;

/// Default request timeout. Must stay finite so a hung provider cannot stall
/// the daily cycle.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Configuration for the HTTP transport used by the checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    /// Whole-request timeout in seconds.
    pub timeout_seconds: u64,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            user_agent: default_user_agent(),
        }
    }
}

/// `mydns-check/<crate version>`.
pub fn default_user_agent() -> String {
    format!("mydns-check/{}", env!("CARGO_PKG_VERSION"))
}

impl CheckConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `timeout_seconds` must be greater than 0
    /// - `user_agent` must not be blank
    pub fn validate(&self) -> Result<(), CheckError> {
        if self.timeout_seconds == 0 {
            return Err(CheckError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(CheckError::Config("user_agent must not be empty".into()));
        }
        Ok(())
    }
}

/// Checks that `endpoint` is an absolute `http` or `https` URL.
pub fn validate_endpoint(endpoint: &str) -> Result<url::Url, CheckError> {
    let parsed = url::Url::parse(endpoint)
        .map_err(|e| CheckError::Config(format!("invalid login endpoint '{endpoint}': {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(CheckError::Config(format!(
            "login endpoint must use http or https, got '{other}'"
        ))),
    }
}
