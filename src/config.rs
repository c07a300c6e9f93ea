//! Configuration types for the sync daemon.

use crate::error::{Result, SyncError};
use mydns_check::{CheckConfig, ReqwestTransport, SyncChecker};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Scheduled synchronization settings.
    pub sync: SyncConfig,
    /// HTTP check settings.
    pub check: CheckSettings,
    /// System clock change detection.
    pub clock_watch: ClockWatchConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
}

/// Scheduled synchronization settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Whether the daily check is scheduled at all.
    ///
    /// Manual `sync-now` checks work regardless.
    pub enable_auto_sync: bool,
    /// Provider login URL requested with Basic auth.
    pub login_endpoint: String,
    /// Exact body line the provider prints on a successful update.
    pub success_pattern: String,
    /// Name under which the login credential is kept in the OS store.
    pub credential_target: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enable_auto_sync: true,
            login_endpoint: "https://www.mydns.jp/login.html".to_owned(),
            success_pattern: "Login and IP address notify OK.".to_owned(),
            credential_target: "MyDnsSync".to_owned(),
        }
    }
}

/// HTTP check settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckSettings {
    /// Whole-request timeout in seconds. Must be non-zero.
    pub timeout_seconds: u64,
    /// User-Agent header (`None` = `mydns-sync/<version>`).
    pub user_agent: Option<String>,
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: mydns_check::config::DEFAULT_TIMEOUT_SECONDS,
            user_agent: None,
        }
    }
}

impl CheckSettings {
    /// Transport config for [`mydns_check::ReqwestTransport`].
    pub fn to_check_config(&self) -> CheckConfig {
        CheckConfig {
            timeout_seconds: self.timeout_seconds,
            user_agent: self
                .user_agent
                .clone()
                .unwrap_or_else(|| format!("mydns-sync/{}", env!("CARGO_PKG_VERSION"))),
        }
    }

    /// Build the production checker over a reqwest transport.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Check`] if the settings are invalid or the HTTP
    /// client cannot be built.
    pub fn build_checker(&self) -> Result<SyncChecker> {
        let transport = ReqwestTransport::new(&self.to_check_config())?;
        Ok(SyncChecker::new(transport))
    }
}

/// System clock change detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockWatchConfig {
    /// Seconds between wall-clock vs monotonic comparisons.
    pub poll_interval_secs: u64,
    /// Divergence (seconds) treated as a clock change.
    pub drift_threshold_secs: u64,
}

impl Default for ClockWatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            drift_threshold_secs: 2,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Also write a daily-rolling log file under the data directory.
    pub file_logging: bool,
    /// Override for the log directory.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file_logging: true,
            directory: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| SyncError::Config(e.to_string()))
    }

    /// Load `path`, or return defaults when the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::from_file(path) {
            Ok(config) => Ok(config),
            Err(SyncError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| SyncError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> PathBuf {
        crate::app_dirs::config_file()
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - `sync.login_endpoint` is an absolute http(s) URL
    /// - `sync.success_pattern` and `sync.credential_target` are not blank
    /// - `check.timeout_seconds` is non-zero
    /// - `clock_watch.poll_interval_secs` is non-zero
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        mydns_check::validate_endpoint(&self.sync.login_endpoint)
            .map_err(|e| SyncError::Config(e.to_string()))?;
        if self.sync.success_pattern.trim().is_empty() {
            return Err(SyncError::Config(
                "sync.success_pattern must not be empty".to_owned(),
            ));
        }
        if self.sync.credential_target.trim().is_empty() {
            return Err(SyncError::Config(
                "sync.credential_target must not be empty".to_owned(),
            ));
        }
        self.check
            .to_check_config()
            .validate()
            .map_err(|e| SyncError::Config(format!("check: {e}")))?;
        if self.clock_watch.poll_interval_secs == 0 {
            return Err(SyncError::Config(
                "clock_watch.poll_interval_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }
}
