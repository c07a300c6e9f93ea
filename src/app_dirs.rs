//! Application directory paths.
//!
//! Uses the [`dirs`] crate for platform-appropriate locations.
//!
//! | Purpose | Linux | Windows |
//! |---------|-------|---------|
//! | Config | `~/.config/mydns-sync/` | `%APPDATA%\mydns-sync\` |
//! | Data (logs) | `~/.local/share/mydns-sync/` | `%APPDATA%\mydns-sync\` |
//!
//! # Environment Overrides
//!
//! - `MYDNS_SYNC_CONFIG_DIR` overrides [`config_dir`]
//! - `MYDNS_SYNC_DATA_DIR` overrides [`data_dir`]

use std::path::PathBuf;

const APP_DIR_NAME: &str = "mydns-sync";

/// Application config directory.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("MYDNS_SYNC_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| std::env::temp_dir().join("mydns-sync-config"))
}

/// Application data directory.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("MYDNS_SYNC_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| std::env::temp_dir().join("mydns-sync-data"))
}

/// Main config file path (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Log file directory (`data_dir()/logs/`).
#[must_use]
pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}
