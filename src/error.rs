//! Error types for tinysettings
//!
//! Provides a unified error type for all backends and the dispatch layer.
//!
//! Errors fall into two tiers:
//! - **Recoverable**: `NotFound`, `NoBufs`, `Parse`, `Config`
//! - **Fatal**: `Io`, `Corrupt`, `NotInitialized`
//!
//! Use [`SettingsError::is_fatal`] to pick a policy (halt, restart, ...).

use std::io;

use thiserror::Error;

/// Result type alias using SettingsError
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Unified error type for settings operations
#[derive(Debug, Error)]
pub enum SettingsError {
    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Setting not found")]
    NotFound,

    // -------------------------------------------------------------------------
    // Capacity Errors
    // -------------------------------------------------------------------------
    #[error("No space to store setting: {0}")]
    NoBufs(String),

    // -------------------------------------------------------------------------
    // Log Framing Errors
    // -------------------------------------------------------------------------
    /// Malformed log found while opening; the log was truncated
    #[error("Settings log parse error: {0}")]
    Parse(String),

    /// Malformed log found after a successful open
    #[error("Settings log corrupted: {0}")]
    Corrupt(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // -------------------------------------------------------------------------
    // Lifecycle / Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Settings store used before init or after deinit")]
    NotInitialized,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SettingsError {
    /// Whether the error means the store can no longer be trusted.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SettingsError::Io(_) | SettingsError::Corrupt(_) | SettingsError::NotInitialized
        )
    }

    /// Classify an error raised while writing a rewrite or an append.
    pub(crate) fn from_write(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::StorageFull {
            SettingsError::NoBufs(err.to_string())
        } else {
            SettingsError::Io(err)
        }
    }
}
