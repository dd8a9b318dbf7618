//! Configuration for tinysettings
//!
//! Centralized configuration with sensible defaults.

use std::path::{Path, PathBuf};

use crate::error::{Result, SettingsError};

/// Longest accepted file base name (bytes)
pub const MAX_BASE_NAME_LEN: usize = 64;

/// Environment variable that namespaces simulated nodes sharing one host
pub const PORT_OFFSET_ENV: &str = "PORT_OFFSET";

/// Main configuration for a settings store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding the backing files
    /// Internal structure:
    ///   {settings_dir}/
    ///     ├── {base_name}.data   (the record log)
    ///     └── {base_name}.Swap   (only present mid-rewrite or after a crash)
    pub settings_dir: PathBuf,

    /// Stem of the backing file names
    pub base_name: String,

    // -------------------------------------------------------------------------
    // Backend Selection
    // -------------------------------------------------------------------------
    /// Backend serving normal keys
    pub backend: BackendKind,

    /// Backend serving sensitive keys (None = sensitive keys stay on `backend`)
    pub secure_backend: Option<BackendKind>,

    /// Keys routed to the secure backend
    pub sensitive_keys: Vec<u16>,
}

/// Available storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Flat-file record log on the host filesystem
    File,

    /// Volatile in-process store
    Memory,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settings_dir: PathBuf::from("./tmp"),
            base_name: "settings".to_string(),
            backend: BackendKind::File,
            secure_backend: None,
            sensitive_keys: Vec::new(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Base name for a node: `"<PORT_OFFSET>_<node id in hex>"`.
    ///
    /// `PORT_OFFSET` defaults to `"0"` when unset.
    pub fn node_base_name(node_id: u64) -> String {
        let offset = std::env::var(PORT_OFFSET_ENV).unwrap_or_else(|_| "0".to_string());
        format!("{}_{:x}", offset, node_id)
    }

    /// Path of the record log
    pub fn data_path(&self) -> PathBuf {
        Self::file_path(&self.settings_dir, &self.base_name, "data")
    }

    /// Path of the transient swap file
    pub fn swap_path(&self) -> PathBuf {
        Self::file_path(&self.settings_dir, &self.base_name, "Swap")
    }

    /// Config for the file backing the secure store, when it is file-based
    pub fn secure_config(&self) -> Config {
        let mut config = self.clone();
        config.base_name = format!("{}_secure", self.base_name);
        config.backend = self.secure_backend.unwrap_or(self.backend);
        config.secure_backend = None;
        config
    }

    /// Check the base name can be turned into file names
    pub fn validate(&self) -> Result<()> {
        if self.base_name.is_empty() {
            return Err(SettingsError::Config("base name is empty".to_string()));
        }
        if self.base_name.len() >= MAX_BASE_NAME_LEN {
            return Err(SettingsError::Config(format!(
                "base name is {} bytes (max {})",
                self.base_name.len(),
                MAX_BASE_NAME_LEN - 1
            )));
        }
        if self.base_name.contains(|c| c == '/' || c == '\\')
            || matches!(self.base_name.as_str(), "." | "..")
        {
            return Err(SettingsError::Config(format!(
                "base name {:?} is not a plain file name",
                self.base_name
            )));
        }
        Ok(())
    }

    fn file_path(dir: &Path, base_name: &str, extension: &str) -> PathBuf {
        dir.join(format!("{}.{}", base_name, extension))
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the directory holding the backing files
    pub fn settings_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.settings_dir = path.into();
        self
    }

    /// Set the file base name
    pub fn base_name(mut self, name: impl Into<String>) -> Self {
        self.config.base_name = name.into();
        self
    }

    /// Select the backend for normal keys
    pub fn backend(mut self, kind: BackendKind) -> Self {
        self.config.backend = kind;
        self
    }

    /// Select a separate backend for sensitive keys
    pub fn secure_backend(mut self, kind: BackendKind) -> Self {
        self.config.secure_backend = Some(kind);
        self
    }

    /// Set the keys routed to the secure backend
    pub fn sensitive_keys(mut self, keys: impl IntoIterator<Item = u16>) -> Self {
        self.config.sensitive_keys = keys.into_iter().collect();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
