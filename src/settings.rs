//! Settings Module
//!
//! The dispatch layer in front of the storage backends.
//!
//! ## Responsibilities
//! - Build backends from configuration
//! - Route sensitive keys to the secure backend, everything else to the
//!   primary backend
//! - Fan lifecycle calls and wipes out to every backend
//! - Execute parsed commands

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::backend::{MemoryBackend, SettingsBackend, Target};
use crate::command::{Command, Outcome};
use crate::config::{BackendKind, Config};
use crate::error::Result;
use crate::log::{InitStatus, SettingsFile};

/// Key-routing front end over one or two backends
///
/// Without a secure backend, sensitive keys are stored on the primary backend
/// like any other key.
pub struct Settings {
    /// Backend for normal keys
    primary: Box<dyn SettingsBackend>,

    /// Backend for sensitive keys
    secure: Option<Box<dyn SettingsBackend>>,

    /// Keys routed to `secure`, as passed to `init`
    sensitive_keys: BTreeSet<u16>,
}

impl Settings {
    /// Wrap an uninitialized primary backend
    pub fn new(primary: Box<dyn SettingsBackend>) -> Self {
        Self {
            primary,
            secure: None,
            sensitive_keys: BTreeSet::new(),
        }
    }

    /// Route sensitive keys to `secure`
    pub fn with_secure(mut self, secure: Box<dyn SettingsBackend>) -> Self {
        self.secure = Some(secure);
        self
    }

    /// Build the configured backends and initialize them
    pub fn open(config: &Config) -> Result<Self> {
        let mut settings = Self::new(Self::build_backend(config.backend, config)?);

        if let Some(kind) = config.secure_backend {
            settings = settings.with_secure(Self::build_backend(kind, &config.secure_config())?);
        }

        settings.init(&config.sensitive_keys)?;
        Ok(settings)
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers
    pub fn execute(&mut self, command: Command) -> Result<Outcome> {
        debug!("Executing {:?}", command.command_type());

        match command {
            Command::Get { key, index } => self.get_value(key, index).map(Outcome::Value),
            Command::Set { key, value } => {
                self.set(key, &value)?;
                Ok(Outcome::Done)
            }
            Command::Add { key, value } => {
                self.add(key, &value)?;
                Ok(Outcome::Done)
            }
            Command::Delete { key, target } => {
                self.delete(key, target)?;
                Ok(Outcome::Done)
            }
            Command::Wipe => {
                self.wipe()?;
                Ok(Outcome::Done)
            }
        }
    }

    /// Keys routed to the secure backend
    pub fn sensitive_keys(&self) -> impl Iterator<Item = u16> + '_ {
        self.sensitive_keys.iter().copied()
    }

    pub fn is_sensitive(&self, key: u16) -> bool {
        self.sensitive_keys.contains(&key)
    }

    pub fn has_secure_backend(&self) -> bool {
        self.secure.is_some()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn build_backend(kind: BackendKind, config: &Config) -> Result<Box<dyn SettingsBackend>> {
        Ok(match kind {
            BackendKind::File => Box::new(SettingsFile::new(config)?),
            BackendKind::Memory => Box::new(MemoryBackend::new()),
        })
    }

    /// The backend owning `key`
    fn route(&mut self, key: u16) -> &mut dyn SettingsBackend {
        match self.secure.as_mut() {
            Some(secure) if self.sensitive_keys.contains(&key) => secure.as_mut(),
            _ => self.primary.as_mut(),
        }
    }
}

impl SettingsBackend for Settings {
    fn name(&self) -> &'static str {
        "settings"
    }

    fn init(&mut self, sensitive_keys: &[u16]) -> Result<()> {
        self.sensitive_keys = sensitive_keys.iter().copied().collect();

        self.primary.init(sensitive_keys)?;
        if let Some(secure) = self.secure.as_mut() {
            secure.init(sensitive_keys)?;
        }

        info!(
            "Settings initialized: primary={}, secure={}, {} sensitive keys",
            self.primary.name(),
            self.secure.as_ref().map_or("none", |s| s.name()),
            self.sensitive_keys.len()
        );
        Ok(())
    }

    /// Reports the primary backend
    fn init_status(&self) -> Option<&InitStatus> {
        self.primary.init_status()
    }

    fn deinit(&mut self) -> Result<()> {
        if let Some(secure) = self.secure.as_mut() {
            secure.deinit()?;
        }
        self.primary.deinit()
    }

    fn get(&mut self, key: u16, index: usize, value: Option<&mut [u8]>) -> Result<u16> {
        self.route(key).get(key, index, value)
    }

    fn set(&mut self, key: u16, value: &[u8]) -> Result<()> {
        self.route(key).set(key, value)
    }

    fn add(&mut self, key: u16, value: &[u8]) -> Result<()> {
        self.route(key).add(key, value)
    }

    fn delete(&mut self, key: u16, target: Target) -> Result<()> {
        self.route(key).delete(key, target)
    }

    fn wipe(&mut self) -> Result<()> {
        if let Some(secure) = self.secure.as_mut() {
            secure.wipe()?;
        }
        self.primary.wipe()
    }
}
