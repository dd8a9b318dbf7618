//! Backend Module
//!
//! The contract every settings store implements, and the in-memory backend.
//!
//! ## Contract
//! - `init` / `deinit` bracket the backend's lifetime
//! - `get` reads the `index`-th value stored under a key
//! - `set` replaces every value of a key with one value
//! - `add` stores one more value under a key
//! - `delete` removes one value, or all values, of a key
//! - `wipe` removes everything
//!
//! Keys may hold several values. Their relative order is not part of the
//! contract: any write may reorder them, so indices must not be cached
//! across mutating calls.

mod memory;

pub use memory::MemoryBackend;

use crate::error::{Result, SettingsError};
use crate::log::InitStatus;

/// Well-known setting keys
pub mod keys {
    /// Active operational dataset
    pub const ACTIVE_DATASET: u16 = 0x0001;

    /// Pending operational dataset
    pub const PENDING_DATASET: u16 = 0x0002;

    /// Network information
    pub const NETWORK_INFO: u16 = 0x0003;

    /// First key reserved for vendor-specific use
    pub const VENDOR_RESERVED_MIN: u16 = 0x8000;

    /// Last key reserved for vendor-specific use
    pub const VENDOR_RESERVED_MAX: u16 = 0xffff;

    /// Whether `key` lies in the vendor-reserved range
    pub fn is_vendor(key: u16) -> bool {
        (VENDOR_RESERVED_MIN..=VENDOR_RESERVED_MAX).contains(&key)
    }
}

/// Which values of a key a delete removes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The value at this position among the key's values
    Index(usize),

    /// Every value of the key
    All,
}

impl Target {
    /// Map the C-style convention where `-1` means "all values"
    pub fn from_raw(index: i32) -> Result<Self> {
        match index {
            -1 => Ok(Target::All),
            i if i >= 0 => Ok(Target::Index(i as usize)),
            i => Err(SettingsError::Config(format!("invalid value index {}", i))),
        }
    }
}

impl From<usize> for Target {
    fn from(index: usize) -> Self {
        Target::Index(index)
    }
}

/// A persistent (or volatile) settings store
///
/// Implementations are single-threaded; callers serialize access.
pub trait SettingsBackend {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Prepare the backend. Calling it again re-initializes.
    fn init(&mut self, sensitive_keys: &[u16]) -> Result<()>;

    /// Release the backend's resources
    fn deinit(&mut self) -> Result<()>;

    /// What the last `init` found in persistent storage
    ///
    /// `None` for volatile backends and before the first `init`.
    fn init_status(&self) -> Option<&InitStatus> {
        None
    }

    /// Look up the `index`-th value of `key`
    ///
    /// Returns the stored length. With `Some(buf)`, the first
    /// `min(length, buf.len())` bytes of the value are copied into `buf` and
    /// the rest of `buf` is left untouched. With `None` only existence and
    /// length are checked.
    ///
    /// Returns `Err(NotFound)` if the key has fewer than `index + 1` values.
    fn get(&mut self, key: u16, index: usize, value: Option<&mut [u8]>) -> Result<u16>;

    /// Replace all values of `key` with `value`
    fn set(&mut self, key: u16, value: &[u8]) -> Result<()>;

    /// Store one more value under `key`
    fn add(&mut self, key: u16, value: &[u8]) -> Result<()>;

    /// Remove the selected value(s) of `key`
    ///
    /// Returns `Err(NotFound)` if nothing matched.
    fn delete(&mut self, key: u16, target: Target) -> Result<()>;

    /// Remove every setting
    fn wipe(&mut self) -> Result<()>;

    /// Whether the `index`-th value of `key` exists
    fn contains(&mut self, key: u16, index: usize) -> Result<bool> {
        match self.get(key, index, None) {
            Ok(_) => Ok(true),
            Err(SettingsError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Read the whole `index`-th value of `key`
    fn get_value(&mut self, key: u16, index: usize) -> Result<Vec<u8>> {
        let length = self.get(key, index, None)?;
        let mut value = vec![0u8; length as usize];
        self.get(key, index, Some(&mut value))?;
        Ok(value)
    }

    /// Read every value of `key`, in index order
    fn get_all(&mut self, key: u16) -> Result<Vec<Vec<u8>>> {
        let mut values = Vec::new();
        loop {
            match self.get_value(key, values.len()) {
                Ok(value) => values.push(value),
                Err(SettingsError::NotFound) => return Ok(values),
                Err(e) => return Err(e),
            }
        }
    }
}
