//! Memory backend
//!
//! BTreeMap-based volatile store, used as a stand-in secure store and for
//! dry runs.

use std::collections::BTreeMap;

use bytes::Bytes;

use crate::error::{Result, SettingsError};
use crate::log::RecordHeader;

use super::{SettingsBackend, Target};

/// Volatile settings store
///
/// Values of a key keep the order they were added in. Nothing survives the
/// process.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    /// key → values, in insertion order
    data: BTreeMap<u16, Vec<Bytes>>,
}

impl MemoryBackend {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys holding at least one value
    pub fn key_count(&self) -> usize {
        self.data.len()
    }

    /// Total number of values across all keys
    pub fn value_count(&self) -> usize {
        self.data.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn check_len(key: u16, value: &[u8]) -> Result<Bytes> {
        // Same limit as the file backend
        RecordHeader::for_value(key, value)?;
        Ok(Bytes::copy_from_slice(value))
    }
}

impl SettingsBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn init(&mut self, _sensitive_keys: &[u16]) -> Result<()> {
        Ok(())
    }

    fn deinit(&mut self) -> Result<()> {
        Ok(())
    }

    fn get(&mut self, key: u16, index: usize, value: Option<&mut [u8]>) -> Result<u16> {
        let stored = self
            .data
            .get(&key)
            .and_then(|values| values.get(index))
            .ok_or(SettingsError::NotFound)?;

        if let Some(buf) = value {
            let count = buf.len().min(stored.len());
            buf[..count].copy_from_slice(&stored[..count]);
        }

        Ok(stored.len() as u16)
    }

    fn set(&mut self, key: u16, value: &[u8]) -> Result<()> {
        let value = Self::check_len(key, value)?;
        self.data.insert(key, vec![value]);
        Ok(())
    }

    fn add(&mut self, key: u16, value: &[u8]) -> Result<()> {
        let value = Self::check_len(key, value)?;
        self.data.entry(key).or_default().push(value);
        Ok(())
    }

    fn delete(&mut self, key: u16, target: Target) -> Result<()> {
        let values = self.data.get_mut(&key).ok_or(SettingsError::NotFound)?;

        match target {
            Target::All => {}
            Target::Index(index) if index < values.len() => {
                values.remove(index);
                if !values.is_empty() {
                    return Ok(());
                }
            }
            Target::Index(_) => return Err(SettingsError::NotFound),
        }

        self.data.remove(&key);
        Ok(())
    }

    fn wipe(&mut self) -> Result<()> {
        self.data.clear();
        Ok(())
    }
}
