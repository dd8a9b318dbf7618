//! Settings File
//!
//! The flat-file backend: Get/Set/Add/Delete/Wipe over the record log.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::backend::{SettingsBackend, Target};
use crate::config::Config;
use crate::error::{Result, SettingsError};

use super::file_options;
use super::reader::LogReader;
use super::record::{Record, RecordHeader};
use super::recovery::{InitStatus, LogRecovery};
use super::swap::SwapFile;

/// Settings store backed by one record log file
///
/// ## Lifecycle
/// - `new()` only computes paths; nothing touches the disk
/// - `load()` opens the log, validating (and if needed truncating) it
/// - `close()` releases the handle; operations then fail with `NotInitialized`
///
/// Every mutation rewrites the log through the swap file and is durable when
/// it returns. Reads scan the log from the start.
pub struct SettingsFile {
    /// Directory holding both files
    settings_dir: PathBuf,

    /// `<base>.data`
    data_path: PathBuf,

    /// `<base>.Swap`
    swap_path: PathBuf,

    /// Open handle on the data file, `None` outside load/close
    file: Option<File>,

    /// Outcome of the last `load()`
    status: Option<InitStatus>,
}

impl SettingsFile {
    /// Create an unopened store for the files named by `config`
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            settings_dir: config.settings_dir.clone(),
            data_path: config.data_path(),
            swap_path: config.swap_path(),
            file: None,
            status: None,
        })
    }

    /// Create and load in one step
    pub fn open(config: &Config) -> Result<Self> {
        let mut settings = Self::new(config)?;
        settings.load()?;
        Ok(settings)
    }

    /// Open the log, creating it if absent
    ///
    /// A log that ends mid-record is truncated to empty; this still succeeds
    /// and reports `InitStatus::Recovered`. A leftover swap file is removed.
    pub fn load(&mut self) -> Result<InitStatus> {
        self.close();

        fs::create_dir_all(&self.settings_dir)?;

        if LogRecovery::remove_orphan_swap(&self.swap_path)? {
            warn!(
                "Removed swap file left by an interrupted rewrite: {}",
                self.swap_path.display()
            );
        }

        let mut file = file_options().open(&self.data_path)?;
        let status = LogRecovery::recover(&mut file)?;

        match &status {
            InitStatus::Clean { records, bytes } => {
                info!(
                    "Opened settings log {}: {} records, {} bytes",
                    self.data_path.display(),
                    records,
                    bytes
                );
            }
            InitStatus::Recovered {
                discarded_bytes,
                reason,
            } => {
                warn!(
                    "Settings log {} was malformed ({}); truncated {} bytes",
                    self.data_path.display(),
                    reason,
                    discarded_bytes
                );
            }
        }

        self.file = Some(file);
        self.status = Some(status.clone());
        Ok(status)
    }

    /// Release the log handle
    pub fn close(&mut self) {
        if self.file.take().is_some() {
            debug!("Closed settings log {}", self.data_path.display());
        }
    }

    /// Outcome of the last `load()`, kept across `close()`
    pub fn init_status(&self) -> Option<&InitStatus> {
        self.status.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Look up the `index`-th value of `key`; see [`SettingsBackend::get`]
    pub fn get(&self, key: u16, index: usize, value: Option<&mut [u8]>) -> Result<u16> {
        let mut reader = LogReader::new(self.file()?)?;
        let mut remaining = index;

        while let Some(header) = reader.next_header()? {
            if header.key != key {
                continue;
            }
            if remaining > 0 {
                remaining -= 1;
                continue;
            }

            if let Some(buf) = value {
                reader.read_payload(buf)?;
            }
            return Ok(header.length);
        }

        Err(SettingsError::NotFound)
    }

    /// Replace all values of `key` with `value`, in a single rewrite
    pub fn set(&mut self, key: u16, value: &[u8]) -> Result<()> {
        let header = RecordHeader::for_value(key, value)?;

        self.rewrite("set", |reader, swap| {
            let removed = Self::copy_except(reader, swap, key, Target::All)?;
            swap.append(header, value)?;
            debug!("Set key {:#06x}: replaced {} values", key, removed);
            Ok(true)
        })?;
        Ok(())
    }

    /// Store one more value under `key`
    pub fn add(&mut self, key: u16, value: &[u8]) -> Result<()> {
        let header = RecordHeader::for_value(key, value)?;

        self.rewrite("add", |reader, swap| {
            reader.copy_rest(swap)?;
            swap.append(header, value)?;
            Ok(true)
        })?;
        Ok(())
    }

    /// Remove the selected value(s) of `key`
    pub fn delete(&mut self, key: u16, target: Target) -> Result<()> {
        let changed = self.rewrite("delete", |reader, swap| {
            Ok(Self::copy_except(reader, swap, key, target)? > 0)
        })?;

        if changed {
            Ok(())
        } else {
            Err(SettingsError::NotFound)
        }
    }

    /// Truncate the log in place
    pub fn wipe(&mut self) -> Result<()> {
        let file = self.file()?;
        file.set_len(0)?;
        file.sync_all()?;

        info!("Wiped settings log {}", self.data_path.display());
        Ok(())
    }

    /// Every record, in file order
    pub fn records(&self) -> Result<Vec<Record>> {
        let mut reader = LogReader::new(self.file()?)?;
        let mut records = Vec::new();

        while let Some(record) = reader.next_record()? {
            records.push(record);
        }

        Ok(records)
    }

    /// Current log size in bytes
    pub fn size(&self) -> Result<u64> {
        Ok(self.file()?.metadata()?.len())
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn swap_path(&self) -> &Path {
        &self.swap_path
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn file(&self) -> Result<&File> {
        self.file.as_ref().ok_or(SettingsError::NotInitialized)
    }

    /// Run one rewrite of the log through the swap file
    ///
    /// `fill` streams the new content into the swap file and reports whether
    /// anything changed. Unchanged or failed rewrites discard the swap file and
    /// leave the data file untouched; changed ones are committed and the store
    /// switches to the new handle.
    fn rewrite<F>(&mut self, op: &str, fill: F) -> Result<bool>
    where
        F: FnOnce(&mut LogReader<&File>, &mut SwapFile) -> Result<bool>,
    {
        let file = self.file()?;
        let mut swap = SwapFile::create(&self.swap_path)?;
        let mut reader = LogReader::new(file)?;

        let changed = match fill(&mut reader, &mut swap) {
            Ok(changed) => changed,
            Err(e) => {
                if let Err(discard_err) = swap.discard() {
                    warn!("Failed to discard swap file after {} error: {}", op, discard_err);
                }
                return Err(e);
            }
        };
        drop(reader);

        if !changed {
            swap.discard()?;
            return Ok(false);
        }

        let new_file = swap.commit(&self.data_path)?;
        debug!(
            "Committed {} to {}: {} bytes",
            op,
            self.data_path.display(),
            new_file.metadata()?.len()
        );

        self.file = Some(new_file);
        Ok(true)
    }

    /// Copy every record not selected by `(key, target)` into `swap`
    ///
    /// Returns the number of records left out.
    fn copy_except(
        reader: &mut LogReader<&File>,
        swap: &mut SwapFile,
        key: u16,
        target: Target,
    ) -> Result<usize> {
        let mut seen = 0;
        let mut removed = 0;

        while let Some(header) = reader.next_header()? {
            if header.key == key {
                match target {
                    Target::All => {
                        removed += 1;
                        continue;
                    }
                    Target::Index(index) if index == seen => {
                        reader.skip_payload()?;
                        reader.copy_rest(swap)?;
                        return Ok(1);
                    }
                    Target::Index(_) => seen += 1,
                }
            }

            header.write_to(swap).map_err(SettingsError::from_write)?;
            reader.copy_payload(swap)?;
        }

        Ok(removed)
    }
}

impl SettingsBackend for SettingsFile {
    fn name(&self) -> &'static str {
        "file"
    }

    fn init(&mut self, _sensitive_keys: &[u16]) -> Result<()> {
        self.load().map(|_| ())
    }

    fn deinit(&mut self) -> Result<()> {
        self.close();
        Ok(())
    }

    fn init_status(&self) -> Option<&InitStatus> {
        SettingsFile::init_status(self)
    }

    fn get(&mut self, key: u16, index: usize, value: Option<&mut [u8]>) -> Result<u16> {
        SettingsFile::get(self, key, index, value)
    }

    fn set(&mut self, key: u16, value: &[u8]) -> Result<()> {
        SettingsFile::set(self, key, value)
    }

    fn add(&mut self, key: u16, value: &[u8]) -> Result<()> {
        SettingsFile::add(self, key, value)
    }

    fn delete(&mut self, key: u16, target: Target) -> Result<()> {
        SettingsFile::delete(self, key, target)
    }

    fn wipe(&mut self) -> Result<()> {
        SettingsFile::wipe(self)
    }
}
