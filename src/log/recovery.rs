//! Log Recovery
//!
//! Validates the record log at open and recovers torn logs.

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{Result, SettingsError};

use super::reader::LogReader;

/// Handles validation and recovery of the record log at open
pub struct LogRecovery;

/// Outcome of opening a record log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitStatus {
    /// The log was well framed and kept as is
    Clean {
        /// Number of records in the log
        records: u64,
        /// Log size in bytes
        bytes: u64,
    },

    /// The log ended mid-record and was truncated to empty
    Recovered {
        /// Bytes thrown away
        discarded_bytes: u64,
        /// What was wrong with the log
        reason: String,
    },
}

impl InitStatus {
    pub fn was_recovered(&self) -> bool {
        matches!(self, InitStatus::Recovered { .. })
    }

    /// The parse failure behind a recovery, for callers that log it
    pub fn parse_error(&self) -> Option<SettingsError> {
        match self {
            InitStatus::Clean { .. } => None,
            InitStatus::Recovered { reason, .. } => Some(SettingsError::Parse(reason.clone())),
        }
    }
}

impl LogRecovery {
    /// Verify the framing of a log without modifying it
    ///
    /// Returns the number of records, or `Err(Corrupt)` if the log ends
    /// mid-record.
    pub fn verify<R: Read + Seek>(log: R) -> Result<u64> {
        let mut reader = LogReader::new(log)?;
        let mut records = 0;

        while reader.next_header()?.is_some() {
            records += 1;
        }

        Ok(records)
    }

    /// Validate an open data file, truncating it to empty if it is torn
    ///
    /// Only framing problems are recovered; I/O errors are returned as is.
    pub fn recover(file: &mut File) -> Result<InitStatus> {
        let bytes = file.seek(SeekFrom::End(0))?;

        let status = match Self::verify(&*file) {
            Ok(records) => InitStatus::Clean { records, bytes },
            Err(SettingsError::Corrupt(reason)) => {
                file.set_len(0)?;
                file.sync_all()?;
                InitStatus::Recovered {
                    discarded_bytes: bytes,
                    reason,
                }
            }
            Err(e) => return Err(e),
        };

        file.seek(SeekFrom::Start(0))?;
        Ok(status)
    }

    /// Remove a swap file left behind by an interrupted rewrite
    ///
    /// Returns whether a file was removed.
    pub fn remove_orphan_swap(path: &Path) -> Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
