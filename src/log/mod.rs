//! Settings Log Module
//!
//! Flat-file backend: the whole store is one length-prefixed record log,
//! rewritten through a swap file on every mutation.
//!
//! ## Responsibilities
//! - Record framing (key + length + payload)
//! - Linear scans with framing validation
//! - Copy-and-rename rewrites for Set/Add/Delete
//! - Truncating recovery of torn logs at open
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Record 1                                │
//! │ ┌──────────┬────────────┬─────────────┐ │
//! │ │ Key (2)  │ Length (2) │ Payload     │ │
//! │ └──────────┴────────────┴─────────────┘ │
//! ├─────────────────────────────────────────┤
//! │ Record 2                                │
//! │ ┌──────────┬────────────┬─────────────┐ │
//! │ │ Key (2)  │ Length (2) │ Payload     │ │
//! │ └──────────┴────────────┴─────────────┘ │
//! └─────────────────────────────────────────┘
//! ```
//! Little-endian, no padding, no checksum, no terminator. The file size
//! delimits the last record.
//!
//! ## Rewrite Protocol
//! 1. Create/truncate `<base>.Swap`
//! 2. Stream surviving records, then any new record
//! 3. fsync the swap file
//! 4. rename `<base>.Swap` over `<base>.data`
//! 5. Keep the swap file's handle as the new data handle

mod file;
mod reader;
mod record;
mod recovery;
mod swap;

use std::fs::OpenOptions;

pub use file::SettingsFile;
pub use reader::LogReader;
pub use record::{Record, RecordHeader, HEADER_SIZE, MAX_VALUE_LEN};
pub use recovery::{InitStatus, LogRecovery};
pub use swap::SwapFile;

/// Read/write/create options shared by the data and swap files
pub(crate) fn file_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.read(true).write(true).create(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options
}
