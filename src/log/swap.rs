//! Swap File
//!
//! Staging file for copy-and-rename rewrites of the record log.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{Result, SettingsError};

use super::file_options;
use super::record::RecordHeader;

/// A rewrite in progress
///
/// Everything written lands in `<base>.Swap`. `commit()` makes it the new
/// data file in one rename; `discard()` (or dropping an uncommitted swap)
/// unlinks it and leaves the data file untouched.
pub struct SwapFile {
    /// Swap file path
    path: PathBuf,
    /// Buffered writer, `None` once the file has been handed off or closed
    writer: Option<BufWriter<File>>,
    /// Set once the swap file no longer needs cleaning up
    finished: bool,
}

impl SwapFile {
    /// Create (or truncate) the swap file
    pub fn create(path: &Path) -> Result<Self> {
        let file = file_options().truncate(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: Some(BufWriter::new(file)),
            finished: false,
        })
    }

    /// Append one complete record
    pub fn append(&mut self, header: RecordHeader, value: &[u8]) -> Result<()> {
        debug_assert_eq!(header.length as usize, value.len());

        header.write_to(self).map_err(SettingsError::from_write)?;
        self.write_all(value).map_err(SettingsError::from_write)?;
        Ok(())
    }

    /// Persist the staged content and atomically replace `target` with it
    ///
    /// Returns the swap file's handle, which now backs `target`.
    pub fn commit(mut self, target: &Path) -> Result<File> {
        let writer = self.writer.take().ok_or_else(closed)?;
        let file = writer
            .into_inner()
            .map_err(|e| SettingsError::from_write(e.into_error()))?;

        file.sync_all()?;
        fs::rename(&self.path, target)?;
        self.finished = true;

        // The rename already happened; the handle must reach the caller.
        if let Err(e) = sync_parent_dir(target) {
            warn!("Failed to sync directory of {}: {}", target.display(), e);
        }
        Ok(file)
    }

    /// Close and unlink the swap file
    pub fn discard(mut self) -> Result<()> {
        drop(self.writer.take());
        self.finished = true;
        fs::remove_file(&self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Write for SwapFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.as_mut().ok_or_else(closed)?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.as_mut().ok_or_else(closed)?.flush()
    }
}

impl Drop for SwapFile {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        drop(self.writer.take());
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("Failed to remove swap file {}: {}", self.path.display(), e);
            }
        }
    }
}

fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "swap file already closed")
}

/// Make a completed rename durable
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}
