//! Log Reader
//!
//! Sequential scan over the record log with framing validation.

use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};

use crate::error::{Result, SettingsError};

use super::record::{Record, RecordHeader, HEADER_SIZE};

/// Forward-only reader over a record log
///
/// `next_header()` validates each header against the bytes left in the log,
/// so a record is only handed out if its payload is fully present. The
/// payload of the current record can then be read, copied, or skipped; any
/// part left unconsumed is skipped by the next `next_header()` call.
pub struct LogReader<R> {
    inner: BufReader<R>,
    /// Total log size, captured at construction
    size: u64,
    /// Current position in the log
    offset: u64,
    /// Payload bytes of the current record not yet consumed
    pending: u64,
}

impl<R: Read + Seek> LogReader<R> {
    /// Start a scan at offset 0
    pub fn new(mut inner: R) -> Result<Self> {
        let size = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;

        Ok(Self {
            inner: BufReader::new(inner),
            size,
            offset: 0,
            pending: 0,
        })
    }

    /// Total size of the log in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Current position in the log
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read the next record header
    ///
    /// Returns:
    /// - `Ok(Some(header))`: a record whose payload is fully present
    /// - `Ok(None)`: clean end of log
    /// - `Err(Corrupt)`: the log ends mid-record
    pub fn next_header(&mut self) -> Result<Option<RecordHeader>> {
        self.skip_payload()?;

        if self.offset >= self.size {
            return Ok(None);
        }

        let remaining = self.size - self.offset;
        if remaining < HEADER_SIZE {
            return Err(SettingsError::Corrupt(format!(
                "truncated record header at offset {}: {} bytes left",
                self.offset, remaining
            )));
        }

        let mut bytes = [0u8; HEADER_SIZE as usize];
        self.inner
            .read_exact(&mut bytes)
            .map_err(|e| self.read_error(e))?;
        let header = RecordHeader::decode(bytes);

        if header.record_size() > remaining {
            return Err(SettingsError::Corrupt(format!(
                "record for key {:#06x} at offset {} declares {} payload bytes, only {} remain",
                header.key,
                self.offset,
                header.length,
                remaining - HEADER_SIZE
            )));
        }

        self.offset += HEADER_SIZE;
        self.pending = header.length as u64;
        Ok(Some(header))
    }

    /// Read the start of the current payload into `buf`
    ///
    /// Copies `min(buf.len(), remaining payload)` bytes and returns that count.
    /// Bytes of `buf` beyond the count are left untouched.
    pub fn read_payload(&mut self, buf: &mut [u8]) -> Result<usize> {
        let count = buf.len().min(self.pending as usize);
        self.inner
            .read_exact(&mut buf[..count])
            .map_err(|e| self.read_error(e))?;

        self.offset += count as u64;
        self.pending -= count as u64;
        Ok(count)
    }

    /// Skip whatever is left of the current payload
    pub fn skip_payload(&mut self) -> Result<()> {
        if self.pending > 0 {
            self.inner.seek_relative(self.pending as i64)?;
            self.offset += self.pending;
            self.pending = 0;
        }
        Ok(())
    }

    /// Copy whatever is left of the current payload into `writer`
    pub fn copy_payload<W: Write>(&mut self, writer: &mut W) -> Result<()> {
        let count = self.pending;
        self.copy_exact(count, writer)?;
        self.pending = 0;
        Ok(())
    }

    /// Copy the rest of the log verbatim, starting at the current position
    pub fn copy_rest<W: Write>(&mut self, writer: &mut W) -> Result<()> {
        let count = self.size - self.offset;
        self.copy_exact(count, writer)?;
        self.pending = 0;
        Ok(())
    }

    /// Read the next complete record
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        let header = match self.next_header()? {
            Some(header) => header,
            None => return Ok(None),
        };

        let mut value = vec![0u8; header.length as usize];
        self.read_payload(&mut value)?;
        Ok(Some(Record::new(header.key, value)))
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn copy_exact<W: Write>(&mut self, count: u64, writer: &mut W) -> Result<()> {
        let copied = io::copy(&mut self.inner.by_ref().take(count), writer)
            .map_err(SettingsError::from_write)?;
        self.offset += copied;

        if copied != count {
            return Err(SettingsError::Corrupt(format!(
                "log shrank during copy: {} of {} bytes read at offset {}",
                copied, count, self.offset
            )));
        }
        Ok(())
    }

    /// A short read means the log changed under us, which is corruption
    fn read_error(&self, err: io::Error) -> SettingsError {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            SettingsError::Corrupt(format!("unexpected end of log near offset {}", self.offset))
        } else {
            SettingsError::Io(err)
        }
    }
}
