//! Record framing
//!
//! Encoding of the fixed 4-byte record header.

use std::io::{self, Write};

use crate::error::{Result, SettingsError};

/// Header size: Key (2) + Length (2) = 4 bytes
pub const HEADER_SIZE: u64 = 4;

/// Largest payload a record can frame
pub const MAX_VALUE_LEN: usize = u16::MAX as usize;

/// The fixed part of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Setting key
    pub key: u16,
    /// Payload length in bytes
    pub length: u16,
}

impl RecordHeader {
    pub fn new(key: u16, length: u16) -> Self {
        Self { key, length }
    }

    /// Header for storing `value` under `key`.
    ///
    /// Fails with `NoBufs` when the value cannot be framed.
    pub fn for_value(key: u16, value: &[u8]) -> Result<Self> {
        let length = u16::try_from(value.len()).map_err(|_| {
            SettingsError::NoBufs(format!(
                "value of {} bytes exceeds the {} byte record limit",
                value.len(),
                MAX_VALUE_LEN
            ))
        })?;
        Ok(Self::new(key, length))
    }

    pub fn encode(&self) -> [u8; HEADER_SIZE as usize] {
        let mut bytes = [0u8; HEADER_SIZE as usize];
        bytes[0..2].copy_from_slice(&self.key.to_le_bytes());
        bytes[2..4].copy_from_slice(&self.length.to_le_bytes());
        bytes
    }

    pub fn decode(bytes: [u8; HEADER_SIZE as usize]) -> Self {
        Self {
            key: u16::from_le_bytes([bytes[0], bytes[1]]),
            length: u16::from_le_bytes([bytes[2], bytes[3]]),
        }
    }

    /// Size of the whole record on disk (header + payload)
    pub fn record_size(&self) -> u64 {
        HEADER_SIZE + self.length as u64
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.encode())
    }
}

/// A complete record, as returned by log dumps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: u16,
    pub value: Vec<u8>,
}

impl Record {
    pub fn new(key: u16, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }

    pub fn header(&self) -> Result<RecordHeader> {
        RecordHeader::for_value(self.key, &self.value)
    }

    /// Encode to the on-disk byte layout
    pub fn encode(&self) -> Result<Vec<u8>> {
        let header = self.header()?;
        let mut bytes = Vec::with_capacity(header.record_size() as usize);
        bytes.extend_from_slice(&header.encode());
        bytes.extend_from_slice(&self.value);
        Ok(bytes)
    }
}
