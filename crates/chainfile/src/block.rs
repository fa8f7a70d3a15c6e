//! Raw fixed-size block I/O over the hash file
//!
//! Addresses the file as an array of `record_size`-byte slots. Every call
//! seeks first; the file cursor position is not preserved across calls.

use crate::error::{ChainFileError, Result};
use crate::types::Rbn;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use tracing::trace;

/// Seek-and-transfer layer shared by the lifecycle and engine code.
#[derive(Debug)]
pub struct BlockFile {
    file: File,
    record_size: u32,
}

impl BlockFile {
    pub fn new(file: File, record_size: u32) -> Self {
        Self { file, record_size }
    }

    pub fn record_size(&self) -> u32 {
        self.record_size
    }

    /// Read exactly one record at `rbn`.
    ///
    /// Any short read, including a seek past the current end of file,
    /// reports `LocationNotFound`: the slot has never been written.
    pub fn read_record(&mut self, rbn: Rbn) -> Result<Vec<u8>> {
        let offset = rbn * u64::from(self.record_size);
        trace!("read rbn={rbn} offset={offset}");
        self.file.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; self.record_size as usize];
        if self.file.read_exact(&mut buf).is_err() {
            return Err(ChainFileError::LocationNotFound(rbn));
        }
        Ok(buf)
    }

    /// Write exactly one record at `rbn`, extending the file when the
    /// offset lies past the current end.
    pub fn write_record(&mut self, rbn: Rbn, record: &[u8]) -> Result<()> {
        debug_assert_eq!(record.len(), self.record_size as usize);
        let offset = rbn * u64::from(self.record_size);
        trace!("write rbn={rbn} offset={offset}");
        self.file.seek(SeekFrom::Start(offset))?;
        if self.file.write_all(record).is_err() {
            return Err(ChainFileError::LocationNotWritten(rbn));
        }
        Ok(())
    }
}
