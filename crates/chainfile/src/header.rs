//! Header record stored at RBN 0
//!
//! The header occupies one full record slot so that every slot in the
//! file, header included, is uniformly addressable. Only the leading
//! fixed fields are meaningful; the rest of the slot is zero padding.

use crate::error::{ChainFileError, Result};
use crate::record::MIN_RECORD_SIZE;
use crate::types::Rbn;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

/// The header always lives at RBN 0.
pub const HEADER_RBN: Rbn = 0;

/// File-wide metadata persisted at RBN 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashHeader {
    num_primary: u64,
    record_size: u32,
    high_overflow_rbn: u64,
}

impl HashHeader {
    /// Width of the meaningful header fields.
    pub const FIXED_SIZE: usize = 20;

    /// Header for a freshly created file: the overflow high-water mark
    /// starts at `num_primary`, so the overflow area is empty.
    pub fn new(num_primary: u64, record_size: u32) -> Result<Self> {
        if record_size < MIN_RECORD_SIZE {
            return Err(ChainFileError::BadRecordSize(record_size));
        }
        Ok(Self {
            num_primary,
            record_size,
            high_overflow_rbn: num_primary,
        })
    }

    /// Number of primary-area slots, fixed at creation.
    pub fn num_primary(&self) -> u64 {
        self.num_primary
    }

    /// Size in bytes of every record slot, header included.
    pub fn record_size(&self) -> u32 {
        self.record_size
    }

    /// Highest RBN currently allocated in the overflow area.
    pub fn high_overflow_rbn(&self) -> Rbn {
        self.high_overflow_rbn
    }

    /// Allocate the next overflow slot and return its RBN. The caller is
    /// responsible for persisting the header before using the slot.
    pub(crate) fn bump_overflow(&mut self) -> Rbn {
        self.high_overflow_rbn += 1;
        self.high_overflow_rbn
    }

    /// Encode into exactly `record_size` bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.record_size as usize);
        buf.write_u64::<LittleEndian>(self.num_primary)?;
        buf.write_u32::<LittleEndian>(self.record_size)?;
        buf.write_u64::<LittleEndian>(self.high_overflow_rbn)?;
        buf.resize(self.record_size as usize, 0);
        Ok(buf)
    }

    /// Decode the header's fixed fields. A buffer too short to hold them
    /// means the header record is not there; a stored record size below
    /// the minimum layout width means the file was not written by this
    /// engine (or is damaged).
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let mut cursor = buf;
        let num_primary = cursor
            .read_u64::<LittleEndian>()
            .map_err(|_| ChainFileError::HeaderNotFound)?;
        let record_size = cursor
            .read_u32::<LittleEndian>()
            .map_err(|_| ChainFileError::HeaderNotFound)?;
        let high_overflow_rbn = cursor
            .read_u64::<LittleEndian>()
            .map_err(|_| ChainFileError::HeaderNotFound)?;
        if record_size < MIN_RECORD_SIZE {
            return Err(ChainFileError::BadRecordSize(record_size));
        }
        Ok(Self {
            num_primary,
            record_size,
            high_overflow_rbn,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fresh_header_round_trips() {
        let header = HashHeader::new(10, 64).unwrap();
        assert_eq!(header.high_overflow_rbn(), 10);

        let buf = header.encode().unwrap();
        assert_eq!(buf.len(), 64);
        assert_eq!(HashHeader::decode(&buf).unwrap(), header);
    }

    #[test]
    fn bump_allocates_sequential_rbns() {
        let mut header = HashHeader::new(10, 64).unwrap();
        assert_eq!(header.bump_overflow(), 11);
        assert_eq!(header.bump_overflow(), 12);
        assert_eq!(header.high_overflow_rbn(), 12);
    }

    #[test]
    fn undersized_record_size_is_rejected() {
        assert!(matches!(
            HashHeader::new(10, MIN_RECORD_SIZE - 1),
            Err(ChainFileError::BadRecordSize(_))
        ));

        let mut buf = HashHeader::new(10, 64).unwrap().encode().unwrap();
        buf[8..12].copy_from_slice(&4u32.to_le_bytes());
        assert!(matches!(
            HashHeader::decode(&buf),
            Err(ChainFileError::BadRecordSize(4))
        ));
    }

    #[test]
    fn short_buffer_reports_missing_header() {
        assert!(matches!(
            HashHeader::decode(&[0u8; 12]),
            Err(ChainFileError::HeaderNotFound)
        ));
    }
}
