//! Fixed-width data record codec
//!
//! Every slot in the file is exactly `record_size` bytes. A data record
//! lays out as: the key field, the chain pointer, then opaque payload
//! bytes zero-padded to the slot width. The record's own RBN is implied
//! by its position and never stored.

use crate::error::{ChainFileError, Result};
use crate::types::{Rbn, RecordKey, KEY_FIELD_SIZE};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::num::NonZeroU64;

/// Byte offset of the chain pointer within a slot.
const CHAIN_OFFSET: usize = KEY_FIELD_SIZE;

/// Byte offset of the payload within a slot.
const PAYLOAD_OFFSET: usize = CHAIN_OFFSET + 8;

/// Smallest legal record size: key field plus chain pointer, no payload.
pub const MIN_RECORD_SIZE: u32 = PAYLOAD_OFFSET as u32;

/// One data record within a fixed-size slot.
///
/// The payload is opaque to the engine; it is copied, never inspected.
/// `next_chain` links synonym records into a per-slot chain; `None` marks
/// the chain tail and encodes as RBN 0 on disk (unambiguous, since RBN 0
/// holds the header).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: RecordKey,
    pub payload: Vec<u8>,
    pub next_chain: Option<NonZeroU64>,
}

impl Record {
    pub fn new(key: RecordKey, payload: Vec<u8>) -> Self {
        Self {
            key,
            payload,
            next_chain: None,
        }
    }

    /// RBN of the next synonym in this record's chain, or 0 at the tail.
    pub fn next_rbn(&self) -> Rbn {
        self.next_chain.map_or(0, NonZeroU64::get)
    }

    /// Encode into exactly `record_size` bytes.
    ///
    /// Fails with `PayloadTooLarge` rather than silently truncating a
    /// payload that does not fit the slot.
    pub fn encode(&self, record_size: u32) -> Result<Vec<u8>> {
        let record_size = record_size as usize;
        let room = record_size - PAYLOAD_OFFSET;
        if self.payload.len() > room {
            return Err(ChainFileError::PayloadTooLarge {
                len: self.payload.len(),
                room,
            });
        }
        let mut buf = Vec::with_capacity(record_size);
        buf.extend_from_slice(self.key.as_bytes());
        buf.write_u64::<LittleEndian>(self.next_rbn())?;
        buf.extend_from_slice(&self.payload);
        buf.resize(record_size, 0);
        Ok(buf)
    }

    /// Decode a full slot. The payload comes back as the fixed-width
    /// remainder of the slot, zero padding included.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < MIN_RECORD_SIZE as usize {
            return Err(ChainFileError::BadRecordSize(buf.len() as u32));
        }
        let mut field = [0u8; KEY_FIELD_SIZE];
        field.copy_from_slice(&buf[..KEY_FIELD_SIZE]);
        let mut cursor = &buf[CHAIN_OFFSET..];
        let next = cursor.read_u64::<LittleEndian>()?;
        Ok(Self {
            key: RecordKey::from_field(field),
            payload: buf[PAYLOAD_OFFSET..].to_vec(),
            next_chain: NonZeroU64::new(next),
        })
    }
}
