//! Common types used throughout the hash file engine

use crate::error::{ChainFileError, Result};
use std::fmt;

/// Width in bytes of the fixed key field inside every record slot.
pub const KEY_FIELD_SIZE: usize = 12;

/// Relative block number: zero-based index of a fixed-size record slot
/// within the file. Byte offset = RBN × record size.
pub type Rbn = u64;

/// Key → primary slot function supplied by the calling layer.
///
/// Must be a pure function of its inputs and return a slot in
/// `1..=num_primary`. The engine never computes slots itself.
pub type HashFn = fn(key: &RecordKey, num_primary: u64) -> Rbn;

/// Fixed-width record key, NUL-padded ASCII.
///
/// The all-zero field is the "slot unused" sentinel; it can only arise
/// from decoding an empty slot, never from [`RecordKey::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordKey([u8; KEY_FIELD_SIZE]);

impl RecordKey {
    /// Build a key from a string, NUL-padding it to the field width.
    ///
    /// The key must be non-empty, free of NUL bytes, and at most
    /// `KEY_FIELD_SIZE - 1` bytes long.
    pub fn new(key: &str) -> Result<Self> {
        if key.is_empty() {
            return Err(ChainFileError::InvalidKey("key is empty".to_string()));
        }
        let bytes = key.as_bytes();
        if bytes.len() >= KEY_FIELD_SIZE {
            return Err(ChainFileError::InvalidKey(format!(
                "key {key:?} exceeds {} bytes",
                KEY_FIELD_SIZE - 1
            )));
        }
        if bytes.contains(&0) {
            return Err(ChainFileError::InvalidKey(format!(
                "key {key:?} contains a NUL byte"
            )));
        }
        let mut field = [0u8; KEY_FIELD_SIZE];
        field[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(field))
    }

    /// Wrap a raw key field read from disk, sentinel included.
    pub(crate) fn from_field(field: [u8; KEY_FIELD_SIZE]) -> Self {
        Self(field)
    }

    /// Whether this is the "slot unused" sentinel.
    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }

    pub fn as_bytes(&self) -> &[u8; KEY_FIELD_SIZE] {
        &self.0
    }

    /// The key text up to the first NUL pad byte.
    pub fn as_str(&self) -> &str {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(KEY_FIELD_SIZE);
        std::str::from_utf8(&self.0[..end]).unwrap_or("")
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
