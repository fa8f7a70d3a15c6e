//! Single-file fixed-record hash store with chained overflow
//!
//! This crate implements a direct-access file organization: a fixed-size
//! primary area of record slots addressed by a caller-supplied hash
//! function, with synonym collisions resolved by linking overflow
//! records into per-slot chains. All I/O is synchronous and blocking
//! against one open file; the handle assumes a single exclusive writer.
//!
//! The hash function itself is injected at [`HashFile::open`] as a pure
//! `(key, num_primary) → slot` strategy, so the engine stays independent
//! of any particular key-distribution scheme.

pub mod block;
pub mod error;
pub mod hash_file;
pub mod header;
pub mod record;
pub mod types;

pub use error::{ChainFileError, Result};
pub use hash_file::{HashFile, Records};
pub use header::{HashHeader, HEADER_RBN};
pub use record::{Record, MIN_RECORD_SIZE};
pub use types::{HashFn, Rbn, RecordKey, KEY_FIELD_SIZE};
