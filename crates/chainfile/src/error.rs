//! Error types for hash file operations

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainFileError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("File already exists: {0}")]
    FileExists(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Header record not found")]
    HeaderNotFound,

    #[error("Record already exists for key {0}")]
    RecordExists(String),

    #[error("Record not found for key {0}")]
    RecordNotFound(String),

    #[error("Location not found for RBN {0}")]
    LocationNotFound(u64),

    #[error("Location not written for RBN {0}")]
    LocationNotWritten(u64),

    #[error("Invalid record size: {0}")]
    BadRecordSize(u32),

    #[error("Payload of {len} bytes exceeds record capacity of {room}")]
    PayloadTooLarge { len: usize, room: usize },

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Operation not implemented: {0}")]
    NotImplemented(&'static str),
}

pub type Result<T> = std::result::Result<T, ChainFileError>;
