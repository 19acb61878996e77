//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A read asked for bytes the log does not hold.
    ///
    /// Reads are all-or-nothing, so a short read surfaces as this error.
    #[error("read beyond end of log: offset {offset}, len {len}, size {size}")]
    ReadPastEnd {
        /// The requested read offset.
        offset: u64,
        /// The requested read length.
        len: usize,
        /// The current log size.
        size: u64,
    },
}

impl StorageError {
    /// Returns true if this error means fewer bytes were available than requested.
    #[must_use]
    pub fn is_short_read(&self) -> bool {
        match self {
            Self::ReadPastEnd { .. } => true,
            Self::Io(err) => err.kind() == io::ErrorKind::UnexpectedEof,
        }
    }
}
