//! Error types for WiredKV core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Error reported by a plugged-in compressor or encryptor.
pub type CapabilityError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while building, transforming, encoding or decoding segments.
///
/// Each pipeline stage has its own variant so a caller can tell which stage
/// failed without parsing messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The transformer was given an invalid configuration.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the problem.
        message: String,
    },

    /// The value is not one of the supported value types.
    #[error("unsupported data type: {type_name}")]
    UnsupportedType {
        /// Rust type name of the rejected value.
        type_name: &'static str,
    },

    /// Turning a value into canonical bytes failed.
    #[error("serialize failed: {message}")]
    Serialization {
        /// Description of the failure.
        message: String,
    },

    /// Turning canonical bytes back into a value failed.
    #[error("deserialize failed: {message}")]
    Deserialization {
        /// Description of the failure.
        message: String,
    },

    /// The bound compressor failed.
    #[error("failed to compress data: {source}")]
    Compression {
        /// Error reported by the compressor.
        #[source]
        source: CapabilityError,
    },

    /// The bound compressor failed to decompress.
    #[error("failed to decompress data: {source}")]
    Decompression {
        /// Error reported by the compressor.
        #[source]
        source: CapabilityError,
    },

    /// The bound encryptor failed.
    #[error("failed to encrypt data: {source}")]
    Encryption {
        /// Error reported by the encryptor.
        #[source]
        source: CapabilityError,
    },

    /// The bound encryptor failed to decrypt.
    #[error("failed to decrypt data: {source}")]
    Decryption {
        /// Error reported by the encryptor.
        #[source]
        source: CapabilityError,
    },

    /// Writing transformed bytes to the sink failed.
    #[error("failed to write data: {0}")]
    Write(#[source] io::Error),

    /// Reading from a stream source failed, including short reads.
    #[error("failed to read io device: {0}")]
    Read(#[source] io::Error),

    /// Reading at an offset from a storage backend failed, including short reads.
    #[error("failed to read file: {0}")]
    ReadAt(#[source] wiredkv_storage::StorageError),

    /// The stored checksum does not match the record bytes.
    #[error("checksum mismatch: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        /// Checksum stored in the record trailer.
        expected: u32,
        /// Checksum computed over the record bytes.
        actual: u32,
    },

    /// Record bytes do not describe a valid segment.
    #[error("segment corruption: {message}")]
    SegmentCorruption {
        /// Description of the corruption.
        message: String,
    },

    /// A key or value does not fit the 32-bit size fields.
    #[error("{field} too large for a segment: {len} bytes")]
    RecordTooLarge {
        /// Which field overflowed (`key` or `value`).
        field: &'static str,
        /// Actual length in bytes.
        len: usize,
    },
}

impl CoreError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Creates a deserialization error.
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::Deserialization {
            message: message.into(),
        }
    }

    /// Creates a segment corruption error.
    pub fn segment_corruption(message: impl Into<String>) -> Self {
        Self::SegmentCorruption {
            message: message.into(),
        }
    }

    /// Returns true for failures of the sink or source itself.
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Write(_) | Self::Read(_) | Self::ReadAt(_))
    }
}
