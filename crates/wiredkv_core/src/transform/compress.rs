//! Built-in compressors.

use super::Compressor;
use crate::error::CapabilityError;

/// LZ4 block compression (`lz4_flex`), uncompressed size prepended.
///
/// Fast with a modest ratio; a good default for hot keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz4Compressor;

impl Compressor for Lz4Compressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CapabilityError> {
        Ok(lz4_flex::block::compress_prepend_size(data))
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CapabilityError> {
        Ok(lz4_flex::block::decompress_size_prepended(data)?)
    }
}

/// Zstandard compression via the `zstd` bulk API.
///
/// Output layout: `original_len (4, big-endian) || zstd frame`.
#[derive(Debug, Clone, Copy)]
pub struct ZstdCompressor {
    level: i32,
}

impl ZstdCompressor {
    /// Default compression level.
    pub const DEFAULT_LEVEL: i32 = 3;

    /// Creates a compressor at `level`.
    #[must_use]
    pub const fn new(level: i32) -> Self {
        Self { level }
    }

    /// Returns the compression level.
    #[must_use]
    pub const fn level(&self) -> i32 {
        self.level
    }
}

impl Default for ZstdCompressor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LEVEL)
    }
}

impl Compressor for ZstdCompressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CapabilityError> {
        let original_len = u32::try_from(data.len())?;
        let frame = zstd::bulk::compress(data, self.level)?;

        let mut out = Vec::with_capacity(4 + frame.len());
        out.extend_from_slice(&original_len.to_be_bytes());
        out.extend_from_slice(&frame);
        Ok(out)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CapabilityError> {
        if data.len() < 4 {
            return Err("zstd payload too short for length prefix".into());
        }
        let (prefix, frame) = data.split_at(4);
        let original_len = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);

        let out = zstd::bulk::decompress(frame, original_len as usize)?;
        if out.len() != original_len as usize {
            return Err(format!(
                "zstd length mismatch: expected {original_len}, got {}",
                out.len()
            )
            .into());
        }
        Ok(out)
    }
}
