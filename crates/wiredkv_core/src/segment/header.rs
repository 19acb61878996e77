//! Fixed-width segment header.

use super::{CRC_SIZE, HEADER_SIZE};
use crate::error::{CoreError, CoreResult};
use crate::kind::Kind;

/// The 26-byte header at the start of every segment record.
///
/// Decoding the header alone tells a reader how many more bytes the record
/// occupies, see [`record_size`](Self::record_size).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentHeader {
    /// Whether the record marks a deletion.
    pub tombstone: bool,
    /// Value type tag.
    pub kind: Kind,
    /// Expiry in Unix seconds, 0 for none.
    pub expired_at: u64,
    /// Creation time in Unix seconds.
    pub created_at: u64,
    /// Key length in bytes.
    pub key_size: u32,
    /// Transformed value length in bytes.
    pub value_size: u32,
}

impl SegmentHeader {
    /// Encodes the header.
    #[must_use]
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0] = u8::from(self.tombstone);
        buf[1] = self.kind.as_byte();
        buf[2..10].copy_from_slice(&self.expired_at.to_be_bytes());
        buf[10..18].copy_from_slice(&self.created_at.to_be_bytes());
        buf[18..22].copy_from_slice(&self.key_size.to_be_bytes());
        buf[22..26].copy_from_slice(&self.value_size.to_be_bytes());
        buf
    }

    /// Decodes a header from the first [`HEADER_SIZE`] bytes of `data`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SegmentCorruption`] if `data` is too short, the
    /// tombstone byte is not 0 or 1, the kind tag is invalid, or a tombstone
    /// claims a value.
    pub fn decode(data: &[u8]) -> CoreResult<Self> {
        if data.len() < HEADER_SIZE {
            return Err(CoreError::segment_corruption(format!(
                "header too short: {} bytes",
                data.len()
            )));
        }

        let tombstone = match data[0] {
            0 => false,
            1 => true,
            b => {
                return Err(CoreError::segment_corruption(format!(
                    "invalid tombstone byte {b:#04x}"
                )))
            }
        };

        let kind = Kind::from_byte(data[1])
            .ok_or_else(|| CoreError::segment_corruption(format!("invalid kind tag {}", data[1])))?;

        let header = Self {
            tombstone,
            kind,
            expired_at: u64::from_be_bytes(read_array(&data[2..10])),
            created_at: u64::from_be_bytes(read_array(&data[10..18])),
            key_size: u32::from_be_bytes(read_array(&data[18..22])),
            value_size: u32::from_be_bytes(read_array(&data[22..26])),
        };

        if tombstone && header.value_size != 0 {
            return Err(CoreError::segment_corruption("tombstone with a value"));
        }
        if !tombstone && !kind.is_known() {
            return Err(CoreError::segment_corruption("live record of unknown kind"));
        }

        Ok(header)
    }

    /// Total on-disk length of the record this header starts.
    #[must_use]
    pub fn record_size(&self) -> u64 {
        (HEADER_SIZE + CRC_SIZE) as u64 + u64::from(self.key_size) + u64::from(self.value_size)
    }
}

fn read_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    out
}
