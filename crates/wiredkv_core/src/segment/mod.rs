//! Segment records: one key/value write or deletion in the append log.
//!
//! ## Record Format
//!
//! ```text
//! | tombstone (1) | kind (1) | expired_at (8) | created_at (8) |
//! | key_size (4) | value_size (4) | key (K) | value (V) | crc32 (4) |
//! ```
//!
//! - All integers are big-endian
//! - `value` holds the *transformed* bytes (compressed and/or encrypted)
//! - Tombstones carry no value and zeroed kind/timestamps
//! - `crc32` covers every byte before it

mod header;
mod record;

pub use header::SegmentHeader;
pub use record::Segment;

/// Width of the fixed header in bytes.
pub const HEADER_SIZE: usize = 26;

/// Width of the CRC32 trailer in bytes.
pub const CRC_SIZE: usize = 4;

/// Current Unix time in seconds.
pub(crate) fn unix_now() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
