//! # WiredKV Core
//!
//! Record format and value pipeline for the WiredKV append log.
//!
//! This crate provides:
//! - [`Segment`], the self-describing record every write and delete becomes
//! - [`Transformer`], the optional compress/encrypt pipeline applied to
//!   values on their way to and from the log
//! - The built-in value types ([`Set`], [`ZSet`], [`List`], [`Text`],
//!   [`Tables`], [`Binary`], [`Number`]) and their [`Kind`] tags
//!
//! ## Example
//!
//! ```
//! use wiredkv_core::{Number, Segment, Transformer};
//!
//! let transformer = Transformer::new();
//! let segment = Segment::new("user:1", &Number::new(42), 0, &transformer).unwrap();
//!
//! let bytes = segment.encode();
//! assert_eq!(bytes.len() as u64, segment.size());
//!
//! let decoded = Segment::decode(&bytes).unwrap();
//! assert_eq!(decoded.to_number(&transformer).unwrap(), Some(Number::new(42)));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod kind;
mod segment;
pub mod transform;
pub mod types;

pub use config::{CompressionAlgorithm, TransformConfig};
pub use error::{CapabilityError, CoreError, CoreResult};
pub use kind::Kind;
pub use segment::{Segment, SegmentHeader, CRC_SIZE, HEADER_SIZE};
pub use transform::{Compressor, Encryptor, Transformer};
pub use types::{Binary, Deserializable, List, Number, Serializable, Set, Tables, Text, ZSet};
