//! # WiredKV Storage
//!
//! Byte sinks and random-access sources that WiredKV records are written to
//! and read back from.
//!
//! Backends are **opaque append logs**: they never look inside the bytes they
//! hold. Record layout, checksums and the compress/encrypt pipeline all live
//! in `wiredkv_core`; a backend only answers "append these bytes" and "give me
//! exactly `len` bytes at `offset`".
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For tests and ephemeral stores
//! - [`FileBackend`] - A single append-only log file
//!
//! ## Example
//!
//! ```rust
//! use wiredkv_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut log = InMemoryBackend::new();
//! let offset = log.append(b"segment bytes").unwrap();
//! assert_eq!(log.read_at(offset, 7).unwrap(), b"segment");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
