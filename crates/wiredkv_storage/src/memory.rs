//! In-memory append log.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;

/// An append log held entirely in memory.
///
/// Used by tests and by callers that want the record codec without a file.
///
/// ```rust
/// use wiredkv_storage::{StorageBackend, InMemoryBackend};
///
/// let mut log = InMemoryBackend::new();
/// assert_eq!(log.append(b"abc").unwrap(), 0);
/// assert_eq!(log.append(b"de").unwrap(), 3);
/// assert_eq!(log.size().unwrap(), 5);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    log: RwLock<Vec<u8>>,
}

impl InMemoryBackend {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a log preloaded with `bytes`, e.g. to replay a captured file.
    #[must_use]
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            log: RwLock::new(bytes),
        }
    }

    /// Returns a copy of every byte in the log.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        self.log.read().clone()
    }
}

impl StorageBackend for InMemoryBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let log = self.log.read();
        let size = log.len() as u64;
        let end = offset.saturating_add(len as u64);

        if end > size {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        Ok(log[offset as usize..end as usize].to_vec())
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        let mut log = self.log.write();
        let offset = log.len() as u64;
        log.extend_from_slice(data);
        Ok(offset)
    }

    fn sync(&mut self) -> StorageResult<()> {
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.log.read().len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_returns_running_offset() {
        let mut log = InMemoryBackend::new();

        assert_eq!(log.append(b"header").unwrap(), 0);
        assert_eq!(log.append(b"body").unwrap(), 6);
        assert_eq!(log.size().unwrap(), 10);
    }

    #[test]
    fn read_at_returns_exact_range() {
        let mut log = InMemoryBackend::new();
        log.append(b"user:1user:2").unwrap();

        assert_eq!(log.read_at(6, 6).unwrap(), b"user:2");
        assert!(log.read_at(12, 0).unwrap().is_empty());
    }

    #[test]
    fn short_read_is_an_error() {
        let mut log = InMemoryBackend::new();
        log.append(b"tiny").unwrap();

        let err = log.read_at(2, 8).unwrap_err();
        assert!(matches!(err, StorageError::ReadPastEnd { size: 4, .. }));
        assert!(err.is_short_read());
    }

    #[test]
    fn offset_past_end_is_an_error() {
        let log = InMemoryBackend::with_bytes(b"abc".to_vec());
        assert!(log.read_at(10, 1).is_err());
    }

    #[test]
    fn preloaded_bytes_are_readable() {
        let log = InMemoryBackend::with_bytes(b"replayed".to_vec());
        assert_eq!(log.size().unwrap(), 8);
        assert_eq!(log.bytes(), b"replayed");
    }
}
