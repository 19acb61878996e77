//! Transformer configuration.

use zeroize::Zeroizing;

/// Built-in compression algorithm to bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionAlgorithm {
    /// LZ4 block compression.
    Lz4,
    /// Zstandard at the given level.
    Zstd {
        /// Compression level (1-22; 3 is a sensible default).
        level: i32,
    },
}

/// Configuration for building a [`Transformer`](crate::transform::Transformer)
/// with the built-in capabilities.
///
/// ```rust
/// use wiredkv_core::{CompressionAlgorithm, TransformConfig, Transformer};
///
/// let config = TransformConfig::new()
///     .compression(CompressionAlgorithm::Lz4)
///     .encryption_secret(b"0123456789abcdef".to_vec());
/// let transformer = Transformer::from_config(&config).unwrap();
/// assert!(transformer.is_encryption_active());
/// ```
#[derive(Clone, Default)]
pub struct TransformConfig {
    /// Compression to bind, if any.
    pub compression: Option<CompressionAlgorithm>,

    secret: Option<Zeroizing<Vec<u8>>>,
}

impl TransformConfig {
    /// Creates a configuration with no stage enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compression algorithm.
    #[must_use]
    pub fn compression(mut self, algorithm: CompressionAlgorithm) -> Self {
        self.compression = Some(algorithm);
        self
    }

    /// Sets the AES-GCM secret. Length is checked when the transformer is built.
    #[must_use]
    pub fn encryption_secret(mut self, secret: Vec<u8>) -> Self {
        self.secret = Some(Zeroizing::new(secret));
        self
    }

    /// Returns the configured secret, if any.
    #[must_use]
    pub fn secret(&self) -> Option<&[u8]> {
        self.secret.as_ref().map(|s| s.as_slice())
    }
}

impl std::fmt::Debug for TransformConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformConfig")
            .field("compression", &self.compression)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
