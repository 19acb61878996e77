//! Compress/encrypt pipeline applied to segment values.
//!
//! The [`Transformer`] holds two optional capabilities, a [`Compressor`] and
//! an [`Encryptor`] (with its [`Secret`]), each gated by a flag. A stage runs
//! only when its flag is set **and** its capability is bound.
//!
//! ## Stage Order
//!
//! ```text
//! write:  payload -> compress -> encrypt -> sink
//! read:   source  -> decrypt  -> decompress -> payload
//! ```
//!
//! Compression always runs first on write: ciphertext does not compress.
//!
//! ## Built-in Capabilities
//!
//! - [`Lz4Compressor`] and [`ZstdCompressor`]
//! - [`AesGcmEncryptor`] (AES-256-GCM, key derived from the secret)

mod compress;
mod crypto;
mod flags;
mod secret;
mod transformer;

pub use compress::{Lz4Compressor, ZstdCompressor};
pub use crypto::{AesGcmEncryptor, NONCE_SIZE, TAG_SIZE};
pub use flags::TransformFlags;
pub use secret::{Secret, MIN_SECRET_LEN};
pub use transformer::Transformer;

use crate::error::CapabilityError;

/// A pluggable compression algorithm.
///
/// Implementations must be deterministic and side-effect free, and
/// `decompress(compress(x)) == x` must hold for every input.
pub trait Compressor: Send + Sync {
    /// Compresses `data`.
    ///
    /// # Errors
    ///
    /// Returns the algorithm's error if compression fails.
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CapabilityError>;

    /// Reverses [`compress`](Self::compress).
    ///
    /// # Errors
    ///
    /// Returns the algorithm's error if `data` is not valid compressed input.
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CapabilityError>;
}

/// A pluggable encryption algorithm keyed by a caller-supplied secret.
///
/// `decode(secret, encode(secret, x)) == x` must hold for every input.
pub trait Encryptor: Send + Sync {
    /// Encrypts `data` under `secret`.
    ///
    /// # Errors
    ///
    /// Returns the algorithm's error if encryption fails.
    fn encode(&self, secret: &[u8], data: &[u8]) -> Result<Vec<u8>, CapabilityError>;

    /// Decrypts `data` under `secret`.
    ///
    /// # Errors
    ///
    /// Returns the algorithm's error if `data` was not produced under
    /// `secret` or has been tampered with.
    fn decode(&self, secret: &[u8], data: &[u8]) -> Result<Vec<u8>, CapabilityError>;
}
