//! The transform pipeline.

use super::flags::TransformFlags;
use super::secret::Secret;
use super::{AesGcmEncryptor, Compressor, Encryptor, Lz4Compressor, ZstdCompressor};
use crate::config::{CompressionAlgorithm, TransformConfig};
use crate::error::{CoreError, CoreResult};
use std::borrow::Cow;
use std::io::{Read, Write};
use tracing::{debug, trace, warn};
use wiredkv_storage::StorageBackend;

/// Bound encryptor together with the secret it is keyed by.
struct EncryptionContext {
    encryptor: Box<dyn Encryptor>,
    secret: Secret,
}

/// Flag-gated compress/encrypt pipeline.
///
/// A new transformer has both flags clear and nothing bound, so it passes
/// bytes through unchanged. Binding a capability enables its stage;
/// disabling a stage clears only the flag, so re-enabling reuses the bound
/// capability.
///
/// Configuration changes take `&mut self`. Share a configured transformer
/// behind `&` or `Arc` and serialize any later reconfiguration yourself.
///
/// # Example
///
/// ```rust
/// use wiredkv_core::transform::{Transformer, Lz4Compressor, AesGcmEncryptor};
///
/// let mut transformer = Transformer::new();
/// transformer.set_compressor(Lz4Compressor);
/// transformer.set_encryptor(AesGcmEncryptor, b"0123456789abcdef".to_vec()).unwrap();
///
/// let stored = transformer.encode(b"hello hello hello").unwrap();
/// assert_eq!(transformer.decode(&stored).unwrap(), b"hello hello hello");
/// ```
#[derive(Default)]
pub struct Transformer {
    flags: TransformFlags,
    compressor: Option<Box<dyn Compressor>>,
    encryption: Option<EncryptionContext>,
}

impl Transformer {
    /// Creates a pass-through transformer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a transformer with the built-in capabilities named by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Configuration`] if the configured secret is too
    /// short.
    pub fn from_config(config: &TransformConfig) -> CoreResult<Self> {
        let mut transformer = Self::new();

        match config.compression {
            Some(CompressionAlgorithm::Lz4) => transformer.set_compressor(Lz4Compressor),
            Some(CompressionAlgorithm::Zstd { level }) => {
                transformer.set_compressor(ZstdCompressor::new(level));
            }
            None => {}
        }

        if let Some(secret) = config.secret() {
            transformer.set_encryptor(AesGcmEncryptor, secret.to_vec())?;
        }

        Ok(transformer)
    }

    /// Sets the encryption flag.
    pub fn enable_encryption(&mut self) {
        self.flags = self.flags.with(TransformFlags::ENCRYPTION);
    }

    /// Sets the compression flag.
    pub fn enable_compression(&mut self) {
        self.flags = self.flags.with(TransformFlags::COMPRESSION);
    }

    /// Clears the encryption flag, keeping the encryptor bound.
    pub fn disable_encryption(&mut self) {
        self.flags = self.flags.without(TransformFlags::ENCRYPTION);
    }

    /// Clears the compression flag, keeping the compressor bound.
    pub fn disable_compression(&mut self) {
        self.flags = self.flags.without(TransformFlags::COMPRESSION);
    }

    /// Clears both flags.
    pub fn disable_all(&mut self) {
        self.flags = TransformFlags::NONE;
    }

    /// Returns whether the encryption flag is set.
    #[must_use]
    pub fn is_encryption_enabled(&self) -> bool {
        self.flags.contains(TransformFlags::ENCRYPTION)
    }

    /// Returns whether the compression flag is set.
    #[must_use]
    pub fn is_compression_enabled(&self) -> bool {
        self.flags.contains(TransformFlags::COMPRESSION)
    }

    /// Returns whether encryption will actually run: flag set and encryptor bound.
    #[must_use]
    pub fn is_encryption_active(&self) -> bool {
        self.active_encryption().is_some()
    }

    /// Returns whether compression will actually run: flag set and compressor bound.
    #[must_use]
    pub fn is_compression_active(&self) -> bool {
        self.active_compressor().is_some()
    }

    /// Returns the current flags.
    #[must_use]
    pub fn flags(&self) -> TransformFlags {
        self.flags
    }

    /// Binds `encryptor` keyed by `secret` and enables encryption.
    ///
    /// Replaces any previous encryptor and secret.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Configuration`] if `secret` is shorter than
    /// [`MIN_SECRET_LEN`](super::MIN_SECRET_LEN) bytes. The transformer is
    /// left untouched in that case.
    pub fn set_encryptor<E>(&mut self, encryptor: E, secret: impl Into<Vec<u8>>) -> CoreResult<()>
    where
        E: Encryptor + 'static,
    {
        let secret = Secret::new(secret).inspect_err(|err| {
            warn!(error = %err, "rejected encryptor binding");
        })?;

        self.encryption = Some(EncryptionContext {
            encryptor: Box::new(encryptor),
            secret,
        });
        self.enable_encryption();
        debug!("encryptor bound, encryption enabled");
        Ok(())
    }

    /// Binds `compressor` and enables compression.
    pub fn set_compressor<C>(&mut self, compressor: C)
    where
        C: Compressor + 'static,
    {
        self.compressor = Some(Box::new(compressor));
        self.enable_compression();
        debug!("compressor bound, compression enabled");
    }

    fn active_compressor(&self) -> Option<&dyn Compressor> {
        if !self.is_compression_enabled() {
            return None;
        }
        let compressor = self.compressor.as_deref();
        if compressor.is_none() {
            trace!("compression enabled without a compressor; stage skipped");
        }
        compressor
    }

    fn active_encryption(&self) -> Option<&EncryptionContext> {
        if !self.is_encryption_enabled() {
            return None;
        }
        let encryption = self.encryption.as_ref();
        if encryption.is_none() {
            trace!("encryption enabled without an encryptor; stage skipped");
        }
        encryption
    }

    /// Runs the write-side pipeline: compress if active, then encrypt if active.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Compression`] or [`CoreError::Encryption`] for
    /// the stage that failed.
    pub fn encode(&self, payload: &[u8]) -> CoreResult<Vec<u8>> {
        let mut data = Cow::Borrowed(payload);

        if let Some(compressor) = self.active_compressor() {
            let compressed = compressor
                .compress(&data)
                .map_err(|source| CoreError::Compression { source })?;
            trace!(before = data.len(), after = compressed.len(), "compressed payload");
            data = Cow::Owned(compressed);
        }

        if let Some(ctx) = self.active_encryption() {
            let sealed = ctx
                .encryptor
                .encode(ctx.secret.as_bytes(), &data)
                .map_err(|source| CoreError::Encryption { source })?;
            trace!(before = data.len(), after = sealed.len(), "encrypted payload");
            data = Cow::Owned(sealed);
        }

        Ok(data.into_owned())
    }

    /// Runs the read-side pipeline: decrypt if active, then decompress if active.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decryption`] or [`CoreError::Decompression`] for
    /// the stage that failed.
    pub fn decode(&self, stored: &[u8]) -> CoreResult<Vec<u8>> {
        let mut data = Cow::Borrowed(stored);

        if let Some(ctx) = self.active_encryption() {
            let opened = ctx
                .encryptor
                .decode(ctx.secret.as_bytes(), &data)
                .map_err(|source| CoreError::Decryption { source })?;
            data = Cow::Owned(opened);
        }

        if let Some(compressor) = self.active_compressor() {
            let expanded = compressor
                .decompress(&data)
                .map_err(|source| CoreError::Decompression { source })?;
            data = Cow::Owned(expanded);
        }

        Ok(data.into_owned())
    }

    /// Transforms `payload` and writes the result to `sink`.
    ///
    /// Nothing is written unless every transform stage succeeds. Returns the
    /// number of bytes written, i.e. the transformed length.
    ///
    /// # Errors
    ///
    /// Returns the failing transform stage's error, or [`CoreError::Write`].
    pub fn write<W>(&self, sink: &mut W, payload: &[u8]) -> CoreResult<usize>
    where
        W: Write + ?Sized,
    {
        let data = self.encode(payload)?;
        sink.write_all(&data).map_err(CoreError::Write)?;
        Ok(data.len())
    }

    /// Reads exactly `len` transformed bytes from `source` and reverses the
    /// pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Read`] if the source fails or ends early, or the
    /// failing reverse stage's error.
    pub fn read<R>(&self, source: &mut R, len: usize) -> CoreResult<Vec<u8>>
    where
        R: Read + ?Sized,
    {
        let mut buf = vec![0u8; len];
        source.read_exact(&mut buf).map_err(CoreError::Read)?;
        self.decode(&buf)
    }

    /// Reads exactly `len` transformed bytes at `offset` and reverses the
    /// pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ReadAt`] if the backend fails or holds fewer
    /// bytes than requested, or the failing reverse stage's error.
    pub fn read_at<B>(&self, source: &B, offset: u64, len: usize) -> CoreResult<Vec<u8>>
    where
        B: StorageBackend + ?Sized,
    {
        let buf = source.read_at(offset, len).map_err(CoreError::ReadAt)?;
        self.decode(&buf)
    }
}

impl std::fmt::Debug for Transformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transformer")
            .field("flags", &self.flags)
            .field("compressor_bound", &self.compressor.is_some())
            .field("encryptor_bound", &self.encryption.is_some())
            .finish()
    }
}
