//! Encryption secret.

use crate::error::{CoreError, CoreResult};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Minimum secret length accepted by the transformer.
pub const MIN_SECRET_LEN: usize = 16;

/// Secret handed to the bound encryptor on every call.
///
/// Zeroized on drop and redacted in `Debug` output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret {
    bytes: Vec<u8>,
}

impl Secret {
    /// Wraps `bytes` as a secret.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Configuration`] if `bytes` is shorter than
    /// [`MIN_SECRET_LEN`].
    pub fn new(bytes: impl Into<Vec<u8>>) -> CoreResult<Self> {
        let mut bytes = bytes.into();
        if bytes.len() < MIN_SECRET_LEN {
            let len = bytes.len();
            bytes.zeroize();
            return Err(CoreError::configuration(format!(
                "secret char length too short: need at least {MIN_SECRET_LEN} bytes, got {len}"
            )));
        }
        Ok(Self { bytes })
    }

    /// Returns the secret bytes.
    ///
    /// # Security
    ///
    /// Don't log or persist the result.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false: a secret holds at least [`MIN_SECRET_LEN`] bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secret")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_minimum_length() {
        let secret = Secret::new(vec![7u8; MIN_SECRET_LEN]).unwrap();
        assert_eq!(secret.len(), 16);
        assert_eq!(secret.as_bytes(), &[7u8; 16]);
    }

    #[test]
    fn rejects_short_secret() {
        let err = Secret::new(b"fifteen-bytes!!".to_vec()).unwrap_err();
        assert!(matches!(err, CoreError::Configuration { .. }));
        assert!(Secret::new(Vec::new()).is_err());
    }

    #[test]
    fn debug_is_redacted() {
        let secret = Secret::new(b"super-secret-value".to_vec()).unwrap();
        let debug = format!("{secret:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("super-secret"));
    }
}
