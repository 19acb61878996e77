//! Built-in AES-256-GCM encryptor.

use super::Encryptor;
use crate::error::CapabilityError;
use aes_gcm::{
    aead::{generic_array::GenericArray, Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

/// Size of the derived AES-256 key in bytes.
const KEY_SIZE: usize = 32;
/// Size of the GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;
/// Size of the GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// HKDF info string binding derived keys to segment payloads.
const KEY_INFO: &[u8] = b"wiredkv-segment-key-v1";

/// AES-256-GCM with a key derived from the secret by HKDF-SHA256.
///
/// Output layout: `nonce (12) || ciphertext || tag (16)`. The nonce is
/// random per call, so encoding the same bytes twice gives different output.
#[derive(Debug, Clone, Copy, Default)]
pub struct AesGcmEncryptor;

impl AesGcmEncryptor {
    fn cipher(secret: &[u8]) -> Result<Aes256Gcm, CapabilityError> {
        let hk = Hkdf::<Sha256>::new(None, secret);
        let mut key = Zeroizing::new([0u8; KEY_SIZE]);
        hk.expand(KEY_INFO, &mut key[..])
            .map_err(|_| "HKDF expand failed")?;
        Ok(Aes256Gcm::new(GenericArray::from_slice(&key[..])))
    }
}

impl Encryptor for AesGcmEncryptor {
    fn encode(&self, secret: &[u8], data: &[u8]) -> Result<Vec<u8>, CapabilityError> {
        let cipher = Self::cipher(secret)?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, data)
            .map_err(|_| "aes-gcm encryption error")?;

        let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend(ciphertext);
        Ok(out)
    }

    fn decode(&self, secret: &[u8], data: &[u8]) -> Result<Vec<u8>, CapabilityError> {
        if data.len() < NONCE_SIZE + TAG_SIZE {
            return Err("ciphertext too short".into());
        }
        let cipher = Self::cipher(secret)?;

        let (nonce, sealed) = data.split_at(NONCE_SIZE);
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| "aes-gcm decryption error")?;
        Ok(plaintext)
    }
}
