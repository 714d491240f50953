use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit, OsRng, rand_core::RngCore},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use thiserror::Error;

/// AES-GCM standard nonce length in bytes.
const NONCE_LEN: usize = 12;

/// InvalidKey
///
/// Raised when the configured codec key does not decode to exactly 32 bytes.
#[derive(Debug, Error)]
#[error("encryption key must be 32 bytes of valid base64")]
pub struct InvalidKey;

/// DecryptionError
///
/// A ciphertext that this codec did not produce (or that was corrupted at
/// rest) fails with one of these instead of yielding garbage. Callers running
/// bulk scans treat any of them as "unreadable record": skip it and log.
#[derive(Debug, Error)]
pub enum DecryptionError {
    #[error("ciphertext is not valid base64")]
    Encoding(#[from] base64::DecodeError),
    #[error("ciphertext is too short to carry a nonce")]
    Truncated,
    #[error("ciphertext failed authentication")]
    Cipher,
    #[error("decrypted payload is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// CryptoCodec
///
/// Symmetric field codec for the sensitive POI columns (name, location),
/// keyed by one process-wide secret injected at construction.
///
/// Encryption is AES-256-GCM with a fresh random nonce per call, so equal
/// plaintexts never produce equal ciphertexts. The wire form is
/// base64(nonce || ciphertext), one opaque string per field, which any record
/// store can hold as text.
#[derive(Clone)]
pub struct CryptoCodec {
    cipher: Aes256Gcm,
}

impl CryptoCodec {
    pub fn new(key: &[u8; 32]) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)),
        }
    }

    /// Builds the codec from the base64-encoded key held in configuration.
    pub fn from_base64_key(encoded: &str) -> Result<Self, InvalidKey> {
        let bytes = BASE64.decode(encoded).map_err(|_| InvalidKey)?;
        let key: [u8; 32] = bytes.try_into().map_err(|_| InvalidKey)?;
        Ok(Self::new(&key))
    }

    /// Encrypts a plaintext field. Non-deterministic: two calls with the same
    /// input yield different ciphertexts.
    pub fn encrypt(&self, plaintext: &str) -> String {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .expect("AES-GCM encryption of an in-memory buffer cannot fail");

        let mut framed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        framed.extend_from_slice(&nonce_bytes);
        framed.extend_from_slice(&ciphertext);
        BASE64.encode(framed)
    }

    /// Exact inverse of [`encrypt`](Self::encrypt) for any ciphertext it
    /// produced. Anything else fails with a [`DecryptionError`].
    pub fn decrypt(&self, ciphertext: &str) -> Result<String, DecryptionError> {
        let framed = BASE64.decode(ciphertext)?;
        if framed.len() < NONCE_LEN {
            return Err(DecryptionError::Truncated);
        }
        let (nonce_bytes, sealed) = framed.split_at(NONCE_LEN);

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), sealed)
            .map_err(|_| DecryptionError::Cipher)?;

        Ok(String::from_utf8(plaintext)?)
    }
}
