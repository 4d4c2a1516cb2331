//! # Note encryption at rest
//!
//! Note bodies are stored in PostgreSQL as **AES-256-GCM** ciphertext sealed with
//! a single server-held master key. Titles stay plaintext.
//!
//! ## Master key
//!
//! The key is 32 bytes, configured as 64 hex characters (`crypto.encryption_key`
//! in the server settings). It is parsed once at startup by [`NoteCipher::from_hex`]
//! and the resulting cipher is handed to the note store. Nothing in this module
//! reads the environment, so tests can build as many independent ciphers as they
//! like with [`NoteCipher::generate`].
//!
//! ## Public API
//!
//! | Item | Purpose |
//! |------|---------|
//! | [`NoteCipher::encrypt`] | Seals UTF-8 text under a fresh random 12-byte nonce, returning an [`EncryptedContent`] (ciphertext + nonce, stored as two `BYTEA` columns). |
//! | [`NoteCipher::decrypt`] | Opens an [`EncryptedContent`]. A wrong key, a truncated nonce or any tampering yields [`CryptoError::DecryptionFailed`]. |
//!
//! The cipher's `Debug` output never includes key material.

use std::fmt;

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use store::EncryptedContent;
use thiserror::Error;

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid encryption key: {0}")]
    InvalidKey(String),
    #[error("encryption failed")]
    EncryptionFailed,
    #[error("decryption failed")]
    DecryptionFailed,
}

/// AES-256-GCM codec for note bodies, keyed by the server master key.
#[derive(Clone)]
pub struct NoteCipher {
    cipher: Aes256Gcm,
}

impl fmt::Debug for NoteCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NoteCipher(..)")
    }
}

impl NoteCipher {
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        Self {
            cipher: Aes256Gcm::new(key.into()),
        }
    }

    /// Parse and validate a 64 hex-char master key.
    pub fn from_hex(hex_key: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(hex_key.trim())
            .map_err(|e| CryptoError::InvalidKey(format!("not valid hex: {}", e)))?;
        let key: [u8; KEY_LEN] = bytes.as_slice().try_into().map_err(|_| {
            CryptoError::InvalidKey(format!(
                "must be 64 hex chars (32 bytes), got {} bytes",
                bytes.len()
            ))
        })?;
        Ok(Self::new(&key))
    }

    /// A cipher under a fresh random key.
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut key);
        Self::new(&key)
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<EncryptedContent, CryptoError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::EncryptionFailed)?;

        Ok(EncryptedContent {
            ciphertext,
            nonce: nonce_bytes.to_vec(),
        })
    }

    pub fn decrypt(&self, content: &EncryptedContent) -> Result<String, CryptoError> {
        // from_slice panics on a wrong length
        if content.nonce.len() != NONCE_LEN {
            return Err(CryptoError::DecryptionFailed);
        }
        let nonce = Nonce::from_slice(&content.nonce);
        let plaintext = self
            .cipher
            .decrypt(nonce, content.ciphertext.as_slice())
            .map_err(|_| CryptoError::DecryptionFailed)?;

        String::from_utf8(plaintext).map_err(|_| CryptoError::DecryptionFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let cipher = NoteCipher::generate();
        for text in ["milk,eggs", "", "ünïcødé ✓", "x".repeat(10_000).as_str()] {
            let sealed = cipher.encrypt(text).unwrap();
            assert_eq!(cipher.decrypt(&sealed).unwrap(), text);
        }
    }

    #[test]
    fn test_ciphertext_differs_from_plaintext() {
        let cipher = NoteCipher::generate();
        let sealed = cipher.encrypt("milk,eggs").unwrap();
        assert_ne!(sealed.ciphertext, b"milk,eggs".to_vec());
        assert_eq!(sealed.nonce.len(), NONCE_LEN);

        // Fresh nonce per call
        let again = cipher.encrypt("milk,eggs").unwrap();
        assert_ne!(sealed.nonce, again.nonce);
        assert_ne!(sealed.ciphertext, again.ciphertext);
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = NoteCipher::generate().encrypt("secret").unwrap();
        assert_eq!(
            NoteCipher::generate().decrypt(&sealed),
            Err(CryptoError::DecryptionFailed)
        );
    }

    #[test]
    fn test_tampered_or_truncated_fails() {
        let cipher = NoteCipher::generate();
        let mut sealed = cipher.encrypt("secret").unwrap();
        sealed.ciphertext[0] ^= 0xff;
        assert_eq!(cipher.decrypt(&sealed), Err(CryptoError::DecryptionFailed));

        let short_nonce = EncryptedContent {
            ciphertext: vec![1, 2, 3],
            nonce: vec![0; 4],
        };
        assert_eq!(
            cipher.decrypt(&short_nonce),
            Err(CryptoError::DecryptionFailed)
        );
    }

    #[test]
    fn test_from_hex() {
        let key = "00".repeat(32);
        let a = NoteCipher::from_hex(&key).unwrap();
        let b = NoteCipher::from_hex(&format!("  {}\n", key)).unwrap();
        let sealed = a.encrypt("shared key").unwrap();
        assert_eq!(b.decrypt(&sealed).unwrap(), "shared key");

        assert!(matches!(
            NoteCipher::from_hex("abcd"),
            Err(CryptoError::InvalidKey(_))
        ));
        assert!(matches!(
            NoteCipher::from_hex(&"zz".repeat(32)),
            Err(CryptoError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_debug_hides_key() {
        let cipher = NoteCipher::from_hex(&"ab".repeat(32)).unwrap();
        assert_eq!(format!("{:?}", cipher), "NoteCipher(..)");
    }
}
