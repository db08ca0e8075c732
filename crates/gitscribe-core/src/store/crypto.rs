//! Encryption primitives for the settings store
//!
//! The settings document is sealed with AES-256-GCM under a master key.
//! A failed decryption is a corrupt-store condition, never an empty
//! document.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit, OsRng},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use rand_chacha::rand_core::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};

/// Size of AES-256 key in bytes
const AES_KEY_SIZE: usize = 32;

/// Size of AES-GCM nonce in bytes
const NONCE_SIZE: usize = 12;

/// A master encryption key that is securely zeroed on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: [u8; AES_KEY_SIZE],
}

impl MasterKey {
    /// Generate a new random master key
    pub fn generate() -> Self {
        let mut bytes = [0u8; AES_KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Create a master key from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != AES_KEY_SIZE {
            return Err(Error::InvalidKeyLength {
                expected: AES_KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut key_bytes = [0u8; AES_KEY_SIZE];
        key_bytes.copy_from_slice(bytes);
        Ok(Self { bytes: key_bytes })
    }

    /// Create a master key from a hex-encoded string
    pub fn from_hex(hex: &str) -> Result<Self> {
        let bytes = hex::decode(hex.trim()).map_err(|e| Error::InvalidKeyFormat(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Export key as hex string (for storage in the keyring)
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Get the raw key bytes (use carefully)
    pub(crate) fn as_bytes(&self) -> &[u8; AES_KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// The on-disk envelope wrapping the encrypted settings document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    /// The nonce used for encryption (base64 encoded)
    pub nonce: String,

    /// The encrypted settings JSON (base64 encoded)
    pub ciphertext: String,
}

impl EncryptedEnvelope {
    /// Seal a plaintext document under the master key with a fresh nonce
    pub fn seal(plaintext: &[u8], master_key: &MasterKey) -> Result<Self> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let cipher = Aes256Gcm::new_from_slice(master_key.as_bytes())
            .map_err(|e| Error::EncryptionFailed(e.to_string()))?;

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| Error::EncryptionFailed(e.to_string()))?;

        Ok(Self {
            nonce: STANDARD.encode(nonce_bytes),
            ciphertext: STANDARD.encode(&ciphertext),
        })
    }

    /// Open the envelope with the master key
    ///
    /// Any failure here (bad encoding, wrong key, truncated ciphertext) is
    /// a corrupt-store condition.
    pub fn open(&self, master_key: &MasterKey) -> Result<Vec<u8>> {
        let ciphertext = STANDARD
            .decode(&self.ciphertext)
            .map_err(|e| Error::CorruptStore(format!("invalid ciphertext encoding: {}", e)))?;

        let nonce_bytes = STANDARD
            .decode(&self.nonce)
            .map_err(|e| Error::CorruptStore(format!("invalid nonce encoding: {}", e)))?;

        if nonce_bytes.len() != NONCE_SIZE {
            return Err(Error::CorruptStore(format!(
                "invalid nonce length: expected {}, got {}",
                NONCE_SIZE,
                nonce_bytes.len()
            )));
        }

        let nonce = Nonce::from_slice(&nonce_bytes);

        let cipher = Aes256Gcm::new_from_slice(master_key.as_bytes())
            .map_err(|e| Error::CorruptStore(e.to_string()))?;

        cipher.decrypt(nonce, ciphertext.as_ref()).map_err(|_| {
            Error::CorruptStore("decryption failed (wrong key or corrupted data)".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_master_key_generation() {
        let key1 = MasterKey::generate();
        let key2 = MasterKey::generate();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
        assert_eq!(key1.as_bytes().len(), AES_KEY_SIZE);
    }

    #[test]
    fn test_master_key_invalid_length() {
        let bytes = [42u8; 16];
        let result = MasterKey::from_bytes(&bytes);
        assert!(matches!(result, Err(Error::InvalidKeyLength { .. })));
    }

    #[test]
    fn test_master_key_hex_roundtrip() {
        let key = MasterKey::generate();
        let hex = key.to_hex();
        let restored = MasterKey::from_hex(&hex).unwrap();
        assert_eq!(key.as_bytes(), restored.as_bytes());
    }

    #[test]
    fn test_master_key_debug_redacted() {
        let key = MasterKey::generate();
        let debug = format!("{:?}", key);
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let master_key = MasterKey::generate();
        let plaintext = br#"{"models":[]}"#;

        let envelope = EncryptedEnvelope::seal(plaintext, &master_key).unwrap();
        let opened = envelope.open(&master_key).unwrap();

        assert_eq!(opened, plaintext);
    }

    #[test]
    fn test_open_with_wrong_key_is_corrupt_store() {
        let key1 = MasterKey::generate();
        let key2 = MasterKey::generate();

        let envelope = EncryptedEnvelope::seal(b"secret settings", &key1).unwrap();
        let result = envelope.open(&key2);

        assert!(matches!(result, Err(Error::CorruptStore(_))));
    }

    #[test]
    fn test_open_with_mangled_ciphertext_is_corrupt_store() {
        let key = MasterKey::generate();
        let mut envelope = EncryptedEnvelope::seal(b"secret settings", &key).unwrap();
        envelope.ciphertext = "not base64 at all!!!".to_string();

        assert!(matches!(envelope.open(&key), Err(Error::CorruptStore(_))));
    }

    #[test]
    fn test_fresh_nonce_per_seal() {
        let key = MasterKey::generate();
        let a = EncryptedEnvelope::seal(b"same plaintext", &key).unwrap();
        let b = EncryptedEnvelope::seal(b"same plaintext", &key).unwrap();
        assert_ne!(a.nonce, b.nonce);
    }
}
