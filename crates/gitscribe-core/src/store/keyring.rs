//! Master key storage behind the OS keyring
//!
//! The master encryption key lives in the operating system's credential
//! store (macOS Keychain, Windows Credential Manager, Linux Secret
//! Service). A `GITSCRIBE_MASTER_KEY` environment variable (hex) takes
//! precedence, for headless hosts without a secret service.

use async_trait::async_trait;
use keyring::Entry;

use super::crypto::MasterKey;
use crate::error::{Error, Result};

/// Service name used for keyring storage
const KEYRING_SERVICE: &str = "gitscribe";

/// Default username for keyring entries
const KEYRING_USER: &str = "master-encryption-key";

/// Environment variable that overrides the keyring as the key source
pub const MASTER_KEY_ENV: &str = "GITSCRIBE_MASTER_KEY";

/// Storage abstraction for the master encryption key
#[async_trait]
pub trait MasterKeyRepository: Send + Sync {
    async fn store(&self, key: &MasterKey) -> Result<()>;
    async fn get(&self) -> Result<Option<MasterKey>>;
    async fn delete(&self) -> Result<()>;
}

/// Resolve the master key from the environment override, if set
///
/// An invalid value is an error rather than a silent fallthrough: a typo
/// must not cause a new key to be minted over an existing store.
pub fn master_key_from_env() -> Result<Option<MasterKey>> {
    match std::env::var(MASTER_KEY_ENV) {
        Ok(hex) => MasterKey::from_hex(&hex).map(Some),
        Err(_) => Ok(None),
    }
}

/// OS keyring-based master key repository
#[derive(Debug, Clone)]
pub struct KeyringMasterKeyRepository {
    service: String,
    user: String,
}

impl Default for KeyringMasterKeyRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyringMasterKeyRepository {
    /// Create a new keyring repository with default service/user
    pub fn new() -> Self {
        Self {
            service: KEYRING_SERVICE.to_string(),
            user: KEYRING_USER.to_string(),
        }
    }

    /// Create a keyring repository with custom service/user names
    pub fn with_names(service: &str, user: &str) -> Self {
        Self {
            service: service.to_string(),
            user: user.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service, &self.user)
            .map_err(|e| Error::KeyringError(format!("Failed to create keyring entry: {}", e)))
    }
}

#[async_trait]
impl MasterKeyRepository for KeyringMasterKeyRepository {
    async fn store(&self, key: &MasterKey) -> Result<()> {
        let entry = self.entry()?;
        let hex_key = key.to_hex();

        // keyring operations are blocking, so we spawn a blocking task
        tokio::task::spawn_blocking(move || {
            entry
                .set_password(&hex_key)
                .map_err(|e| Error::KeyringError(format!("Failed to store master key: {}", e)))
        })
        .await
        .map_err(|e| Error::KeyringError(format!("Task join error: {}", e)))?
    }

    async fn get(&self) -> Result<Option<MasterKey>> {
        let entry = self.entry()?;

        let result = tokio::task::spawn_blocking(move || entry.get_password())
            .await
            .map_err(|e| Error::KeyringError(format!("Task join error: {}", e)))?;

        match result {
            Ok(hex_key) => Ok(Some(MasterKey::from_hex(&hex_key)?)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(Error::KeyringError(format!(
                "Failed to retrieve master key: {}",
                e
            ))),
        }
    }

    async fn delete(&self) -> Result<()> {
        let entry = self.entry()?;

        tokio::task::spawn_blocking(move || match entry.delete_password() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()), // Already deleted
            Err(e) => Err(Error::KeyringError(format!(
                "Failed to delete master key: {}",
                e
            ))),
        })
        .await
        .map_err(|e| Error::KeyringError(format!("Task join error: {}", e)))?
    }
}

/// In-memory master key repository for testing
#[derive(Debug, Default)]
pub struct InMemoryMasterKeyRepository {
    key: std::sync::Mutex<Option<MasterKey>>,
}

impl InMemoryMasterKeyRepository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        Self {
            key: std::sync::Mutex::new(None),
        }
    }

    /// Create a repository pre-seeded with a key
    pub fn with_key(key: MasterKey) -> Self {
        Self {
            key: std::sync::Mutex::new(Some(key)),
        }
    }
}

#[async_trait]
impl MasterKeyRepository for InMemoryMasterKeyRepository {
    async fn store(&self, key: &MasterKey) -> Result<()> {
        *self.key.lock().unwrap() = Some(key.clone());
        Ok(())
    }

    async fn get(&self) -> Result<Option<MasterKey>> {
        Ok(self.key.lock().unwrap().clone())
    }

    async fn delete(&self) -> Result<()> {
        *self.key.lock().unwrap() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_repository() {
        let repo = InMemoryMasterKeyRepository::new();

        assert!(repo.get().await.unwrap().is_none());

        let key = MasterKey::generate();
        repo.store(&key).await.unwrap();

        let retrieved = repo.get().await.unwrap().unwrap();
        assert_eq!(key.as_bytes(), retrieved.as_bytes());

        repo.delete().await.unwrap();
        assert!(repo.get().await.unwrap().is_none());
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        // from_hex is what the env path goes through; a malformed value
        // must surface as an error, not mint a fresh key
        assert!(MasterKey::from_hex("not-hex").is_err());
        assert!(MasterKey::from_hex("abcd").is_err()); // wrong length
    }

    // Note: Keyring tests require a running secret service and are
    // typically run manually or in integration test environments
    #[tokio::test]
    #[ignore = "Requires OS keyring access"]
    async fn test_keyring_repository() {
        let repo = KeyringMasterKeyRepository::with_names("gitscribe-test", "test-key");

        let _ = repo.delete().await;
        assert!(repo.get().await.unwrap().is_none());

        let key = MasterKey::generate();
        repo.store(&key).await.unwrap();

        let retrieved = repo.get().await.unwrap().unwrap();
        assert_eq!(key.as_bytes(), retrieved.as_bytes());

        repo.delete().await.unwrap();
        assert!(repo.get().await.unwrap().is_none());
    }
}
