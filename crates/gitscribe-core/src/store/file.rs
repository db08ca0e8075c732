//! Encrypted settings file storage
//!
//! One encrypted file per user holds the whole settings document. Writes
//! go through a uniquely-named temporary sibling and an atomic rename, so
//! a crash mid-write never leaves a truncated or partially-encrypted
//! file. A missing file is first-run behavior and yields an empty
//! document; an unreadable one is fatal.

use std::env;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::crypto::{EncryptedEnvelope, MasterKey};
use super::keyring::{KeyringMasterKeyRepository, MasterKeyRepository, master_key_from_env};
use crate::error::{Error, Result};
use crate::settings::Settings;

/// Settings file name within the config directory
const SETTINGS_FILE: &str = "settings.enc";

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "GITSCRIBE_CONFIG_DIR";

/// Encrypted on-disk store for the settings document
pub struct EncryptedStore {
    path: PathBuf,
    master_keys: Box<dyn MasterKeyRepository>,
}

impl EncryptedStore {
    /// Create a store over an explicit file path and key repository
    pub fn new(path: impl Into<PathBuf>, master_keys: Box<dyn MasterKeyRepository>) -> Self {
        Self {
            path: path.into(),
            master_keys,
        }
    }

    /// Create a store at the per-user default location, keyed from the
    /// OS keyring
    pub fn at_default_location() -> Result<Self> {
        Ok(Self::new(
            Self::settings_path()?,
            Box::new(KeyringMasterKeyRepository::new()),
        ))
    }

    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var(CONFIG_DIR_ENV) {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| {
                    Error::Io(std::io::Error::new(
                        ErrorKind::NotFound,
                        "could not determine config directory",
                    ))
                })?
                .join("gitscribe")
        };
        Ok(dir)
    }

    /// Get the settings file path
    pub fn settings_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(SETTINGS_FILE))
    }

    /// Path this store reads and writes
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the settings document
    ///
    /// A missing file yields a fresh, empty document. Anything else that
    /// prevents producing the stored document (unreadable envelope,
    /// missing key material, failed decryption, failed parse) is
    /// `Error::CorruptStore`.
    pub async fn load(&self) -> Result<Settings> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no settings file, starting empty");
                return Ok(Settings::default());
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let envelope: EncryptedEnvelope = serde_json::from_slice(&raw)
            .map_err(|e| Error::CorruptStore(format!("invalid envelope: {}", e)))?;

        let master_key = self.master_key().await?.ok_or_else(|| {
            Error::CorruptStore(
                "settings file exists but no master key is available".to_string(),
            )
        })?;

        let plaintext = envelope.open(&master_key)?;

        serde_json::from_slice(&plaintext)
            .map_err(|e| Error::CorruptStore(format!("invalid settings document: {}", e)))
    }

    /// Save the settings document
    ///
    /// Initializes the master key on first save. The write lands in a
    /// temporary sibling first and replaces the target atomically; the
    /// previous file stays readable until the rename completes.
    pub async fn save(&self, settings: &Settings) -> Result<()> {
        let master_key = self.master_key_or_init().await?;

        let plaintext = serde_json::to_vec(settings)
            .map_err(|e| Error::EncryptionFailed(format!("serialization failed: {}", e)))?;
        let envelope = EncryptedEnvelope::seal(&plaintext, &master_key)?;
        let contents = serde_json::to_vec_pretty(&envelope)
            .map_err(|e| Error::EncryptionFailed(format!("serialization failed: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| SETTINGS_FILE.to_string());
        let temp_path = self.path.with_file_name(format!(
            ".{}.tmp-{}",
            file_name,
            uuid::Uuid::new_v4()
        ));

        tokio::fs::write(&temp_path, &contents).await?;

        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(Error::Io(e));
        }

        tracing::debug!(path = %self.path.display(), models = settings.models.len(), "settings saved");
        Ok(())
    }

    /// Resolve the master key without creating one
    async fn master_key(&self) -> Result<Option<MasterKey>> {
        if let Some(key) = master_key_from_env()? {
            return Ok(Some(key));
        }
        self.master_keys.get().await
    }

    /// Resolve the master key, minting and storing one if none exists yet
    async fn master_key_or_init(&self) -> Result<MasterKey> {
        if let Some(key) = self.master_key().await? {
            return Ok(key);
        }
        let key = MasterKey::generate();
        self.master_keys.store(&key).await?;
        tracing::info!("generated and stored new master encryption key");
        Ok(key)
    }
}
