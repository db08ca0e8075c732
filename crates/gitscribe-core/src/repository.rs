//! Settings repository
//!
//! The single reader/writer boundary over the encrypted store. Every
//! mutation is one load → validate/mutate in memory → save unit; when a
//! validation fails nothing reaches disk, so the persisted document never
//! holds a partially-applied change. Nothing outside this type calls the
//! store directly.

use crate::error::{Error, Result};
use crate::lifecycle;
use crate::resolver::{self, Resolution};
use crate::settings::{ModelProfile, Settings};
use crate::store::EncryptedStore;

/// Repository over the encrypted settings document
pub struct SettingsRepository {
    store: EncryptedStore,
}

impl SettingsRepository {
    /// Create a repository over an explicit store
    pub fn new(store: EncryptedStore) -> Self {
        Self { store }
    }

    /// Create a repository at the per-user default location
    pub fn at_default_location() -> Result<Self> {
        Ok(Self::new(EncryptedStore::at_default_location()?))
    }

    /// Load the settings document
    pub async fn load_settings(&self) -> Result<Settings> {
        self.store.load().await
    }

    /// Persist the settings document
    pub async fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.store.save(settings).await
    }

    /// All profiles, in document order
    pub async fn list_models(&self) -> Result<Vec<ModelProfile>> {
        Ok(self.load_settings().await?.models)
    }

    /// Resolve `name_or_id` through the exact tiers (id, name, alias)
    ///
    /// Returns `None` when nothing matches; never guesses via substring
    /// matching.
    pub async fn get_model(&self, name_or_id: &str) -> Result<Option<ModelProfile>> {
        let settings = self.load_settings().await?;
        match resolver::resolve(&settings, name_or_id) {
            Resolution::One(profile) => Ok(Some(profile)),
            Resolution::None => Ok(None),
            Resolution::Many(_) => Err(Error::AmbiguousModel(name_or_id.to_string())),
        }
    }

    /// The profile the default reference points at, if it resolves
    ///
    /// `None` covers both an absent default and a dangling one; the
    /// caller decides whether to offer healing.
    pub async fn get_default_model(&self) -> Result<Option<ModelProfile>> {
        let settings = self.load_settings().await?;
        Ok(settings
            .default_model_id
            .as_deref()
            .and_then(|id| settings.find_by_id(id))
            .cloned())
    }

    /// Substring lookup over ids, names, and aliases
    pub async fn get_models_by_partial_match(&self, term: &str) -> Result<Vec<ModelProfile>> {
        let settings = self.load_settings().await?;
        Ok(resolver::partial_matches(&settings, term))
    }

    /// Add a profile
    pub async fn add_model(&self, profile: ModelProfile) -> Result<()> {
        let mut settings = self.load_settings().await?;
        let name = profile.name.clone();
        lifecycle::add_model(&mut settings, profile)?;
        self.save_settings(&settings).await?;
        tracing::info!(model = %name, "added model profile");
        Ok(())
    }

    /// Replace a profile matched by id
    pub async fn update_model(&self, profile: ModelProfile) -> Result<()> {
        let mut settings = self.load_settings().await?;
        let name = profile.name.clone();
        lifecycle::update_model(&mut settings, profile)?;
        self.save_settings(&settings).await?;
        tracing::info!(model = %name, "updated model profile");
        Ok(())
    }

    /// Delete the profile `name_or_id` resolves to
    ///
    /// A default pointing at the deleted profile stays in the document,
    /// dangling, until healed or reassigned.
    pub async fn delete_model(&self, name_or_id: &str) -> Result<ModelProfile> {
        let mut settings = self.load_settings().await?;
        let removed = lifecycle::delete_model(&mut settings, name_or_id)?;
        self.save_settings(&settings).await?;
        tracing::info!(model = %removed.name, "deleted model profile");
        Ok(removed)
    }

    /// Point the default at the profile `name_or_id` resolves to
    pub async fn set_default_model(&self, name_or_id: &str) -> Result<ModelProfile> {
        let mut settings = self.load_settings().await?;
        let target = lifecycle::set_default_model(&mut settings, name_or_id)?;
        self.save_settings(&settings).await?;
        tracing::info!(model = %target.name, "set default model");
        Ok(target)
    }

    /// Attach an alias
    pub async fn add_alias(&self, profile_ref: &str, alias: &str) -> Result<()> {
        let mut settings = self.load_settings().await?;
        lifecycle::add_alias(&mut settings, profile_ref, alias)?;
        self.save_settings(&settings).await?;
        tracing::info!(model = %profile_ref, alias = %alias, "added alias");
        Ok(())
    }

    /// Detach an alias (idempotent)
    pub async fn remove_alias(&self, profile_ref: &str, alias: &str) -> Result<()> {
        let mut settings = self.load_settings().await?;
        lifecycle::remove_alias(&mut settings, profile_ref, alias)?;
        self.save_settings(&settings).await?;
        tracing::info!(model = %profile_ref, alias = %alias, "removed alias");
        Ok(())
    }
}
