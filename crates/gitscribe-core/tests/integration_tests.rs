//! Gitscribe Core Integration Tests
//!
//! End-to-end flows against a real encrypted store in a temp directory:
//! persistence round trips, the delete-then-dangling-default scenario,
//! and interactive healing with a scripted prompter.

use async_trait::async_trait;
use gitscribe_core::{
    Error, Result,
    healer::{DefaultModelHealer, ModelPrompter},
    repository::SettingsRepository,
    settings::{ModelProfile, Settings},
    store::{EncryptedStore, InMemoryMasterKeyRepository},
};
use tempfile::TempDir;

struct ScriptedPrompter {
    selection: Option<usize>,
}

#[async_trait]
impl ModelPrompter for ScriptedPrompter {
    async fn select(&self, _title: &str, _choices: &[String]) -> Result<Option<usize>> {
        Ok(self.selection)
    }

    fn notify(&self, _message: &str) {}
}

fn repo_in(dir: &TempDir) -> SettingsRepository {
    SettingsRepository::new(EncryptedStore::new(
        dir.path().join("settings.enc"),
        Box::new(InMemoryMasterKeyRepository::new()),
    ))
}

fn profile(name: &str, aliases: &[&str]) -> ModelProfile {
    let mut p = ModelProfile::new(name, "anthropic", "chat", "claude-sonnet-4", "sk-ant-123456");
    p.aliases = aliases.iter().map(|a| a.to_string()).collect();
    p
}

#[tokio::test]
async fn test_settings_roundtrip_including_empty_fields() {
    let dir = TempDir::new().unwrap();
    let repo = repo_in(&dir);

    // Empty alias set, absent default
    repo.add_model(profile("alpha", &[])).await.unwrap();

    let settings = repo.load_settings().await.unwrap();
    assert_eq!(settings.models.len(), 1);
    assert!(settings.models[0].aliases.is_empty());
    assert!(settings.default_model_id.is_none());

    // Save and reload the full document unchanged
    repo.save_settings(&settings).await.unwrap();
    let reloaded = repo.load_settings().await.unwrap();
    assert_eq!(reloaded.models[0].id, settings.models[0].id);
    assert_eq!(reloaded.models[0].api_key, settings.models[0].api_key);
}

#[tokio::test]
async fn test_resolution_precedence_end_to_end() {
    let dir = TempDir::new().unwrap();
    let repo = repo_in(&dir);

    let mut m1 = profile("fast", &["f"]);
    m1.id = "m1".to_string();
    repo.save_settings(&Settings {
        models: vec![m1, profile("fancy", &[])],
        default_model_id: None,
    })
    .await
    .unwrap();

    for reference in ["m1", "fast", "f"] {
        let hit = repo.get_model(reference).await.unwrap().unwrap();
        assert_eq!(hit.id, "m1");
    }

    // Exact lookup must fail rather than guess from substrings
    assert!(repo.get_model("fan").await.unwrap().is_none());
    // The explicit partial query finds it
    let hits = repo.get_models_by_partial_match("fan").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "fancy");
}

#[tokio::test]
async fn test_delete_default_then_heal_with_selection() {
    let dir = TempDir::new().unwrap();
    let repo = repo_in(&dir);

    repo.add_model(profile("alpha", &["al"])).await.unwrap();
    repo.add_model(profile("beta", &[])).await.unwrap();
    repo.set_default_model("alpha").await.unwrap();

    repo.delete_model("alpha").await.unwrap();

    // Dangling default persists and the lookup comes back empty
    assert!(repo.load_settings().await.unwrap().default_is_dangling());
    assert!(repo.get_default_model().await.unwrap().is_none());

    // Healing with a user selection repairs and persists the default
    let healer = DefaultModelHealer::new(Box::new(ScriptedPrompter { selection: Some(0) }));
    let healed = healer.heal(&repo).await.unwrap();
    assert_eq!(healed.name, "beta");

    let default = repo.get_default_model().await.unwrap().unwrap();
    assert_eq!(default.name, "beta");
}

#[tokio::test]
async fn test_delete_last_model_then_heal_reports_failure() {
    let dir = TempDir::new().unwrap();
    let repo = repo_in(&dir);

    // One model, it is the default, then it is deleted
    let mut a1 = profile("alpha", &["al"]);
    a1.id = "a1".to_string();
    repo.save_settings(&Settings {
        models: vec![a1],
        default_model_id: Some("a1".to_string()),
    })
    .await
    .unwrap();

    repo.delete_model("a1").await.unwrap();
    assert!(repo.get_default_model().await.unwrap().is_none());

    let healer = DefaultModelHealer::new(Box::new(ScriptedPrompter { selection: Some(0) }));
    let result = healer.heal(&repo).await;
    assert!(matches!(result, Err(Error::ModelNotFound(_))));

    // Document unchanged: no models, default still dangling at "a1"
    let settings = repo.load_settings().await.unwrap();
    assert!(settings.models.is_empty());
    assert_eq!(settings.default_model_id.as_deref(), Some("a1"));
}

#[tokio::test]
async fn test_heal_abort_keeps_document_unchanged() {
    let dir = TempDir::new().unwrap();
    let repo = repo_in(&dir);

    repo.add_model(profile("alpha", &[])).await.unwrap();
    repo.set_default_model("alpha").await.unwrap();
    repo.delete_model("alpha").await.unwrap();
    repo.add_model(profile("beta", &[])).await.unwrap();

    let before = repo.load_settings().await.unwrap();

    let healer = DefaultModelHealer::new(Box::new(ScriptedPrompter { selection: None }));
    let result = healer.heal(&repo).await;
    assert!(matches!(result, Err(Error::UserCancelled)));

    let after = repo.load_settings().await.unwrap();
    assert_eq!(after.default_model_id, before.default_model_id);
    assert_eq!(after.models.len(), before.models.len());
}

#[tokio::test]
async fn test_conflicting_add_never_touches_disk() {
    let dir = TempDir::new().unwrap();
    let repo = repo_in(&dir);

    repo.add_model(profile("alpha", &["al"])).await.unwrap();

    // Name collides with an existing alias
    let result = repo.add_model(profile("al", &[])).await;
    assert!(matches!(result, Err(Error::NameConflict(_))));

    let settings = repo.load_settings().await.unwrap();
    assert_eq!(settings.models.len(), 1);
    assert_eq!(settings.models[0].name, "alpha");
}
