//! Settings document and model profile entities
//!
//! The settings document is the root aggregate: an ordered list of model
//! profiles plus an optional default reference. Uniqueness of ids, names,
//! and aliases is case-insensitive and spans the whole document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One named AI-model configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ModelProfile {
    /// Stable, system-generated unique identifier
    pub id: String,

    /// Unique, user-chosen label
    pub name: String,

    /// Backend provider identifier (e.g. "openai", "anthropic")
    pub provider: String,

    /// Provider-side endpoint kind, uninterpreted by this core
    pub kind: String,

    /// Provider-side model identifier, uninterpreted by this core
    pub model_id: String,

    /// Alternative lookup names; case-insensitive-unique across the document
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Credential for the provider; lives only inside the encrypted document
    pub api_key: String,

    /// When this profile was created
    pub created_at: DateTime<Utc>,

    /// When this profile was last updated
    pub updated_at: DateTime<Utc>,
}

impl ModelProfile {
    /// Create a new profile with a generated id and fresh timestamps
    pub fn new(
        name: impl Into<String>,
        provider: impl Into<String>,
        kind: impl Into<String>,
        model_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            provider: provider.into(),
            kind: kind.into(),
            model_id: model_id.into(),
            aliases: Vec::new(),
            api_key: api_key.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this profile carries the given alias (case-insensitive)
    pub fn has_alias(&self, alias: &str) -> bool {
        self.aliases.iter().any(|a| eq_fold(a, alias))
    }

    /// Redacted credential preview (last 4 chars), safe for display
    pub fn redacted_api_key(&self) -> String {
        if self.api_key.len() > 4 {
            format!("***{}", &self.api_key[self.api_key.len() - 4..])
        } else {
            "***".to_string()
        }
    }
}

impl std::fmt::Debug for ModelProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelProfile")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("provider", &self.provider)
            .field("kind", &self.kind)
            .field("model_id", &self.model_id)
            .field("aliases", &self.aliases)
            .field("api_key", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// The persisted settings document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Model profiles in insertion order
    #[serde(default)]
    pub models: Vec<ModelProfile>,

    /// Id of the default profile; may be absent or dangling after a delete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model_id: Option<String>,
}

impl Settings {
    /// Find a profile by exact id (case-insensitive)
    pub fn find_by_id(&self, id: &str) -> Option<&ModelProfile> {
        self.models.iter().find(|m| eq_fold(&m.id, id))
    }

    /// Whether `candidate` collides with any id, name, or alias in the
    /// document (case-insensitive). Profiles whose id equals `exclude_id`
    /// are skipped, so updates can keep their own identifiers.
    pub fn namespace_conflict(&self, candidate: &str, exclude_id: Option<&str>) -> bool {
        self.models
            .iter()
            .filter(|m| exclude_id.is_none_or(|ex| !eq_fold(&m.id, ex)))
            .any(|m| {
                eq_fold(&m.id, candidate)
                    || eq_fold(&m.name, candidate)
                    || m.has_alias(candidate)
            })
    }

    /// Whether the default reference is set but no longer resolves
    pub fn default_is_dangling(&self) -> bool {
        match &self.default_model_id {
            Some(id) => self.find_by_id(id).is_none(),
            None => false,
        }
    }
}

/// Case-insensitive string comparison used for every identifier check
pub(crate) fn eq_fold(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, name: &str, aliases: &[&str]) -> ModelProfile {
        let mut p = ModelProfile::new(name, "openai", "chat", "gpt-4o", "sk-test-12345");
        p.id = id.to_string();
        p.aliases = aliases.iter().map(|a| a.to_string()).collect();
        p
    }

    #[test]
    fn test_namespace_conflict_covers_ids_names_and_aliases() {
        let settings = Settings {
            models: vec![profile("m1", "fast", &["f"])],
            default_model_id: None,
        };

        assert!(settings.namespace_conflict("m1", None));
        assert!(settings.namespace_conflict("FAST", None));
        assert!(settings.namespace_conflict("F", None));
        assert!(!settings.namespace_conflict("slow", None));
    }

    #[test]
    fn test_namespace_conflict_can_exclude_own_profile() {
        let settings = Settings {
            models: vec![profile("m1", "fast", &[]), profile("m2", "slow", &[])],
            default_model_id: None,
        };

        // A rename to its own current name is not a conflict
        assert!(!settings.namespace_conflict("fast", Some("m1")));
        // But to another profile's name it is
        assert!(settings.namespace_conflict("slow", Some("m1")));
    }

    #[test]
    fn test_default_is_dangling() {
        let mut settings = Settings {
            models: vec![profile("m1", "fast", &[])],
            default_model_id: Some("m1".to_string()),
        };
        assert!(!settings.default_is_dangling());

        settings.models.clear();
        assert!(settings.default_is_dangling());

        settings.default_model_id = None;
        assert!(!settings.default_is_dangling());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let p = profile("m1", "fast", &[]);
        let debug = format!("{:?}", p);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk-test-12345"));
    }

    #[test]
    fn test_redacted_api_key_preview() {
        let p = profile("m1", "fast", &[]);
        assert_eq!(p.redacted_api_key(), "***2345");

        let mut short = p.clone();
        short.api_key = "abc".to_string();
        assert_eq!(short.redacted_api_key(), "***");
    }

    #[test]
    fn test_settings_roundtrip_through_json() {
        let settings = Settings {
            models: vec![profile("m1", "fast", &["f"])],
            default_model_id: Some("m1".to_string()),
        };

        let json = serde_json::to_string(&settings).unwrap();
        let restored: Settings = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.models.len(), 1);
        assert_eq!(restored.models[0].name, "fast");
        assert_eq!(restored.models[0].aliases, vec!["f".to_string()]);
        assert_eq!(restored.default_model_id.as_deref(), Some("m1"));
    }

    #[test]
    fn test_absent_default_is_omitted_from_json() {
        let settings = Settings::default();
        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("default_model_id"));
    }
}
