//! Default-model healing
//!
//! A deleted profile can leave `default_model_id` dangling. Healing is
//! the explicit, user-driven repair: list the remaining profiles through
//! an injected prompter, let the user pick a new default (or abort), and
//! persist the choice. It is never run automatically and an abort leaves
//! the document untouched.

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::repository::SettingsRepository;
use crate::settings::ModelProfile;

/// Interactive capability consumed by the healer: present choices, read
/// a selection or abort, emit messages
#[async_trait]
pub trait ModelPrompter: Send + Sync {
    /// Present `choices` under `title`; `Ok(None)` means the user aborted
    async fn select(&self, title: &str, choices: &[String]) -> Result<Option<usize>>;

    /// Emit a message to the user
    fn notify(&self, message: &str);
}

/// Drives the dangling-default repair
pub struct DefaultModelHealer {
    prompter: Box<dyn ModelPrompter>,
}

impl DefaultModelHealer {
    /// Create a healer over an interactive prompter
    pub fn new(prompter: Box<dyn ModelPrompter>) -> Self {
        Self { prompter }
    }

    /// Repair the default reference if it dangles
    ///
    /// When the default already resolves the document is healthy and the
    /// current default is returned unchanged; an absent default has
    /// nothing to repair and reports failure without prompting. For a
    /// dangling default the user picks a replacement from the remaining
    /// profiles; on abort (or when no profile is left to pick) the
    /// dangling reference stays in place and the failure is reported to
    /// the caller.
    pub async fn heal(&self, repository: &SettingsRepository) -> Result<ModelProfile> {
        let settings = repository.load_settings().await?;

        // An absent default is healthy; healing only repairs a dangling one
        let Some(reference) = settings.default_model_id.clone() else {
            self.prompter
                .notify("No default model is set. Choose one with `gitscribe models set-default`.");
            return Err(Error::ModelNotFound("default".to_string()));
        };

        if let Some(profile) = settings.find_by_id(&reference) {
            return Ok(profile.clone());
        }

        if settings.models.is_empty() {
            self.prompter
                .notify("No model profiles are configured. Add one with `gitscribe models add`.");
            return Err(Error::ModelNotFound(reference));
        }

        let choices: Vec<String> = settings
            .models
            .iter()
            .map(|m| format!("{} ({}/{})", m.name, m.provider, m.model_id))
            .collect();

        let selection = self
            .prompter
            .select("The default model no longer exists. Pick a new default", &choices)
            .await?;

        match selection {
            Some(index) => {
                let chosen_id = settings.models[index].id.clone();
                let target = repository.set_default_model(&chosen_id).await?;
                self.prompter
                    .notify(&format!("Default model set to '{}'.", target.name));
                tracing::info!(model = %target.name, "healed dangling default");
                Ok(target)
            }
            None => {
                self.prompter.notify("Default model left unchanged.");
                Err(Error::UserCancelled)
            }
        }
    }
}
