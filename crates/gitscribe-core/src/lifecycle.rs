//! Model profile lifecycle and alias management
//!
//! All operations mutate an in-memory settings document and enforce the
//! single namespace rule: ids, names, and aliases share one
//! case-insensitive namespace across the whole document. Persistence is
//! the repository's job; a failed check here leaves the document exactly
//! as it was.

use chrono::Utc;

use crate::error::{Error, Result};
use crate::resolver::{Resolution, resolve};
use crate::settings::{ModelProfile, Settings, eq_fold};

/// Add a new profile
///
/// Fails when the profile's id, name, or any alias it carries collides
/// with an existing id, name, or alias.
pub fn add_model(settings: &mut Settings, profile: ModelProfile) -> Result<()> {
    if settings.namespace_conflict(&profile.id, None) {
        return Err(Error::NameConflict(profile.id));
    }
    if settings.namespace_conflict(&profile.name, None) {
        return Err(Error::NameConflict(profile.name));
    }
    if let Some(alias) = first_bad_alias(settings, &profile, None) {
        return Err(Error::AliasConflict(alias));
    }

    settings.models.push(profile);
    Ok(())
}

/// Replace a profile matched by its id
///
/// The namespace rule is re-validated against the OTHER profiles, so a
/// no-op rename to the profile's current name succeeds. `created_at` is
/// preserved; `updated_at` is bumped.
pub fn update_model(settings: &mut Settings, profile: ModelProfile) -> Result<()> {
    let index = settings
        .models
        .iter()
        .position(|m| eq_fold(&m.id, &profile.id))
        .ok_or_else(|| Error::ModelNotFound(profile.id.clone()))?;

    if settings.namespace_conflict(&profile.name, Some(&profile.id)) {
        return Err(Error::NameConflict(profile.name));
    }
    if let Some(alias) = first_bad_alias(settings, &profile, Some(&profile.id)) {
        return Err(Error::AliasConflict(alias));
    }

    let created_at = settings.models[index].created_at;
    settings.models[index] = ModelProfile {
        created_at,
        updated_at: Utc::now(),
        ..profile
    };
    Ok(())
}

/// Remove the profile `name_or_id` resolves to
///
/// A default pointing at the removed profile is left dangling; healing
/// is a separate, explicit step.
pub fn delete_model(settings: &mut Settings, name_or_id: &str) -> Result<ModelProfile> {
    let target = resolve_ref(settings, name_or_id)?;
    let index = settings
        .models
        .iter()
        .position(|m| m.id == target.id)
        .ok_or_else(|| Error::ModelNotFound(name_or_id.to_string()))?;
    Ok(settings.models.remove(index))
}

/// Point the default at the profile `name_or_id` resolves to
pub fn set_default_model(settings: &mut Settings, name_or_id: &str) -> Result<ModelProfile> {
    let target = resolve_ref(settings, name_or_id)?;
    settings.default_model_id = Some(target.id.clone());
    Ok(target)
}

/// Attach an alias to the profile `profile_ref` resolves to
///
/// The alias must be free in the whole document, the target profile
/// included (no duplicate self-alias).
pub fn add_alias(settings: &mut Settings, profile_ref: &str, alias: &str) -> Result<()> {
    let target = resolve_ref(settings, profile_ref)?;

    if settings.namespace_conflict(alias, None) {
        return Err(Error::AliasConflict(alias.to_string()));
    }

    let profile = settings
        .models
        .iter_mut()
        .find(|m| m.id == target.id)
        .ok_or_else(|| Error::ModelNotFound(profile_ref.to_string()))?;
    profile.aliases.push(alias.to_string());
    profile.updated_at = Utc::now();
    Ok(())
}

/// Detach an alias from the profile `profile_ref` resolves to
///
/// Removing an alias the profile does not carry is a no-op success; an
/// unresolvable profile is still an error.
pub fn remove_alias(settings: &mut Settings, profile_ref: &str, alias: &str) -> Result<()> {
    let target = resolve_ref(settings, profile_ref)?;

    let profile = settings
        .models
        .iter_mut()
        .find(|m| m.id == target.id)
        .ok_or_else(|| Error::ModelNotFound(profile_ref.to_string()))?;

    let before = profile.aliases.len();
    profile.aliases.retain(|a| !eq_fold(a, alias));
    if profile.aliases.len() != before {
        profile.updated_at = Utc::now();
    }
    Ok(())
}

/// First alias of `profile` that violates the namespace rule, if any
///
/// Covers collisions with other profiles, with the profile's own id and
/// name, and duplicates within the incoming alias list itself.
fn first_bad_alias(
    settings: &Settings,
    profile: &ModelProfile,
    exclude_id: Option<&str>,
) -> Option<String> {
    for (index, alias) in profile.aliases.iter().enumerate() {
        let duplicate_within = profile.aliases[..index].iter().any(|a| eq_fold(a, alias));
        if settings.namespace_conflict(alias, exclude_id)
            || eq_fold(alias, &profile.id)
            || eq_fold(alias, &profile.name)
            || duplicate_within
        {
            return Some(alias.clone());
        }
    }
    None
}

/// Resolve a profile reference to exactly one profile
fn resolve_ref(settings: &Settings, reference: &str) -> Result<ModelProfile> {
    match resolve(settings, reference) {
        Resolution::One(profile) => Ok(profile),
        Resolution::None => Err(Error::ModelNotFound(reference.to_string())),
        Resolution::Many(_) => Err(Error::AmbiguousModel(reference.to_string())),
    }
}
