//! Tiered model reference resolution
//!
//! A user-supplied reference resolves through four tiers, all
//! case-insensitive; the first tier with any hit wins and lower tiers are
//! never consulted:
//!
//! 1. exact `id`
//! 2. exact `name`
//! 3. exact alias
//! 4. substring over `id`, `name`, and every alias
//!
//! Tier 4 serves only the explicit partial-match query. Exact resolution
//! fails rather than guessing when tiers 1-3 come up empty.

use crate::settings::{ModelProfile, Settings, eq_fold};

/// Outcome of resolving a model reference
#[derive(Debug, Clone)]
pub enum Resolution {
    /// No profile matched
    None,
    /// Exactly one profile matched
    One(ModelProfile),
    /// More than one profile matched; cannot happen while the document
    /// invariants hold, kept as a defensive branch
    Many(Vec<ModelProfile>),
}

impl Resolution {
    /// The single match, if there is exactly one
    pub fn into_single(self) -> Option<ModelProfile> {
        match self {
            Resolution::One(profile) => Some(profile),
            _ => None,
        }
    }
}

/// Resolve `name_or_id` through tiers 1-3
pub fn resolve(settings: &Settings, name_or_id: &str) -> Resolution {
    let by_id: Vec<_> = settings
        .models
        .iter()
        .filter(|m| eq_fold(&m.id, name_or_id))
        .cloned()
        .collect();
    if !by_id.is_empty() {
        return collapse(by_id);
    }

    let by_name: Vec<_> = settings
        .models
        .iter()
        .filter(|m| eq_fold(&m.name, name_or_id))
        .cloned()
        .collect();
    if !by_name.is_empty() {
        return collapse(by_name);
    }

    let by_alias: Vec<_> = settings
        .models
        .iter()
        .filter(|m| m.has_alias(name_or_id))
        .cloned()
        .collect();
    if !by_alias.is_empty() {
        return collapse(by_alias);
    }

    Resolution::None
}

/// Tier 4: every profile whose id, name, or any alias contains `term`,
/// in document order, each profile at most once
pub fn partial_matches(settings: &Settings, term: &str) -> Vec<ModelProfile> {
    let needle = term.to_lowercase();
    settings
        .models
        .iter()
        .filter(|m| {
            m.id.to_lowercase().contains(&needle)
                || m.name.to_lowercase().contains(&needle)
                || m.aliases.iter().any(|a| a.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

fn collapse(mut hits: Vec<ModelProfile>) -> Resolution {
    match hits.len() {
        0 => Resolution::None,
        1 => Resolution::One(hits.remove(0)),
        _ => Resolution::Many(hits),
    }
}
