//! Gitscribe Core Library
//!
//! This crate provides the configuration core for gitscribe, including:
//! - Encrypted settings storage (AES-256-GCM, OS keyring master key)
//! - The settings document and model profile entities
//! - Tiered model reference resolution (id, name, alias, substring)
//! - Profile lifecycle and alias management
//! - Default-model healing through an injected interactive prompt

pub mod error;
pub mod healer;
pub mod lifecycle;
pub mod repository;
pub mod resolver;
pub mod settings;
pub mod store;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::healer::{DefaultModelHealer, ModelPrompter};
    pub use crate::repository::SettingsRepository;
    pub use crate::settings::{ModelProfile, Settings};
}
