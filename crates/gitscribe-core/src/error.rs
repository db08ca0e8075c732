//! Error types for gitscribe

use thiserror::Error;

/// Result type alias using gitscribe's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Gitscribe error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Resolution errors (E001-E099)
    #[error("Model '{0}' not found. Run `gitscribe models list` to see all models.")]
    ModelNotFound(String),

    #[error("Reference '{0}' matches more than one model. Use the model id instead.")]
    AmbiguousModel(String),

    // Namespace errors (E100-E199)
    #[error("A model with id or name '{0}' already exists.")]
    NameConflict(String),

    #[error("'{0}' is already in use as a model id, name, or alias.")]
    AliasConflict(String),

    // Store errors (E200-E299)
    #[error("Settings store is corrupt or unreadable: {0}")]
    CorruptStore(String),

    #[error("Keyring error: {0}")]
    KeyringError(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    // User errors (E300-E399)
    #[error("User cancelled operation")]
    UserCancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::ModelNotFound(_) => "E001",
            Self::AmbiguousModel(_) => "E002",
            Self::NameConflict(_) => "E100",
            Self::AliasConflict(_) => "E101",
            Self::CorruptStore(_) => "E200",
            Self::KeyringError(_) => "E201",
            Self::EncryptionFailed(_) => "E202",
            Self::InvalidKeyLength { .. } => "E203",
            Self::InvalidKeyFormat(_) => "E204",
            Self::UserCancelled => "E300",
            Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::ModelNotFound(_) => Some("gitscribe models list".to_string()),
            Self::AmbiguousModel(_) => Some("gitscribe models list".to_string()),
            Self::NameConflict(name) => Some(format!("gitscribe models show {}", name)),
            Self::AliasConflict(alias) => Some(format!("gitscribe models show {}", alias)),
            Self::CorruptStore(_) => {
                Some("Check GITSCRIBE_MASTER_KEY or the OS keyring entry".to_string())
            }
            _ => None,
        }
    }

    /// Whether this error is recoverable by retrying with different input
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::CorruptStore(_) | Self::Io(_))
    }
}
