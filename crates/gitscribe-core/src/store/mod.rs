//! Encrypted persistence for the settings document
//!
//! # Architecture
//!
//! - `crypto` — AES-256-GCM master key and envelope
//! - `keyring` — master key storage (OS keyring, env override, test double)
//! - `file` — the encrypted settings file with atomic-replace writes
//!
//! Everything outside this module treats the on-disk format as opaque.

pub mod crypto;
pub mod file;
pub mod keyring;

pub use crypto::{EncryptedEnvelope, MasterKey};
pub use file::{CONFIG_DIR_ENV, EncryptedStore};
pub use keyring::{
    InMemoryMasterKeyRepository, KeyringMasterKeyRepository, MASTER_KEY_ENV, MasterKeyRepository,
};
