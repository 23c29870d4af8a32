//! Vault module — encrypted secret storage.
//!
//! This module provides:
//! - Record types, views, and add/update inputs (`secret`)
//! - The JSON vault document with atomic persistence (`format`)
//! - Metadata-only search and filter predicates (`query`)
//! - `VaultEngine`, the lock/unlock state machine and all operations (`store`)

pub mod format;
pub mod query;
pub mod secret;
pub mod store;

// Re-export the most commonly used items.
pub use format::{VaultFile, VaultMetadata, CURRENT_VERSION};
pub use secret::{NewSecret, RevealedSecret, SecretInfo, SecretUpdate, StoredSecret};
pub use store::{ImportOutcome, VaultEngine, VaultState};
