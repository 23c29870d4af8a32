//! Configuration loaded from the vault directory.

pub mod settings;

pub use settings::{default_vault_dir, Settings};
