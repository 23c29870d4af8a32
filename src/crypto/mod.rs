//! Cryptographic primitives for SecretVault.
//!
//! This module provides:
//! - AES-256-CTR (default) and AES-256-GCM value encryption (`encryption`)
//! - PBKDF2-HMAC-SHA256 / Argon2id password-based key derivation (`kdf`)
//! - The zeroize-on-drop `MasterKey` (`keys`)
//! - SHA-256 fingerprints and random tokens (`digest`)

pub mod digest;
pub mod encryption;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_key, ...};
pub use digest::{generate_secret, hash, hashes_match};
pub use encryption::{decrypt, encrypt, CipherKind};
pub use kdf::{derive_key, derive_key_with_salt, generate_salt, KdfParams};
pub use keys::MasterKey;
