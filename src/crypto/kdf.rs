//! Password-based key derivation.
//!
//! The default is PBKDF2-HMAC-SHA256 with a fixed iteration count.
//! Argon2id is available as an opt-in alternative for new vaults.  The
//! chosen parameters are recorded in the vault metadata so the same
//! passphrase + salt always reproduces the same key on unlock.

use argon2::{Algorithm, Argon2, Params, Version};
use hmac::Hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroize;

use super::keys::{MasterKey, KEY_LEN};
use crate::errors::{Result, SecretVaultError};

/// Length of the salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Default PBKDF2 iteration count.
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 100_000;

/// PBKDF2 iteration counts below this are rejected.
const MIN_PBKDF2_ITERATIONS: u32 = 100_000;

/// Minimum safe Argon2 memory cost in KiB (8 MB).
const MIN_ARGON2_MEMORY_KIB: u32 = 8_192;

/// Key derivation function and its parameters.
///
/// Serialized into the vault metadata as
/// `{"algorithm": "pbkdf2-hmac-sha256", "iterations": 100000}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all_fields = "camelCase")]
pub enum KdfParams {
    #[serde(rename = "pbkdf2-hmac-sha256")]
    Pbkdf2 { iterations: u32 },

    #[serde(rename = "argon2id")]
    Argon2id {
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    },
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::Pbkdf2 {
            iterations: DEFAULT_PBKDF2_ITERATIONS,
        }
    }
}

impl KdfParams {
    /// Reject parameter sets that would produce a dangerously weak key.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Pbkdf2 { iterations } => {
                if iterations < MIN_PBKDF2_ITERATIONS {
                    return Err(SecretVaultError::KeyDerivationFailed(format!(
                        "PBKDF2 iterations must be at least {MIN_PBKDF2_ITERATIONS} (got {iterations})"
                    )));
                }
            }
            Self::Argon2id {
                memory_kib,
                iterations,
                parallelism,
            } => {
                if memory_kib < MIN_ARGON2_MEMORY_KIB {
                    return Err(SecretVaultError::KeyDerivationFailed(format!(
                        "Argon2 memory_kib must be at least {MIN_ARGON2_MEMORY_KIB} (got {memory_kib})"
                    )));
                }
                if iterations < 1 {
                    return Err(SecretVaultError::KeyDerivationFailed(
                        "Argon2 iterations must be at least 1".into(),
                    ));
                }
                if parallelism < 1 {
                    return Err(SecretVaultError::KeyDerivationFailed(
                        "Argon2 parallelism must be at least 1".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Derive a master key from `passphrase`.
///
/// When `salt` is `None` a fresh random salt is generated.  Returns the
/// key together with the salt that produced it, so callers creating a
/// vault can persist the salt.
pub fn derive_key(
    passphrase: &[u8],
    salt: Option<&[u8]>,
    params: &KdfParams,
) -> Result<(MasterKey, Vec<u8>)> {
    let salt = match salt {
        Some(s) => s.to_vec(),
        None => generate_salt().to_vec(),
    };
    let key = derive_key_with_salt(passphrase, &salt, params)?;
    Ok((key, salt))
}

/// Derive a master key from `passphrase` and an existing `salt`.
///
/// Deterministic: the same inputs always yield the same key.
pub fn derive_key_with_salt(
    passphrase: &[u8],
    salt: &[u8],
    params: &KdfParams,
) -> Result<MasterKey> {
    params.validate()?;

    let mut bytes = [0u8; KEY_LEN];
    match *params {
        KdfParams::Pbkdf2 { iterations } => {
            pbkdf2::pbkdf2::<Hmac<Sha256>>(passphrase, salt, iterations, &mut bytes).map_err(
                |e| SecretVaultError::KeyDerivationFailed(format!("PBKDF2 failed: {e}")),
            )?;
        }
        KdfParams::Argon2id {
            memory_kib,
            iterations,
            parallelism,
        } => {
            let params = Params::new(memory_kib, iterations, parallelism, Some(KEY_LEN)).map_err(
                |e| SecretVaultError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")),
            )?;
            Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
                .hash_password_into(passphrase, salt, &mut bytes)
                .map_err(|e| {
                    SecretVaultError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}"))
                })?;
        }
    }

    let key = MasterKey::new(bytes);
    bytes.zeroize();
    Ok(key)
}

/// Generate a cryptographically random 16-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_argon2() -> KdfParams {
        KdfParams::Argon2id {
            memory_kib: 8_192,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn default_is_pbkdf2_with_100k_rounds() {
        assert_eq!(
            KdfParams::default(),
            KdfParams::Pbkdf2 {
                iterations: 100_000
            }
        );
    }

    #[test]
    fn derive_key_generates_salt_when_missing() {
        let (_, salt) = derive_key(b"pw", None, &fast_argon2()).unwrap();
        assert_eq!(salt.len(), SALT_LEN);
    }

    #[test]
    fn derive_key_keeps_supplied_salt() {
        let (key, salt) = derive_key(b"pw", Some(b"0123456789abcdef"), &fast_argon2()).unwrap();
        assert_eq!(salt, b"0123456789abcdef");
        let again = derive_key_with_salt(b"pw", &salt, &fast_argon2()).unwrap();
        assert_eq!(key.as_bytes(), again.as_bytes());
    }

    #[test]
    fn rejects_weak_pbkdf2_iterations() {
        let weak = KdfParams::Pbkdf2 { iterations: 1_000 };
        assert!(derive_key_with_salt(b"pw", b"salt", &weak).is_err());
    }

    #[test]
    fn rejects_weak_argon2_memory() {
        let weak = KdfParams::Argon2id {
            memory_kib: 1_024,
            iterations: 1,
            parallelism: 1,
        };
        assert!(weak.validate().is_err());
    }

    #[test]
    fn params_serialize_with_algorithm_tag() {
        let json = serde_json::to_string(&KdfParams::default()).unwrap();
        assert_eq!(
            json,
            r#"{"algorithm":"pbkdf2-hmac-sha256","iterations":100000}"#
        );

        let parsed: KdfParams = serde_json::from_str(
            r#"{"algorithm":"argon2id","memoryKib":8192,"iterations":1,"parallelism":1}"#,
        )
        .unwrap();
        assert_eq!(parsed, fast_argon2());
    }

    #[test]
    fn generate_salt_is_random() {
        assert_ne!(generate_salt(), generate_salt());
    }
}
