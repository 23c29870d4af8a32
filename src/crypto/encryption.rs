//! Symmetric encryption of individual secret values.
//!
//! Every call to `encrypt` generates a fresh random IV/nonce and prepends
//! it to the ciphertext, so each value can be decrypted on its own.
//!
//! Layout of the returned byte buffer:
//!   AES-256-CTR: [ 16-byte IV | ciphertext ]
//!   AES-256-GCM: [ 12-byte nonce | ciphertext + 16-byte auth tag ]
//!
//! CTR mode provides confidentiality only.  A wrong key or a flipped bit
//! decrypts to wrong bytes without any error.  GCM authenticates the
//! ciphertext and fails with `DecryptionFailed` instead.

use aes::cipher::{KeyIvInit, StreamCipher};
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SecretVaultError};

type Aes256Ctr = ctr::Ctr128BE<aes::Aes256>;

/// Size of the AES-CTR initialization vector in bytes.
pub const IV_LEN: usize = 16;

/// Size of the AES-256-GCM nonce in bytes.
const NONCE_LEN: usize = 12;

/// Cipher used for the values of one vault.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CipherKind {
    /// Unauthenticated stream cipher (counter mode).
    #[default]
    #[serde(rename = "aes-256-ctr")]
    Aes256Ctr,

    /// Authenticated encryption.
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,
}

impl std::str::FromStr for CipherKind {
    type Err = SecretVaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "aes-256-ctr" | "ctr" => Ok(Self::Aes256Ctr),
            "aes-256-gcm" | "gcm" => Ok(Self::Aes256Gcm),
            other => Err(SecretVaultError::ConfigError(format!(
                "unknown cipher '{other}' — use 'aes-256-ctr' or 'aes-256-gcm'"
            ))),
        }
    }
}

/// Encrypt `plaintext` with a 32-byte `key`.
///
/// Returns the IV prepended to the ciphertext.
pub fn encrypt(kind: CipherKind, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    match kind {
        CipherKind::Aes256Ctr => encrypt_ctr(key, plaintext),
        CipherKind::Aes256Gcm => encrypt_gcm(key, plaintext),
    }
}

/// Decrypt data that was produced by `encrypt` with the same `kind`.
pub fn decrypt(kind: CipherKind, key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    match kind {
        CipherKind::Aes256Ctr => decrypt_ctr(key, data),
        CipherKind::Aes256Gcm => decrypt_gcm(key, data),
    }
}

fn encrypt_ctr(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut iv = [0u8; IV_LEN];
    rand::rng().fill_bytes(&mut iv);

    let mut cipher = Aes256Ctr::new_from_slices(key, &iv)
        .map_err(|e| SecretVaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let mut output = Vec::with_capacity(IV_LEN + plaintext.len());
    output.extend_from_slice(&iv);
    output.extend_from_slice(plaintext);
    cipher.apply_keystream(&mut output[IV_LEN..]);
    Ok(output)
}

fn decrypt_ctr(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < IV_LEN {
        return Err(SecretVaultError::DecryptionFailed);
    }

    let (iv, ciphertext) = data.split_at(IV_LEN);
    let mut cipher =
        Aes256Ctr::new_from_slices(key, iv).map_err(|_| SecretVaultError::DecryptionFailed)?;

    let mut plaintext = ciphertext.to_vec();
    cipher.apply_keystream(&mut plaintext);
    Ok(plaintext)
}

fn encrypt_gcm(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| SecretVaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| SecretVaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

fn decrypt_gcm(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < NONCE_LEN {
        return Err(SecretVaultError::DecryptionFailed);
    }

    let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| SecretVaultError::DecryptionFailed)?;

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| SecretVaultError::DecryptionFailed)
}
