//! On-disk vault document and atomic persistence.
//!
//! A vault file is a single JSON document:
//!
//! ```text
//! {
//!   "version": 1,
//!   "secrets": [ { "id": ..., "value": "<base64 IV || ciphertext>", ... } ],
//!   "metadata": {
//!     "createdAt": ..., "updatedAt": ...,
//!     "salt": "<base64>",
//!     "kdf": { "algorithm": "pbkdf2-hmac-sha256", "iterations": 100000 },
//!     "cipher": "aes-256-ctr"
//!   }
//! }
//! ```
//!
//! The whole document is the unit of storage.  Every write replaces the
//! file via temp-file + rename.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::secret::StoredSecret;
use crate::crypto::{CipherKind, KdfParams};
use crate::errors::{Result, SecretVaultError};

/// Current vault document version.
pub const CURRENT_VERSION: u32 = 1;

/// Shared vault metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultMetadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Key-derivation salt.  Stored in cleartext; fixed at creation.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,

    /// KDF used at creation.  Missing in older files means PBKDF2 defaults.
    #[serde(default)]
    pub kdf: KdfParams,

    /// Cipher used for every value in this vault.
    #[serde(default)]
    pub cipher: CipherKind,
}

/// The root persisted object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultFile {
    pub version: u32,

    /// Records in insertion order.
    #[serde(default)]
    pub secrets: Vec<StoredSecret>,

    pub metadata: VaultMetadata,
}

impl VaultFile {
    /// An empty vault created now.
    pub fn new(salt: Vec<u8>, kdf: KdfParams, cipher: CipherKind) -> Self {
        let now = Utc::now();
        Self {
            version: CURRENT_VERSION,
            secrets: Vec::new(),
            metadata: VaultMetadata {
                created_at: now,
                updated_at: now,
                salt,
                kdf,
                cipher,
            },
        }
    }

    /// Check the structural invariants of a deserialized document.
    pub fn validate(&self) -> Result<()> {
        if self.version == 0 || self.version > CURRENT_VERSION {
            return Err(SecretVaultError::InvalidVaultFormat(format!(
                "unsupported version {}, expected at most {CURRENT_VERSION}",
                self.version
            )));
        }
        if self.metadata.salt.is_empty() {
            return Err(SecretVaultError::InvalidVaultFormat(
                "salt must not be empty".into(),
            ));
        }
        self.metadata
            .kdf
            .validate()
            .map_err(|e| SecretVaultError::InvalidVaultFormat(e.to_string()))?;

        let mut seen = HashSet::with_capacity(self.secrets.len());
        for secret in &self.secrets {
            if secret.id.is_empty() {
                return Err(SecretVaultError::InvalidVaultFormat(
                    "secret with empty id".into(),
                ));
            }
            if !seen.insert(secret.id.as_str()) {
                return Err(SecretVaultError::InvalidVaultFormat(format!(
                    "duplicate secret id '{}'",
                    secret.id
                )));
            }
        }
        Ok(())
    }

    /// Position of the record with `id`, if any.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.secrets.iter().position(|s| s.id == id)
    }

    /// Bump the vault-level `updatedAt`.
    pub fn touch(&mut self) {
        self.metadata.updated_at = Utc::now();
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse and validate a vault document from JSON text.
pub fn parse_vault(json: &str) -> Result<VaultFile> {
    let vault: VaultFile = serde_json::from_str(json)
        .map_err(|e| SecretVaultError::InvalidVaultFormat(format!("vault JSON: {e}")))?;
    vault.validate()?;
    Ok(vault)
}

/// Serialize a vault document to pretty-printed JSON.
pub fn to_json(vault: &VaultFile) -> Result<String> {
    serde_json::to_string_pretty(vault)
        .map_err(|e| SecretVaultError::SerializationError(format!("vault: {e}")))
}

/// Read a vault file from disk.
pub fn read_vault(path: &Path) -> Result<VaultFile> {
    if !path.exists() {
        return Err(SecretVaultError::VaultNotInitialized(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path)?;
    parse_vault(&contents)
}

/// Write a vault file to disk **atomically**.
///
/// 1. Create the containing directory if needed.
/// 2. Serialize the document to JSON.
/// 3. Write to a temp file in the same directory (owner-only on Unix).
/// 4. Rename the temp file over the target path.
pub fn write_vault(path: &Path, vault: &VaultFile) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let json = to_json(vault)?;

    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(&tmp_path)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> VaultFile {
        VaultFile::new(b"0123456789abcdef".to_vec(), KdfParams::default(), CipherKind::default())
    }

    #[test]
    fn write_then_read_preserves_document() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("vault.json");

        let vault = sample();
        write_vault(&path, &vault).unwrap();

        assert!(path.exists(), "containing directory is created on demand");
        assert_eq!(read_vault(&path).unwrap(), vault);
    }

    #[test]
    fn write_leaves_no_temp_file_behind() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("vault.json");
        write_vault(&path, &sample()).unwrap();

        let names: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("vault.json")]);
    }

    #[cfg(unix)]
    #[test]
    fn vault_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("vault.json");
        write_vault(&path, &sample()).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn read_missing_file_is_not_initialized() {
        let tmp = TempDir::new().unwrap();
        let err = read_vault(&tmp.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, SecretVaultError::VaultNotInitialized(_)));
    }

    #[test]
    fn metadata_uses_camel_case_and_base64_salt() {
        let json = to_json(&sample()).unwrap();
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"updatedAt\""));
        assert!(json.contains("\"salt\": \"MDEyMzQ1Njc4OWFiY2RlZg==\""));
        assert!(json.contains("\"cipher\": \"aes-256-ctr\""));
    }

    #[test]
    fn missing_kdf_and_cipher_fall_back_to_defaults() {
        let json = r#"{
            "version": 1,
            "secrets": [],
            "metadata": {
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-01-01T00:00:00Z",
                "salt": "MDEyMzQ1Njc4OWFiY2RlZg=="
            }
        }"#;
        let vault = parse_vault(json).unwrap();
        assert_eq!(vault.metadata.kdf, KdfParams::default());
        assert_eq!(vault.metadata.cipher, CipherKind::Aes256Ctr);
    }

    #[test]
    fn parse_rejects_future_version() {
        let mut vault = sample();
        vault.version = CURRENT_VERSION + 1;
        let json = serde_json::to_string(&vault).unwrap();
        assert!(matches!(
            parse_vault(&json),
            Err(SecretVaultError::InvalidVaultFormat(_))
        ));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_vault("not json").is_err());
        assert!(parse_vault(r#"{"version": 1}"#).is_err());
    }

    #[test]
    fn parse_rejects_bad_salt_encoding() {
        let json = r#"{"version":1,"secrets":[],"metadata":{"createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z","salt":"!!!"}}"#;
        assert!(parse_vault(json).is_err());
    }
}
