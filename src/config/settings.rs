use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::DEFAULT_PBKDF2_ITERATIONS;
use crate::crypto::{CipherKind, KdfParams};
use crate::errors::{Result, SecretVaultError};

/// Vault-directory configuration, loaded from `<vault_dir>/config.toml`.
///
/// Every field has a sensible default so SecretVault works out-of-the-box
/// without any config file at all.  The KDF and cipher fields only affect
/// `init`; an existing vault records its own choices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// File name of the vault inside the vault directory.
    #[serde(default = "default_vault_file")]
    pub vault_file: String,

    /// Key derivation function for new vaults: "pbkdf2" or "argon2id".
    #[serde(default = "default_kdf")]
    pub kdf: String,

    /// PBKDF2-HMAC-SHA256 iteration count (default: 100 000).
    #[serde(default = "default_pbkdf2_iterations")]
    pub pbkdf2_iterations: u32,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// Value cipher for new vaults: "aes-256-ctr" or "aes-256-gcm".
    #[serde(default = "default_cipher")]
    pub cipher: String,

    /// Byte length used by `generate` when none is given.
    #[serde(default = "default_secret_length")]
    pub default_secret_length: usize,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_file() -> String {
    "vault.json".to_string()
}

fn default_kdf() -> String {
    "pbkdf2".to_string()
}

fn default_pbkdf2_iterations() -> u32 {
    DEFAULT_PBKDF2_ITERATIONS
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

fn default_cipher() -> String {
    "aes-256-ctr".to_string()
}

fn default_secret_length() -> usize {
    32
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_file: default_vault_file(),
            kdf: default_kdf(),
            pbkdf2_iterations: default_pbkdf2_iterations(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            cipher: default_cipher(),
            default_secret_length: default_secret_length(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the vault directory.
    const FILE_NAME: &'static str = "config.toml";

    /// Load settings from `<vault_dir>/config.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(vault_dir: &Path) -> Result<Self> {
        let config_path = vault_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            SecretVaultError::ConfigError(format!(
                "Failed to parse {}: {e}",
                config_path.display()
            ))
        })?;

        tracing::debug!(path = %config_path.display(), "loaded settings");
        Ok(settings)
    }

    /// Build the full path to the vault file.
    ///
    /// Example: `~/.secretvault/vault.json`
    pub fn vault_path(&self, vault_dir: &Path) -> PathBuf {
        vault_dir.join(&self.vault_file)
    }

    /// Convert the KDF settings into crypto-layer params.
    pub fn kdf_params(&self) -> Result<KdfParams> {
        let params = match self.kdf.to_ascii_lowercase().as_str() {
            "pbkdf2" | "pbkdf2-hmac-sha256" => KdfParams::Pbkdf2 {
                iterations: self.pbkdf2_iterations,
            },
            "argon2id" | "argon2" => KdfParams::Argon2id {
                memory_kib: self.argon2_memory_kib,
                iterations: self.argon2_iterations,
                parallelism: self.argon2_parallelism,
            },
            other => {
                return Err(SecretVaultError::ConfigError(format!(
                    "unknown kdf '{other}' — use 'pbkdf2' or 'argon2id'"
                )))
            }
        };
        params
            .validate()
            .map_err(|e| SecretVaultError::ConfigError(e.to_string()))?;
        Ok(params)
    }

    /// Parse the configured cipher name.
    pub fn cipher_kind(&self) -> Result<CipherKind> {
        self.cipher.parse()
    }
}

/// Default vault directory: `$HOME/.secretvault`.
pub fn default_vault_dir() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join(".secretvault"))
        .ok_or_else(|| {
            SecretVaultError::ConfigError(
                "cannot locate home directory — pass --vault-dir or set SECRETVAULT_DIR".into(),
            )
        })
}

// ── Tests ────────────────────────────────────────────────────────────
