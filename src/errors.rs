use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in SecretVault.
#[derive(Debug, Error)]
pub enum SecretVaultError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed — wrong password or corrupted data")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Vault lifecycle errors ---
    #[error("Vault not initialized at {0} — run `secretvault init` first")]
    VaultNotInitialized(PathBuf),

    #[error("Vault is locked — unlock it with the master password first")]
    VaultLocked,

    #[error("Invalid vault format: {0}")]
    InvalidVaultFormat(String),

    #[error("Secret '{0}' not found")]
    SecretNotFound(String),

    // --- Input errors ---
    #[error("Password mismatch — passwords do not match")]
    PasswordMismatch,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

impl SecretVaultError {
    /// Process exit code the command shell uses for this error.
    ///
    /// Lifecycle, lookup, input, and I/O failures each get their own
    /// code so scripts can tell them apart; everything else exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::VaultNotInitialized(_) => 2,
            Self::VaultLocked => 3,
            Self::SecretNotFound(_) => 4,
            Self::PasswordMismatch | Self::InvalidInput(_) => 5,
            Self::Io(_) => 6,
            _ => 1,
        }
    }
}

/// Convenience type alias for SecretVault results.
pub type Result<T> = std::result::Result<T, SecretVaultError>;
