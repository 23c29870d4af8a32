//! High-level vault operations used by CLI commands.
//!
//! `VaultEngine` owns the lock/unlock lifecycle.  While unlocked it holds
//! the master key and the in-memory vault document; every data operation
//! goes through that session and fails with `VaultLocked` (or
//! `VaultNotInitialized` when there is no backing file) otherwise.
//!
//! Mutations are applied to a copy of the document, written to disk, and
//! only then swapped in, so a failed write leaves both memory and disk as
//! they were.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use zeroize::Zeroize;

use crate::config::Settings;
use crate::crypto::{self, CipherKind, KdfParams, MasterKey};
use crate::errors::{Result, SecretVaultError};

use super::format::{self, VaultFile};
use super::query;
use super::secret::{
    normalize_tags, NewSecret, RevealedSecret, SecretInfo, SecretUpdate, StoredSecret,
    DEFAULT_TYPE,
};

/// Length of generated secret ids.
const ID_LEN: usize = 16;

/// Lifecycle state of a vault engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultState {
    /// No backing file exists yet.
    Uninitialized,
    /// A backing file exists but the key is not held.
    Locked,
    /// The key is held in memory and data operations are allowed.
    Unlocked,
}

/// Result of `import_vault`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Number of records in the imported vault.
    pub secrets: usize,
    /// `true` if the imported vault uses a different salt or KDF, so the
    /// engine discarded its key and must be unlocked again.
    pub relocked: bool,
}

/// Key material and document held while unlocked.
struct Session {
    key: MasterKey,
    vault: VaultFile,
}

/// The vault handle.  Create one with `VaultEngine::new`, then `init` or
/// `unlock` it before calling any data operation.
pub struct VaultEngine {
    /// Path to the vault file on disk.
    path: PathBuf,

    /// KDF used when `init` creates a new vault.
    kdf: KdfParams,

    /// Cipher used when `init` creates a new vault.
    cipher: CipherKind,

    /// Present only while unlocked.
    session: Option<Session>,
}

impl VaultEngine {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Engine for the vault file at `path`, using default KDF and cipher
    /// for `init`.  Does not touch the disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_options(path, KdfParams::default(), CipherKind::default())
    }

    /// Engine with explicit KDF and cipher choices for `init`.
    ///
    /// Existing vaults always unlock with the parameters recorded in
    /// their own metadata.
    pub fn with_options(path: impl Into<PathBuf>, kdf: KdfParams, cipher: CipherKind) -> Self {
        Self {
            path: path.into(),
            kdf,
            cipher,
            session: None,
        }
    }

    /// Engine configured from `Settings`.
    pub fn from_settings(path: impl Into<PathBuf>, settings: &Settings) -> Result<Self> {
        Ok(Self::with_options(
            path,
            settings.kdf_params()?,
            settings.cipher_kind()?,
        ))
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Create a new, empty vault protected by `passphrase` and unlock it.
    ///
    /// Generates a fresh salt.  An existing vault file at the same path
    /// is overwritten; callers that care must check `exists` first.
    pub fn init(&mut self, passphrase: &[u8]) -> Result<()> {
        self.session = None;

        let (key, salt) = crypto::derive_key(passphrase, None, &self.kdf)?;
        let vault = VaultFile::new(salt, self.kdf, self.cipher);
        format::write_vault(&self.path, &vault)?;

        tracing::info!(path = %self.path.display(), cipher = ?self.cipher, "vault initialized");
        self.session = Some(Session { key, vault });
        Ok(())
    }

    /// Load the vault from disk and derive the key from `passphrase` and
    /// the stored salt.
    ///
    /// The passphrase is not checked: a wrong one yields a key that
    /// decrypts values to garbage (or fails, for AES-GCM vaults).  Use
    /// `verify_secret` to detect that case.
    pub fn unlock(&mut self, passphrase: &[u8]) -> Result<()> {
        let vault = format::read_vault(&self.path)?;
        let key =
            crypto::derive_key_with_salt(passphrase, &vault.metadata.salt, &vault.metadata.kdf)?;

        tracing::info!(
            path = %self.path.display(),
            secrets = vault.secrets.len(),
            "vault unlocked"
        );
        self.session = Some(Session { key, vault });
        Ok(())
    }

    /// Discard the key and the in-memory document.  Always succeeds.
    pub fn lock(&mut self) {
        if self.session.take().is_some() {
            tracing::info!(path = %self.path.display(), "vault locked");
        }
    }

    /// `true` if a backing file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// `true` while the key is held.
    pub fn is_unlocked(&self) -> bool {
        self.session.is_some()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> VaultState {
        if self.session.is_some() {
            VaultState::Unlocked
        } else if self.exists() {
            VaultState::Locked
        } else {
            VaultState::Uninitialized
        }
    }

    // ------------------------------------------------------------------
    // Secret operations
    // ------------------------------------------------------------------

    /// Encrypt and store a new secret.
    ///
    /// Returns the new record with its plaintext value; this is the only
    /// time a freshly created value is handed back.
    pub fn add_secret(&mut self, new: NewSecret) -> Result<RevealedSecret> {
        self.session()?;
        if new.name.trim().is_empty() {
            return Err(SecretVaultError::InvalidInput(
                "secret name cannot be empty".into(),
            ));
        }

        let NewSecret {
            name,
            value,
            secret_type,
            tags,
            metadata,
            notes,
            expires_at,
        } = new;

        let info = self.commit(|key, vault| {
            let now = Utc::now();
            let secret = StoredSecret {
                id: generate_id(vault),
                name,
                secret_type: secret_type.unwrap_or_else(|| DEFAULT_TYPE.to_string()),
                value: crypto::encrypt(vault.metadata.cipher, key.as_bytes(), value.as_bytes())?,
                value_hash: crypto::hash(&value),
                created_at: now,
                updated_at: now,
                expires_at,
                metadata,
                tags: normalize_tags(tags),
                notes: notes.unwrap_or_default(),
            };
            let info = secret.info();
            vault.secrets.push(secret);
            Ok(info)
        })?;

        tracing::debug!(id = %info.id, "secret added");
        Ok(RevealedSecret { info, value })
    }

    /// Decrypt and return a secret.  Nothing is cached.
    pub fn get_secret(&self, id: &str) -> Result<RevealedSecret> {
        let session = self.session()?;
        let secret = find(&session.vault, id)?;
        let value = reveal(session, secret)?;
        Ok(RevealedSecret {
            info: secret.info(),
            value,
        })
    }

    /// Metadata of one secret, without decrypting.
    pub fn get_secret_meta(&self, id: &str) -> Result<SecretInfo> {
        let session = self.session()?;
        Ok(find(&session.vault, id)?.info())
    }

    /// Metadata of every secret, in insertion order.
    pub fn list_secrets(&self) -> Result<Vec<SecretInfo>> {
        self.filter(|_| true)
    }

    /// Secrets whose name, type, or any tag contains `query`
    /// (case-insensitive).
    pub fn search_secrets(&self, query: &str) -> Result<Vec<SecretInfo>> {
        self.filter(|s| query::matches_query(s, query))
    }

    /// Secrets whose type equals `secret_type`.
    pub fn get_secrets_by_type(&self, secret_type: &str) -> Result<Vec<SecretInfo>> {
        self.filter(|s| query::matches_type(s, secret_type))
    }

    /// Secrets whose expiry is at or before the current time.
    pub fn get_expired_secrets(&self) -> Result<Vec<SecretInfo>> {
        let now = Utc::now();
        self.filter(|s| query::is_expired(s, now))
    }

    /// Apply the fields present in `updates` to a secret.
    ///
    /// A new value is re-encrypted under a fresh IV and re-hashed;
    /// `metadata` is merged shallowly; `tags` replace the old list.
    pub fn update_secret(&mut self, id: &str, mut updates: SecretUpdate) -> Result<SecretInfo> {
        self.session()?;
        if updates.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(SecretVaultError::InvalidInput(
                "secret name cannot be empty".into(),
            ));
        }

        let info = self.commit(|key, vault| {
            let cipher = vault.metadata.cipher;
            let index = vault
                .position(id)
                .ok_or_else(|| SecretVaultError::SecretNotFound(id.to_string()))?;
            let secret = &mut vault.secrets[index];

            if let Some(name) = updates.name.take() {
                secret.name = name;
            }
            if let Some(value) = updates.value.as_ref() {
                secret.value = crypto::encrypt(cipher, key.as_bytes(), value.as_bytes())?;
                secret.value_hash = crypto::hash(value);
            }
            if let Some(secret_type) = updates.secret_type.take() {
                secret.secret_type = secret_type;
            }
            if let Some(tags) = updates.tags.take() {
                secret.tags = normalize_tags(tags);
            }
            if let Some(metadata) = updates.metadata.take() {
                secret.metadata.extend(metadata);
            }
            if let Some(notes) = updates.notes.take() {
                secret.notes = notes;
            }
            if let Some(expires_at) = updates.expires_at.take() {
                secret.expires_at = expires_at;
            }
            secret.updated_at = Utc::now();
            Ok(secret.info())
        })?;

        tracing::debug!(id = %info.id, "secret updated");
        Ok(info)
    }

    /// Remove a secret.
    pub fn delete_secret(&mut self, id: &str) -> Result<()> {
        self.commit(|_, vault| {
            let index = vault
                .position(id)
                .ok_or_else(|| SecretVaultError::SecretNotFound(id.to_string()))?;
            vault.secrets.remove(index);
            Ok(())
        })?;

        tracing::debug!(id, "secret deleted");
        Ok(())
    }

    /// Decrypt a secret and compare its hash with the stored `valueHash`.
    ///
    /// `false` means the held key is wrong or the ciphertext is corrupt.
    /// The plaintext never leaves this call.
    pub fn verify_secret(&self, id: &str) -> Result<bool> {
        let session = self.session()?;
        let secret = find(&session.vault, id)?;
        let mut value = match reveal(session, secret) {
            Ok(v) => v,
            Err(SecretVaultError::DecryptionFailed) => return Ok(false),
            Err(e) => return Err(e),
        };
        let ok = crypto::hashes_match(&crypto::hash(&value), &secret.value_hash);
        value.zeroize();
        Ok(ok)
    }

    // ------------------------------------------------------------------
    // Export / import
    // ------------------------------------------------------------------

    /// Serialize the whole vault (ciphertexts, hashes, salt) as JSON.
    pub fn export_vault(&self) -> Result<String> {
        let session = self.session()?;
        format::to_json(&session.vault)
    }

    /// Replace the vault, in memory and on disk, with `blob`.
    ///
    /// The blob must be a valid vault document.  If its salt or KDF
    /// differs from the current one the held key is useless for it, so
    /// the engine locks and the caller must `unlock` with the imported
    /// vault's passphrase.
    pub fn import_vault(&mut self, blob: &str) -> Result<ImportOutcome> {
        let session = self.session()?;
        let imported = format::parse_vault(blob)?;

        let relocked = imported.metadata.salt != session.vault.metadata.salt
            || imported.metadata.kdf != session.vault.metadata.kdf;

        format::write_vault(&self.path, &imported)?;

        let outcome = ImportOutcome {
            secrets: imported.secrets.len(),
            relocked,
        };

        if relocked {
            self.session = None;
        } else if let Some(session) = self.session.as_mut() {
            session.vault = imported;
        }

        tracing::info!(
            path = %self.path.display(),
            secrets = outcome.secrets,
            relocked,
            "vault imported"
        );
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the path to the vault file on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of secrets in the vault.
    pub fn secret_count(&self) -> Result<usize> {
        Ok(self.session()?.vault.secrets.len())
    }

    /// Returns the vault creation timestamp.
    pub fn created_at(&self) -> Result<DateTime<Utc>> {
        Ok(self.session()?.vault.metadata.created_at)
    }

    /// Returns the timestamp of the last mutation.
    pub fn updated_at(&self) -> Result<DateTime<Utc>> {
        Ok(self.session()?.vault.metadata.updated_at)
    }

    /// Returns the cipher recorded for the unlocked vault.
    pub fn cipher(&self) -> Result<CipherKind> {
        Ok(self.session()?.vault.metadata.cipher)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn session(&self) -> Result<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| closed_error(&self.path))
    }

    fn filter<F>(&self, predicate: F) -> Result<Vec<SecretInfo>>
    where
        F: Fn(&StoredSecret) -> bool,
    {
        let session = self.session()?;
        Ok(session
            .vault
            .secrets
            .iter()
            .filter(|&s| predicate(s))
            .map(StoredSecret::info)
            .collect())
    }

    /// Stage a mutation on a copy of the vault, persist it, then commit.
    fn commit<T, F>(&mut self, apply: F) -> Result<T>
    where
        F: FnOnce(&MasterKey, &mut VaultFile) -> Result<T>,
    {
        let Self { path, session, .. } = self;
        let Some(session) = session.as_mut() else {
            return Err(closed_error(path));
        };

        let mut staged = session.vault.clone();
        let out = apply(&session.key, &mut staged)?;
        staged.touch();

        format::write_vault(path, &staged)?;
        session.vault = staged;
        Ok(out)
    }
}

/// Why a data operation cannot run without a session.
fn closed_error(path: &Path) -> SecretVaultError {
    if path.exists() {
        SecretVaultError::VaultLocked
    } else {
        SecretVaultError::VaultNotInitialized(path.to_path_buf())
    }
}

/// Look up a record by id.
fn find<'a>(vault: &'a VaultFile, id: &str) -> Result<&'a StoredSecret> {
    vault
        .secrets
        .iter()
        .find(|s| s.id == id)
        .ok_or_else(|| SecretVaultError::SecretNotFound(id.to_string()))
}

/// Decrypt a record's value to text.
///
/// Bytes that are not valid UTF-8 (typically a wrong key under CTR) are
/// converted lossily rather than rejected.
fn reveal(session: &Session, secret: &StoredSecret) -> Result<String> {
    let bytes = crypto::decrypt(
        session.vault.metadata.cipher,
        session.key.as_bytes(),
        &secret.value,
    )?;

    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            let mut raw = e.into_bytes();
            let text = String::from_utf8_lossy(&raw).into_owned();
            raw.zeroize();
            text
        }
    })
}

/// A fresh 16-character alphanumeric id not already used in `vault`.
fn generate_id(vault: &VaultFile) -> String {
    loop {
        let id: String = crypto::generate_secret(ID_LEN)
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .take(ID_LEN)
            .collect();
        if id.len() == ID_LEN && vault.position(&id).is_none() {
            return id;
        }
    }
}
