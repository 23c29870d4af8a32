//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;
use serde_json::Value;
use zeroize::Zeroizing;

use crate::config::{default_vault_dir, Settings};
use crate::errors::{Result, SecretVaultError};
use crate::vault::VaultEngine;

/// Minimum password length to prevent trivially weak passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// Upper bound on a generated secret, in random bytes.
const MAX_SECRET_LEN: usize = 4096;

/// Environment variable consulted before prompting for the master password.
pub const PASSWORD_ENV: &str = "SECRETVAULT_PASSWORD";

/// SecretVault CLI: local encrypted secret store.
#[derive(Parser)]
#[command(
    name = "secretvault",
    about = "Local encrypted store for passwords, tokens, keys and certificates",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault directory (default: ~/.secretvault)
    #[arg(long, env = "SECRETVAULT_DIR", global = true)]
    pub vault_dir: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new vault protected by a master password
    Init {
        /// Overwrite an existing vault
        #[arg(short, long)]
        force: bool,
    },

    /// Add a secret
    Add {
        /// Display name (e.g. "prod database")
        name: String,
        /// Secret value (omit for interactive prompt or piped stdin)
        value: Option<String>,
        /// Secret type: generic, password, token, certificate, key, ...
        #[arg(short = 't', long = "type")]
        secret_type: Option<String>,
        /// Tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,
        /// Expiry as RFC 3339 or YYYY-MM-DD
        #[arg(long)]
        expires: Option<String>,
        /// Metadata entry KEY=VALUE (repeatable)
        #[arg(long = "meta")]
        meta: Vec<String>,
        /// Generate a random value of N bytes instead of supplying one
        #[arg(short, long, num_args = 0..=1, value_name = "BYTES", conflicts_with = "value")]
        generate: Option<Option<usize>>,
    },

    /// Print a secret's value
    Get {
        /// Secret id
        id: String,
        /// Show metadata instead of the value
        #[arg(long)]
        meta_only: bool,
    },

    /// List secrets (values are never shown)
    List {
        /// Only secrets of this type
        #[arg(short = 't', long = "type")]
        secret_type: Option<String>,
        /// Only expired secrets
        #[arg(long)]
        expired: bool,
    },

    /// Search secrets by name, type, or tag
    Search {
        /// Case-insensitive substring
        query: String,
    },

    /// Update fields of a secret
    Update {
        /// Secret id
        id: String,
        /// New display name
        #[arg(long)]
        name: Option<String>,
        /// New value (warned: may appear in shell history)
        #[arg(long, conflicts_with = "read_value")]
        value: Option<String>,
        /// Read the new value from stdin or a hidden prompt
        #[arg(long)]
        read_value: bool,
        /// New type
        #[arg(short = 't', long = "type")]
        secret_type: Option<String>,
        /// Replace all tags (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// New notes
        #[arg(long)]
        notes: Option<String>,
        /// New expiry as RFC 3339 or YYYY-MM-DD
        #[arg(long, conflicts_with = "no_expiry")]
        expires: Option<String>,
        /// Remove the expiry
        #[arg(long)]
        no_expiry: bool,
        /// Metadata entry KEY=VALUE to merge (repeatable)
        #[arg(long = "meta")]
        meta: Vec<String>,
    },

    /// Delete a secret
    Delete {
        /// Secret id
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Check that a secret decrypts to its recorded hash
    Verify {
        /// Secret id
        id: String,
    },

    /// Export the encrypted vault document
    Export {
        /// Output file path (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Replace the vault with a previously exported document
    Import {
        /// Path to the exported JSON file
        file: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Print a random URL-safe secret
    Generate {
        /// Number of random bytes (default from config, 32)
        length: Option<usize>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolve the vault directory from `--vault-dir` / `SECRETVAULT_DIR`,
/// falling back to `~/.secretvault`.
pub fn vault_dir(cli: &Cli) -> Result<PathBuf> {
    match &cli.vault_dir {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => default_vault_dir(),
    }
}

/// Load settings from the vault directory.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    Settings::load(&vault_dir(cli)?)
}

/// Build an engine for the configured vault without unlocking it.
pub fn engine(cli: &Cli) -> Result<VaultEngine> {
    let dir = vault_dir(cli)?;
    let settings = Settings::load(&dir)?;
    VaultEngine::from_settings(settings.vault_path(&dir), &settings)
}

/// Build an engine and unlock it with the master password.
///
/// Fails before prompting if the vault has not been initialized.
pub fn open_vault(cli: &Cli) -> Result<VaultEngine> {
    let mut engine = engine(cli)?;
    if !engine.exists() {
        return Err(SecretVaultError::VaultNotInitialized(
            engine.path().to_path_buf(),
        ));
    }

    let password = prompt_password()?;
    engine.unlock(password.as_bytes())?;
    Ok(engine)
}

/// Get the master password, trying in order:
/// 1. `SECRETVAULT_PASSWORD` env var (CI/CD)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter master password")
        .interact()
        .map_err(|e| SecretVaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password twice (used during `init`).
///
/// Also respects `SECRETVAULT_PASSWORD` for scripted/CI usage.
/// Fails with `PasswordMismatch` if the two entries differ.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    let password = match password_from_env() {
        Some(pw) => pw,
        None => {
            let first = Zeroizing::new(
                dialoguer::Password::new()
                    .with_prompt("Choose master password")
                    .interact()
                    .map_err(|e| {
                        SecretVaultError::CommandFailed(format!("password prompt: {e}"))
                    })?,
            );
            let second = Zeroizing::new(
                dialoguer::Password::new()
                    .with_prompt("Confirm master password")
                    .interact()
                    .map_err(|e| {
                        SecretVaultError::CommandFailed(format!("password prompt: {e}"))
                    })?,
            );
            if *first != *second {
                return Err(SecretVaultError::PasswordMismatch);
            }
            first
        }
    };

    validate_new_password(&password)?;
    Ok(password)
}

fn password_from_env() -> Option<Zeroizing<String>> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}

/// Byte length for a generated secret: the requested one, or
/// `default_secret_length` from the settings.  Must be in 1..=4096.
pub fn secret_length(cli: &Cli, requested: Option<usize>) -> Result<usize> {
    let length = match requested {
        Some(n) => n,
        None => load_settings(cli)?.default_secret_length,
    };
    check_secret_length(length)?;
    Ok(length)
}

fn check_secret_length(length: usize) -> Result<()> {
    if length == 0 || length > MAX_SECRET_LEN {
        return Err(SecretVaultError::InvalidInput(format!(
            "length must be between 1 and {MAX_SECRET_LEN} bytes (got {length})"
        )));
    }
    Ok(())
}

/// Enforce the minimum master password length.
pub fn validate_new_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(SecretVaultError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Read a secret value from one of three sources: the inline argument,
/// piped stdin, or a hidden interactive prompt.
pub fn read_secret_value(inline: Option<&str>, prompt: &str) -> Result<Zeroizing<String>> {
    if let Some(v) = inline {
        output::warning("Value provided on command line — it may appear in shell history.");
        return Ok(Zeroizing::new(v.to_string()));
    }

    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = buf.trim_end_matches(['\n', '\r']).to_string();
        return Ok(Zeroizing::new(trimmed));
    }

    let value = dialoguer::Password::new()
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()
        .map_err(|e| SecretVaultError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(value))
}

/// Parse an expiry given as RFC 3339 or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_expiry(input: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| {
            SecretVaultError::InvalidInput(format!(
                "invalid expiry '{input}' — use RFC 3339 or YYYY-MM-DD"
            ))
        })
}

/// Parse a `KEY=VALUE` metadata entry.
///
/// Values that are valid JSON (numbers, booleans, arrays, objects) keep
/// their JSON type; anything else is stored as a string.
pub fn parse_meta_entry(entry: &str) -> Result<(String, Value)> {
    let (key, raw) = entry.split_once('=').ok_or_else(|| {
        SecretVaultError::InvalidInput(format!("metadata '{entry}' must be KEY=VALUE"))
    })?;
    let key = key.trim();
    if key.is_empty() {
        return Err(SecretVaultError::InvalidInput(format!(
            "metadata '{entry}' has an empty key"
        )));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}
