//! `secretvault verify` — check a secret against its stored hash.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::{Result, SecretVaultError};

/// Execute the `verify` command.
pub fn execute(cli: &Cli, id: &str) -> Result<()> {
    let engine = open_vault(cli)?;

    if engine.verify_secret(id)? {
        output::success(&format!("Secret '{id}' decrypts to its recorded hash"));
        Ok(())
    } else {
        output::tip("A wrong master password produces this result for every secret.");
        Err(SecretVaultError::CommandFailed(format!(
            "secret '{id}' does not match its recorded hash"
        )))
    }
}
