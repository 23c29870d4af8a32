//! `secretvault init` — create a new vault.

use std::fs;

use crate::cli::output;
use crate::cli::{engine, prompt_new_password, vault_dir, Cli};
use crate::errors::{Result, SecretVaultError};

/// Execute the `init` command.
pub fn execute(cli: &Cli, force: bool) -> Result<()> {
    let dir = vault_dir(cli)?;

    // 1. Create the vault directory if it doesn't exist.
    if !dir.exists() {
        fs::create_dir_all(&dir)?;
        output::info(&format!("Created vault directory: {}", dir.display()));
    }

    let mut engine = engine(cli)?;

    // 2. Refuse to clobber an existing vault unless asked to.
    if engine.exists() && !force {
        output::tip("Use `secretvault init --force` to overwrite it (all secrets are lost).");
        return Err(SecretVaultError::CommandFailed(format!(
            "vault already exists at {}",
            engine.path().display()
        )));
    }

    // 3. Prompt for a new password (entered twice) and create the vault.
    let password = prompt_new_password()?;
    engine.init(password.as_bytes())?;

    output::success(&format!("Vault created at {}", engine.path().display()));
    output::tip("Run `secretvault add <NAME>` to add a secret.");
    output::tip("Run `secretvault list` to see all secrets.");

    Ok(())
}
