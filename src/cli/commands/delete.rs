//! `secretvault delete` — remove a secret from the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::{Result, SecretVaultError};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, id: &str, force: bool) -> Result<()> {
    let mut engine = open_vault(cli)?;

    // Resolve the name first so the prompt is meaningful and a bad id
    // fails before asking anything.
    let info = engine.get_secret_meta(id)?;

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete secret '{}' ({id})?", info.name))
            .default(false)
            .interact()
            .map_err(|e| SecretVaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    engine.delete_secret(id)?;

    output::success(&format!("Deleted secret '{}' ({id})", info.name));
    Ok(())
}
