//! `secretvault import` — replace the vault with an exported document.

use std::fs;

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::{Result, SecretVaultError};

/// Execute the `import` command.
pub fn execute(cli: &Cli, file: &str, force: bool) -> Result<()> {
    let blob = fs::read_to_string(file).map_err(|e| {
        SecretVaultError::CommandFailed(format!("failed to read import file '{file}': {e}"))
    })?;

    let mut engine = open_vault(cli)?;

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Replace all {} secret(s) in the vault with the contents of '{file}'?",
                engine.secret_count()?
            ))
            .default(false)
            .interact()
            .map_err(|e| SecretVaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let outcome = engine.import_vault(&blob)?;

    output::success(&format!(
        "Imported {} secret(s) from {file}",
        outcome.secrets
    ));
    if outcome.relocked {
        output::info("The imported vault has its own salt — unlock it with its original master password.");
    }

    Ok(())
}
