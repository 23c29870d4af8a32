//! `secretvault export` — write the encrypted vault document.
//!
//! The export contains ciphertexts, hashes, and the salt — never
//! plaintext — and can be restored with `secretvault import`.

use std::fs;
use std::path::Path;

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::{Result, SecretVaultError};

/// Execute the `export` command.
pub fn execute(cli: &Cli, output_path: Option<&str>) -> Result<()> {
    let engine = open_vault(cli)?;
    let content = engine.export_vault()?;

    match output_path {
        Some(dest) => {
            let dest_path = Path::new(dest);

            // Safety: refuse to overwrite the live vault file.
            if is_same_file(dest_path, engine.path()) {
                return Err(SecretVaultError::CommandFailed(
                    "refusing to export over the vault file itself".into(),
                ));
            }

            fs::write(dest_path, &content).map_err(|e| {
                SecretVaultError::CommandFailed(format!("failed to write export file: {e}"))
            })?;

            output::success(&format!(
                "Exported {} secret(s) to {dest}",
                engine.secret_count()?
            ));
        }
        None => {
            // Write to stdout (no success message, just raw output).
            println!("{content}");
        }
    }

    Ok(())
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
