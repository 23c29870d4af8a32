//! `secretvault get` — print a secret's value or its metadata.

use chrono::Utc;

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `get` command.
pub fn execute(cli: &Cli, id: &str, meta_only: bool) -> Result<()> {
    let engine = open_vault(cli)?;

    if meta_only {
        let info = engine.get_secret_meta(id)?;
        output::print_secret_details(&info, Utc::now());
        return Ok(());
    }

    // Decrypt and print the secret value to stdout.
    let secret = engine.get_secret(id)?;
    if secret.info.is_expired_at(Utc::now()) {
        output::warning(&format!("Secret '{}' has expired.", secret.info.name));
    }
    println!("{}", secret.value);

    Ok(())
}
