//! `secretvault list` — display secrets in a table.

use chrono::Utc;

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `list` command.
///
/// `--expired` and `--type` combine: expired secrets of that type.
pub fn execute(cli: &Cli, secret_type: Option<&str>, expired: bool) -> Result<()> {
    let engine = open_vault(cli)?;

    let secrets = match (secret_type, expired) {
        (Some(t), true) => {
            let mut found = engine.get_expired_secrets()?;
            found.retain(|s| s.secret_type == t);
            found
        }
        (None, true) => engine.get_expired_secrets()?,
        (Some(t), false) => engine.get_secrets_by_type(t)?,
        (None, false) => engine.list_secrets()?,
    };

    output::info(&format!(
        "{} of {} secret(s)",
        secrets.len(),
        engine.secret_count()?
    ));

    output::print_secrets_table(&secrets, Utc::now());

    Ok(())
}
