//! `secretvault search` — find secrets by name, type, or tag.

use chrono::Utc;

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `search` command.
pub fn execute(cli: &Cli, query: &str) -> Result<()> {
    let engine = open_vault(cli)?;
    let matches = engine.search_secrets(query)?;

    output::info(&format!("{} match(es) for '{query}'", matches.len()));
    output::print_secrets_table(&matches, Utc::now());

    Ok(())
}
