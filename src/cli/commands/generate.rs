//! `secretvault generate` — print a random URL-safe secret.

use crate::cli::{secret_length, Cli};
use crate::crypto::generate_secret;
use crate::errors::Result;

/// Execute the `generate` command.
pub fn execute(cli: &Cli, length: Option<usize>) -> Result<()> {
    let length = secret_length(cli, length)?;
    println!("{}", generate_secret(length));
    Ok(())
}
