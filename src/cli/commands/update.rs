//! `secretvault update` — change fields of an existing secret.

use crate::cli::output;
use crate::cli::{open_vault, parse_expiry, parse_meta_entry, read_secret_value, Cli};
use crate::errors::{Result, SecretVaultError};
use crate::vault::SecretUpdate;

/// Arguments of the `update` command.
pub struct UpdateArgs<'a> {
    pub id: &'a str,
    pub name: Option<&'a str>,
    pub value: Option<&'a str>,
    pub read_value: bool,
    pub secret_type: Option<&'a str>,
    pub tags: &'a [String],
    pub notes: Option<&'a str>,
    pub expires: Option<&'a str>,
    pub no_expiry: bool,
    pub meta: &'a [String],
}

/// Execute the `update` command.
pub fn execute(cli: &Cli, args: &UpdateArgs<'_>) -> Result<()> {
    let mut updates = SecretUpdate::new();

    if let Some(name) = args.name {
        updates = updates.name(name);
    }
    if let Some(t) = args.secret_type {
        updates = updates.secret_type(t);
    }
    if !args.tags.is_empty() {
        updates = updates.tags(args.tags.iter().cloned());
    }
    if let Some(notes) = args.notes {
        updates = updates.notes(notes);
    }
    if let Some(expires) = args.expires {
        updates = updates.expires_at(Some(parse_expiry(expires)?));
    } else if args.no_expiry {
        updates = updates.expires_at(None);
    }
    for entry in args.meta {
        let (key, value) = parse_meta_entry(entry)?;
        updates = updates.metadata(key, value);
    }
    if args.value.is_some() || args.read_value {
        let value = read_secret_value(args.value, &format!("Enter new value for {}", args.id))?;
        updates = updates.value(value.as_str());
    }

    if updates.is_empty() {
        return Err(SecretVaultError::InvalidInput(
            "nothing to update — pass at least one field flag".into(),
        ));
    }

    let mut engine = open_vault(cli)?;
    let info = engine.update_secret(args.id, updates)?;

    output::success(&format!("Updated secret '{}' ({})", info.name, info.id));
    Ok(())
}
