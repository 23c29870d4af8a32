//! `secretvault add` — encrypt and store a new secret.

use crate::cli::output;
use crate::cli::{
    open_vault, parse_expiry, parse_meta_entry, read_secret_value, secret_length, Cli,
};
use crate::crypto::generate_secret;
use crate::errors::Result;
use crate::vault::secret::KNOWN_TYPES;
use crate::vault::NewSecret;

/// Arguments of the `add` command.
pub struct AddArgs<'a> {
    pub name: &'a str,
    pub value: Option<&'a str>,
    pub secret_type: Option<&'a str>,
    pub tags: &'a [String],
    pub notes: Option<&'a str>,
    pub expires: Option<&'a str>,
    pub meta: &'a [String],
    pub generate: Option<Option<usize>>,
}

/// Execute the `add` command.
pub fn execute(cli: &Cli, args: &AddArgs<'_>) -> Result<()> {
    // Validate everything before asking for any input.
    let expires_at = args.expires.map(parse_expiry).transpose()?;
    let metadata = args
        .meta
        .iter()
        .map(|entry| parse_meta_entry(entry))
        .collect::<Result<Vec<_>>>()?;

    // Determine the value: generated, inline, piped, or prompted.
    let generated = args.generate.is_some();
    let value = match args.generate {
        Some(length) => zeroize::Zeroizing::new(generate_secret(secret_length(cli, length)?)),
        None => read_secret_value(args.value, &format!("Enter value for {}", args.name))?,
    };

    let mut new = NewSecret::new(args.name, value.as_str()).with_tags(args.tags.iter().cloned());
    if let Some(t) = args.secret_type {
        new = new.with_type(t);
    }
    if let Some(n) = args.notes {
        new = new.with_notes(n);
    }
    if let Some(at) = expires_at {
        new = new.with_expiry(at);
    }
    for (key, val) in metadata {
        new = new.with_metadata(key, val);
    }

    let mut engine = open_vault(cli)?;
    let added = engine.add_secret(new)?;

    output::success(&format!(
        "Added secret '{}' with id {} ({} total)",
        added.info.name,
        added.info.id,
        engine.secret_count()?
    ));

    if !KNOWN_TYPES.contains(&added.info.secret_type.as_str()) {
        output::tip(&format!(
            "'{}' is a custom type; built-in types are {}",
            added.info.secret_type,
            KNOWN_TYPES.join(", ")
        ));
    }

    // A generated value is shown exactly once.
    if generated {
        println!("{}", added.value);
    }

    Ok(())
}
