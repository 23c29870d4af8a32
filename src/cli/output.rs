//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use chrono::{DateTime, Utc};
use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::SecretInfo;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of secret metadata (Id, Name, Type, Tags, Expires, Updated).
///
/// Rows are marked expired against the single cutoff `now`.
pub fn print_secrets_table(secrets: &[SecretInfo], now: DateTime<Utc>) {
    if secrets.is_empty() {
        info("No matching secrets.");
        tip("Run `secretvault add <NAME>` to add a secret.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Name", "Type", "Tags", "Expires", "Updated"]);

    for s in secrets {
        table.add_row(vec![
            s.id.clone(),
            s.name.clone(),
            s.secret_type.clone(),
            s.tags.join(", "),
            expiry_cell(s, now),
            s.updated_at.format(TIME_FORMAT).to_string(),
        ]);
    }

    println!("{table}");
}

/// Print every metadata field of one secret.
pub fn print_secret_details(secret: &SecretInfo, now: DateTime<Utc>) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec!["Id".to_string(), secret.id.clone()]);
    table.add_row(vec!["Name".to_string(), secret.name.clone()]);
    table.add_row(vec!["Type".to_string(), secret.secret_type.clone()]);
    table.add_row(vec!["Tags".to_string(), secret.tags.join(", ")]);
    table.add_row(vec!["Expires".to_string(), expiry_cell(secret, now)]);
    table.add_row(vec![
        "Created".to_string(),
        secret.created_at.format(TIME_FORMAT).to_string(),
    ]);
    table.add_row(vec![
        "Updated".to_string(),
        secret.updated_at.format(TIME_FORMAT).to_string(),
    ]);
    table.add_row(vec!["Value hash".to_string(), secret.value_hash.clone()]);
    for (key, value) in &secret.metadata {
        let shown = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        table.add_row(vec![format!("meta.{key}"), shown]);
    }
    if !secret.notes.is_empty() {
        table.add_row(vec!["Notes".to_string(), secret.notes.clone()]);
    }

    println!("{table}");
}

fn expiry_cell(secret: &SecretInfo, now: DateTime<Utc>) -> String {
    match secret.expires_at {
        Some(at) if secret.is_expired_at(now) => format!("{} (expired)", at.format(TIME_FORMAT)),
        Some(at) => at.format(TIME_FORMAT).to_string(),
        None => "never".to_string(),
    }
}
