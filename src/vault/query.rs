//! Metadata-only record filters.
//!
//! None of these look at ciphertext; the engine maps matches to
//! `SecretInfo` views.

use chrono::{DateTime, Utc};

use super::secret::StoredSecret;

/// Case-insensitive substring match on name, type, or any tag.
///
/// An empty query matches everything.
pub fn matches_query(secret: &StoredSecret, query: &str) -> bool {
    let needle = query.to_lowercase();
    secret.name.to_lowercase().contains(&needle)
        || secret.secret_type.to_lowercase().contains(&needle)
        || secret
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(&needle))
}

/// Exact match on the record type.
pub fn matches_type(secret: &StoredSecret, secret_type: &str) -> bool {
    secret.secret_type == secret_type
}

/// Expired as of `now`.
pub fn is_expired(secret: &StoredSecret, now: DateTime<Utc>) -> bool {
    secret.is_expired_at(now)
}
