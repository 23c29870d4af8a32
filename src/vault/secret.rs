//! Secret records stored inside a vault, plus the views and inputs the
//! engine exchanges with callers.
//!
//! `StoredSecret` is the on-disk form: the value is ciphertext
//! (IV || bytes) serialized as base64.  `SecretInfo` is the metadata-only
//! view returned by listings; `RevealedSecret` adds the decrypted value.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use zeroize::Zeroize;

use super::format::{base64_decode, base64_encode};

/// Type assigned when the caller does not supply one.
pub const DEFAULT_TYPE: &str = "generic";

/// Types the shell suggests.  `type` is an open string; any value is accepted.
pub const KNOWN_TYPES: [&str; 5] = ["generic", "password", "token", "certificate", "key"];

fn default_type() -> String {
    DEFAULT_TYPE.to_string()
}

/// A single encrypted secret as persisted in the vault file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSecret {
    /// Opaque, immutable identifier.
    pub id: String,

    /// Display label; not unique.
    pub name: String,

    #[serde(rename = "type", default = "default_type")]
    pub secret_type: String,

    /// Ciphertext bytes (IV || ciphertext), base64 in JSON.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub value: Vec<u8>,

    /// SHA-256 hex of the plaintext value.
    pub value_hash: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub metadata: Map<String, Value>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub notes: String,
}

impl StoredSecret {
    /// Metadata-only view of this record (ciphertext stripped).
    pub fn info(&self) -> SecretInfo {
        SecretInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            secret_type: self.secret_type.clone(),
            value_hash: self.value_hash.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            expires_at: self.expires_at,
            metadata: self.metadata.clone(),
            tags: self.tags.clone(),
            notes: self.notes.clone(),
        }
    }

    /// `true` if `expires_at` is set and not after `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        expired(self.expires_at, now)
    }
}

/// An expiry is reached once `now` is at or past it.
fn expired(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expires_at.is_some_and(|at| at <= now)
}

/// Everything about a secret except its value.
///
/// Returned by `get_secret_meta`, `list_secrets`, and the query
/// operations, none of which decrypt anything.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretInfo {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub secret_type: String,
    pub value_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub metadata: Map<String, Value>,
    pub tags: Vec<String>,
    pub notes: String,
}

impl SecretInfo {
    /// `true` if `expires_at` is set and not after `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        expired(self.expires_at, now)
    }
}

/// A secret together with its decrypted value.
///
/// The plaintext is wiped from memory when this is dropped.
#[derive(Debug, Clone)]
pub struct RevealedSecret {
    pub info: SecretInfo,
    pub value: String,
}

impl Drop for RevealedSecret {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

/// Input for `add_secret`.
///
/// Only `name` and `value` are required; everything else has a default.
#[derive(Debug, Clone, Default)]
pub struct NewSecret {
    pub name: String,
    pub value: String,
    pub secret_type: Option<String>,
    pub tags: Vec<String>,
    pub metadata: Map<String, Value>,
    pub notes: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewSecret {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, secret_type: impl Into<String>) -> Self {
        self.secret_type = Some(secret_type.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

/// Partial update for `update_secret`.
///
/// `None` leaves a field untouched.  `metadata` is merged key by key,
/// `tags` replace the existing list.  `expires_at: Some(None)` clears
/// the expiry.
#[derive(Debug, Clone, Default)]
pub struct SecretUpdate {
    pub name: Option<String>,
    pub value: Option<String>,
    pub secret_type: Option<String>,
    pub tags: Option<Vec<String>>,
    pub metadata: Option<Map<String, Value>>,
    pub notes: Option<String>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

impl SecretUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn secret_type(mut self, secret_type: impl Into<String>) -> Self {
        self.secret_type = Some(secret_type.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn expires_at(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// `true` if no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.value.is_none()
            && self.secret_type.is_none()
            && self.tags.is_none()
            && self.metadata.is_none()
            && self.notes.is_none()
            && self.expires_at.is_none()
    }
}

impl Drop for SecretUpdate {
    fn drop(&mut self) {
        if let Some(value) = self.value.as_mut() {
            value.zeroize();
        }
    }
}

/// Drop empty and repeated tags, keeping the first occurrence of each.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(tags.len());
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn stored(expires_at: Option<DateTime<Utc>>) -> StoredSecret {
        let now = Utc::now();
        StoredSecret {
            id: "abc123".into(),
            name: "db".into(),
            secret_type: "password".into(),
            value: vec![1, 2, 3],
            value_hash: "ff".into(),
            created_at: now,
            updated_at: now,
            expires_at,
            metadata: Map::new(),
            tags: vec!["prod".into()],
            notes: String::new(),
        }
    }

    #[test]
    fn expiry_is_inclusive_of_now() {
        let now = Utc::now();
        assert!(stored(Some(now)).is_expired_at(now));
        assert!(stored(Some(now - Duration::days(1))).is_expired_at(now));
        assert!(!stored(Some(now + Duration::days(1))).is_expired_at(now));
        assert!(!stored(None).is_expired_at(now));
    }

    #[test]
    fn info_and_record_agree_on_expiry() {
        let now = Utc::now();
        let cases = [
            None,
            Some(now),
            Some(now - Duration::seconds(1)),
            Some(now + Duration::seconds(1)),
        ];
        for expires_at in cases {
            let record = stored(expires_at);
            assert_eq!(record.info().is_expired_at(now), record.is_expired_at(now));
        }
    }

    #[test]
    fn info_strips_ciphertext() {
        let info = stored(None).info();
        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("value").is_none());
        assert_eq!(json["type"], "password");
        assert_eq!(json["valueHash"], "ff");
    }

    #[test]
    fn stored_secret_defaults_optional_fields() {
        let json = r#"{
            "id": "x1",
            "name": "n",
            "value": "AQID",
            "valueHash": "h",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }"#;
        let s: StoredSecret = serde_json::from_str(json).unwrap();
        assert_eq!(s.secret_type, "generic");
        assert_eq!(s.value, vec![1, 2, 3]);
        assert!(s.tags.is_empty());
        assert!(s.metadata.is_empty());
        assert!(s.notes.is_empty());
        assert!(s.expires_at.is_none());
    }

    #[test]
    fn normalize_tags_dedups_in_order() {
        let tags = vec!["b".into(), "a".into(), " b ".into(), "".into(), "c".into()];
        assert_eq!(normalize_tags(tags), vec!["b", "a", "c"]);
    }

    #[test]
    fn update_builder_tracks_emptiness() {
        assert!(SecretUpdate::new().is_empty());
        assert!(!SecretUpdate::new().notes("n").is_empty());
        assert!(!SecretUpdate::new().expires_at(None).is_empty());
    }

    #[test]
    fn new_secret_builder_sets_fields() {
        let s = NewSecret::new("api", "tok")
            .with_type("token")
            .with_tags(["ci", "github"])
            .with_metadata("owner", "ops")
            .with_notes("rotate monthly");
        assert_eq!(s.secret_type.as_deref(), Some("token"));
        assert_eq!(s.tags, vec!["ci", "github"]);
        assert_eq!(s.metadata["owner"], "ops");
        assert_eq!(s.notes.as_deref(), Some("rotate monthly"));
    }
}
