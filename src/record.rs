//! The subject under evaluation.
//!
//! A [`Record`] is a small bag of boolean and string fields owned by the
//! caller. Handlers read it and may write to it; the pipeline never
//! replaces or drops it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Well-known field names used by the built-in order handlers.
pub mod fields {
    pub const AUTHENTICATED: &str = "authenticated";
    pub const AUTHORIZED: &str = "authorized";
    pub const VALID: &str = "valid";
    pub const CACHED: &str = "cached";
}

/// A single field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// Mutable record evaluated against a pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter.
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Order record with the three gate flags set.
    pub fn order(authenticated: bool, authorized: bool, valid: bool) -> Self {
        Self::new()
            .with(fields::AUTHENTICATED, authenticated)
            .with(fields::AUTHORIZED, authorized)
            .with(fields::VALID, valid)
    }

    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Read a boolean field. Missing or non-boolean fields read as `false`.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.fields.get(name), Some(FieldValue::Flag(true)))
    }

    pub fn set_flag(&mut self, name: &str, value: bool) {
        self.set(name, value);
    }

    /// Read a string field.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(FieldValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// SHA-256 hex digest over every field except `cached`.
    ///
    /// Stable across processes: fields are hashed in key order, so two
    /// records with identical content always share a digest whether or not
    /// they have been cached yet.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for (name, value) in self.fields.iter().filter(|(k, _)| k.as_str() != fields::CACHED) {
            hasher.update(name.as_bytes());
            hasher.update([0u8]);
            match value {
                FieldValue::Flag(b) => hasher.update(if *b { b"b:1" } else { b"b:0" }),
                FieldValue::Text(s) => {
                    hasher.update(b"s:");
                    hasher.update(s.as_bytes());
                }
            }
            hasher.update([0xffu8]);
        }
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_flag_reads_false() {
        let record = Record::new().with("note", "hello");
        assert!(!record.flag(fields::CACHED));
        // A text field is never a true flag.
        assert!(!record.flag("note"));
        assert_eq!(record.text("note"), Some("hello"));
    }

    #[test]
    fn test_order_constructor() {
        let record = Record::order(true, false, true);
        assert!(record.flag(fields::AUTHENTICATED));
        assert!(!record.flag(fields::AUTHORIZED));
        assert!(record.flag(fields::VALID));
        assert!(!record.contains(fields::CACHED));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_digest_ignores_cached_flag() {
        let plain = Record::order(true, true, true);
        let mut cached = plain.clone();
        cached.set_flag(fields::CACHED, true);

        assert_eq!(plain.digest(), cached.digest());
        assert_eq!(plain.digest().len(), 64);
    }

    #[test]
    fn test_digest_distinguishes_content() {
        let a = Record::order(true, true, true);
        let b = Record::order(true, true, false);
        let c = Record::new().with("valid", "true");
        assert_ne!(a.digest(), b.digest());
        assert_ne!(Record::new().with("valid", true).digest(), c.digest());
    }

    #[test]
    fn test_json_shape() {
        let record = Record::new().with("authenticated", true).with("user", "ana");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"authenticated":true,"user":"ana"}"#);

        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
