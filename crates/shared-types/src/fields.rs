//! Per-bureau field sets and the blank-value rule
//!
//! A [`FieldSet`] maps canonical field keys (`balance`, `account_status`, ...)
//! to normalized JSON values. Every value that came out of a document also
//! carries a `<key>_raw` twin holding the untouched cell text.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Suffix of the twin entry that preserves original document text
pub const RAW_SUFFIX: &str = "_raw";

/// Tokens bureaus print in place of a value
const BLANK_TOKENS: &[&str] = &["n/a", "na", "not reported", "--"];

pub fn raw_key(key: &str) -> String {
    format!("{}{}", key, RAW_SUFFIX)
}

/// True when text carries no information.
pub fn is_blank_text(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return true;
    }
    let lower = trimmed.to_lowercase();
    BLANK_TOKENS.contains(&lower.as_str())
}

/// Blank-value rule shared by extraction and the `exists`/`empty` comparators.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => is_blank_text(s),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Render a value as comparison/display text.
///
/// Integral floats print without a fractional part so `100.0` and `"100"`
/// compare equal.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSet(BTreeMap<String, Value>);

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a field set from a JSON object; anything else yields an empty set.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map.into_iter().collect()),
            _ => Self::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Store a document-sourced value together with its raw twin.
    pub fn insert_extracted(&mut self, key: &str, value: Value, raw: &str) {
        self.0.insert(raw_key(key), Value::String(raw.to_string()));
        self.0.insert(key.to_string(), value);
    }

    /// Original document text for `key`, if it was extracted.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.0.get(&raw_key(key)).and_then(Value::as_str)
    }

    /// Non-blank text for `key`: raw twin first, then the normalized value.
    pub fn display_text(&self, key: &str) -> Option<String> {
        if let Some(raw) = self.raw(key).filter(|r| !is_blank_text(r)) {
            return Some(raw.trim().to_string());
        }
        self.get(key)
            .filter(|v| !is_blank(v))
            .map(value_text)
    }

    /// Resolve a dot-separated path, descending into nested objects and
    /// arrays. A key that literally contains dots wins over descent.
    pub fn resolve(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.0.get(path) {
            return Some(value);
        }
        let mut segments = path.split('.');
        let mut current = self.0.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Keys that are not raw twins.
    pub fn data_keys(&self) -> impl Iterator<Item = &str> {
        self.0
            .keys()
            .map(String::as_str)
            .filter(|k| !k.ends_with(RAW_SUFFIX))
    }

    pub fn has_data(&self) -> bool {
        self.data_keys().next().is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for FieldSet {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
