//! Rule table shapes
//!
//! Rule tables arrive in one of three layouts:
//!
//! - a direct mapping `{"RULE_ID": {...}, ...}`
//! - a wrapper `{"rules": <mapping or list>}`
//! - a list `[{"id": "RULE_ID", ...}, ...]`
//!
//! All of them reduce to one ordered list of `(id, definition)` entries.

use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::error::RuleSourceError;

/// One rule definition as found in the source, keyed by its id
pub type RuleEntry = (String, Map<String, Value>);

/// Flatten any supported layout into ordered entries.
///
/// Entries that are not objects, or that have no usable id, are skipped. A
/// repeated id replaces the earlier definition in place.
pub fn normalize_rule_source(source: &Value) -> Vec<RuleEntry> {
    let mut entries: Vec<RuleEntry> = Vec::new();
    let mut push = |id: String, def: &Map<String, Value>| {
        let id = id.trim().to_string();
        if id.is_empty() {
            tracing::debug!("skipping rule without id");
            return;
        }
        match entries.iter_mut().find(|(existing, _)| *existing == id) {
            Some(slot) => slot.1 = def.clone(),
            None => entries.push((id, def.clone())),
        }
    };

    match source {
        Value::Object(map) => {
            if let Some(inner @ (Value::Object(_) | Value::Array(_))) = map.get("rules") {
                return normalize_rule_source(inner);
            }
            for (id, def) in map {
                match def {
                    Value::Object(def) => push(id.clone(), def),
                    _ => tracing::debug!(rule = %id, "skipping non-object rule entry"),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                let Some(def) = item.as_object() else {
                    tracing::debug!("skipping non-object rule entry");
                    continue;
                };
                match def.get("id") {
                    Some(Value::String(id)) => push(id.clone(), def),
                    Some(Value::Number(n)) => push(n.to_string(), def),
                    _ => tracing::debug!("skipping rule without id"),
                }
            }
        }
        _ => tracing::debug!("rule source is neither a mapping nor a list"),
    }
    entries
}

/// Parse JSON rule-table text. The shape is checked; rule contents are not.
pub fn parse_rule_source(text: &str) -> Result<Value, RuleSourceError> {
    let value: Value = serde_json::from_str(text)?;
    match value {
        Value::Object(_) | Value::Array(_) => Ok(value),
        other => Err(RuleSourceError::Shape(format!(
            "expected a mapping or list of rules, found {}",
            json_kind(&other)
        ))),
    }
}

pub fn read_rule_source<P: AsRef<Path>>(path: P) -> Result<Value, RuleSourceError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| RuleSourceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_rule_source(&text)
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
