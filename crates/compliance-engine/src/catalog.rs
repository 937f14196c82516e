//! Violation metadata catalog
//!
//! Maps an uppercase violation code to its consumer-facing label, severity,
//! FCRA citation and category.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{coerce_severity, is_blank, value_text, Violation};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::RuleSourceError;
use crate::rules::source::json_kind;
use crate::rules::ExtraMetadata;

/// Label given to codes the catalog does not know
pub const GENERIC_LABEL: &str = "Potential reporting violation";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub label: String,
    pub severity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fcra_section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl CatalogEntry {
    fn generic() -> CatalogEntry {
        CatalogEntry {
            label: GENERIC_LABEL.to_string(),
            severity: 1,
            fcra_section: None,
            category: None,
        }
    }

    /// Lenient read of one catalog entry. A missing severity defaults to 1.
    fn from_value(code: &str, value: &Value) -> Option<CatalogEntry> {
        let obj = value.as_object()?;
        let text = |keys: &[&str]| {
            keys.iter()
                .filter_map(|k| obj.get(*k))
                .find(|v| !is_blank(v))
                .map(|v| value_text(v).trim().to_string())
        };
        Some(CatalogEntry {
            label: text(&["label", "title"]).unwrap_or_else(|| code.to_string()),
            severity: obj.get("severity").map(coerce_severity).unwrap_or(1),
            fcra_section: text(&["fcraSection", "fcra_section", "fcra"]),
            category: text(&["category"]),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViolationCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

fn catalog_key(code: &str) -> String {
    code.trim().to_uppercase()
}

impl ViolationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object keyed by code. Non-object entries are skipped.
    pub fn from_value(value: &Value) -> ViolationCatalog {
        let mut catalog = ViolationCatalog::new();
        if let Value::Object(map) = value {
            for (code, entry) in map {
                match CatalogEntry::from_value(code, entry) {
                    Some(entry) => catalog.insert(code, entry),
                    None => tracing::debug!(code = %code, "skipping malformed catalog entry"),
                }
            }
        }
        catalog
    }

    pub fn from_json_str(text: &str) -> Result<ViolationCatalog, RuleSourceError> {
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(RuleSourceError::Shape(format!(
                "expected a catalog mapping, found {}",
                json_kind(&value)
            )));
        }
        Ok(Self::from_value(&value))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ViolationCatalog, RuleSourceError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| RuleSourceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn insert(&mut self, code: &str, entry: CatalogEntry) {
        self.entries.insert(catalog_key(code), entry);
    }

    pub fn get(&self, code: &str) -> Option<&CatalogEntry> {
        self.entries.get(&catalog_key(code))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the violation for `code`, catalog metadata first and rule extras
    /// on top. Unknown codes get [`GENERIC_LABEL`] at severity 1.
    pub fn enrich(&self, code: &str, extra: &ExtraMetadata) -> Violation {
        let code = catalog_key(code);
        let entry = self.get(&code).cloned().unwrap_or_else(CatalogEntry::generic);
        Violation {
            label: entry.label,
            severity: entry.severity,
            fcra_section: entry.fcra_section,
            category: extra.category.clone().or(entry.category),
            detail: extra.detail.clone(),
            evidence: extra.evidence.clone(),
            fields_impacted: extra.fields_impacted.clone(),
            scope: extra.scope.clone(),
            code,
            ..Default::default()
        }
    }
}
