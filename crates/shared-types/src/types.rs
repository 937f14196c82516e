use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

use crate::fields::{is_blank, value_text};

lazy_static! {
    static ref TRANSUNION_ALIAS: Regex = Regex::new(r"(?i)\b(trans\s*union|tuc?)\b").unwrap();
    static ref EXPERIAN_ALIAS: Regex = Regex::new(r"(?i)\b(experian|expn?)\b").unwrap();
    static ref EQUIFAX_ALIAS: Regex = Regex::new(r"(?i)\b(equifax|eqf|eqx)\b").unwrap();
}

/// The three national consumer reporting agencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Bureau {
    TransUnion,
    Experian,
    Equifax,
}

impl Bureau {
    pub const ALL: [Bureau; 3] = [Bureau::TransUnion, Bureau::Experian, Bureau::Equifax];

    /// Display name as printed on bureau reports
    pub fn name(&self) -> &'static str {
        match self {
            Bureau::TransUnion => "TransUnion",
            Bureau::Experian => "Experian",
            Bureau::Equifax => "Equifax",
        }
    }

    /// Map a column header or cell value onto a bureau.
    ///
    /// Accepts the long names plus the short codes report vendors use
    /// (TU/TUC, EXP/EXPN, EQF/EQX). Anything else is `None`; callers drop
    /// those columns rather than guess.
    pub fn canonicalize(text: &str) -> Option<Bureau> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if TRANSUNION_ALIAS.is_match(text) {
            Some(Bureau::TransUnion)
        } else if EXPERIAN_ALIAS.is_match(text) {
            Some(Bureau::Experian)
        } else if EQUIFAX_ALIAS.is_match(text) {
            Some(Bureau::Equifax)
        } else {
            None
        }
    }
}

impl fmt::Display for Bureau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A flagged reporting inconsistency or compliance issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule identifier, e.g. "CURRENT_WITH_PAST_DUE"
    pub code: String,
    pub label: String,
    pub severity: u32,
    /// Fair Credit Reporting Act citation, e.g. "15 U.S.C. § 1681s-2(a)(1)"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fcra_section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields_impacted: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bureau: Option<Bureau>,
    #[serde(default)]
    pub bureaus: BTreeSet<Bureau>,
}

impl Violation {
    /// Tag the violation with the bureau whose data produced it
    pub fn with_bureau(mut self, bureau: Bureau) -> Self {
        self.bureau = Some(bureau);
        self.bureaus.insert(bureau);
        self
    }

    /// Bureaus this violation applies to, falling back to the single tag.
    pub fn bureau_set(&self) -> BTreeSet<Bureau> {
        let mut set = self.bureaus.clone();
        if let Some(bureau) = self.bureau {
            set.insert(bureau);
        }
        set
    }

    /// Consumer-facing title: "Category – Title" when a category is present.
    /// `None` when the violation has no usable label.
    pub fn headline_text(&self) -> Option<String> {
        let title = self.label.trim();
        if title.is_empty() {
            return None;
        }
        match self.category.as_deref().map(str::trim) {
            Some(category) if !category.is_empty() => Some(format!("{} – {}", category, title)),
            _ => Some(title.to_string()),
        }
    }

    /// Build a violation from loosely-typed external data.
    ///
    /// Accepts camelCase or snake_case keys. Returns `None` when no code can
    /// be found. Severity is coerced with [`coerce_severity`].
    pub fn from_value(value: &Value) -> Option<Violation> {
        let obj = value.as_object()?;
        let text = |keys: &[&str]| {
            keys.iter()
                .filter_map(|k| obj.get(*k))
                .find(|v| !is_blank(v))
                .map(value_text)
        };

        let code = text(&["code", "id", "rule"])?;
        let label = text(&["label", "title"]).unwrap_or_else(|| code.clone());
        let severity = obj.get("severity").map(coerce_severity).unwrap_or(0);

        let mut bureaus: BTreeSet<Bureau> = match obj.get("bureaus") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| Bureau::canonicalize(&value_text(v)))
                .collect(),
            _ => BTreeSet::new(),
        };
        let bureau = text(&["bureau"]).and_then(|b| Bureau::canonicalize(&b));
        if let Some(bureau) = bureau {
            bureaus.insert(bureau);
        }

        let fields_impacted = match obj.get("fieldsImpacted").or_else(|| obj.get("fields_impacted")) {
            Some(Value::Array(items)) => items
                .iter()
                .filter(|v| !is_blank(v))
                .map(value_text)
                .collect(),
            _ => Vec::new(),
        };

        Some(Violation {
            code,
            label,
            severity,
            fcra_section: text(&["fcraSection", "fcra_section", "fcra"]),
            category: text(&["category"]),
            detail: text(&["detail"]),
            evidence: obj.get("evidence").filter(|v| !v.is_null()).cloned(),
            fields_impacted,
            scope: text(&["scope"]),
            bureau,
            bureaus,
        })
    }
}

/// Coerce an untrusted severity into a non-negative integer.
///
/// Numbers are truncated; numeric strings are parsed; negative, non-finite
/// and non-numeric values become 0.
pub fn coerce_severity(value: &Value) -> u32 {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() && n > 0.0 => n.min(u32::MAX as f64) as u32,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonicalize_bureau_aliases() {
        assert_eq!(Bureau::canonicalize("TransUnion"), Some(Bureau::TransUnion));
        assert_eq!(Bureau::canonicalize("Trans Union"), Some(Bureau::TransUnion));
        assert_eq!(Bureau::canonicalize("TUC"), Some(Bureau::TransUnion));
        assert_eq!(Bureau::canonicalize("tu"), Some(Bureau::TransUnion));
        assert_eq!(Bureau::canonicalize("Experian"), Some(Bureau::Experian));
        assert_eq!(Bureau::canonicalize("EXP"), Some(Bureau::Experian));
        assert_eq!(Bureau::canonicalize("Equifax"), Some(Bureau::Equifax));
        assert_eq!(Bureau::canonicalize("EQF"), Some(Bureau::Equifax));
        assert_eq!(Bureau::canonicalize("eqx"), Some(Bureau::Equifax));
    }

    #[test]
    fn test_canonicalize_rejects_unknown_headers() {
        assert_eq!(Bureau::canonicalize(""), None);
        assert_eq!(Bureau::canonicalize("—"), None);
        assert_eq!(Bureau::canonicalize("Innovis"), None);
        assert_eq!(Bureau::canonicalize("Tuesday"), None);
    }

    #[test]
    fn test_coerce_severity() {
        assert_eq!(coerce_severity(&json!(3)), 3);
        assert_eq!(coerce_severity(&json!(2.9)), 2);
        assert_eq!(coerce_severity(&json!("4")), 4);
        assert_eq!(coerce_severity(&json!(-1)), 0);
        assert_eq!(coerce_severity(&json!("high")), 0);
        assert_eq!(coerce_severity(&Value::Null), 0);
    }

    #[test]
    fn test_violation_from_external_value() {
        let v = Violation::from_value(&json!({
            "code": "late_payment_current",
            "severity": "3",
            "bureau": "EQF",
            "fcraSection": "1681s-2(a)",
            "detail": "Balance past due on current account"
        }))
        .expect("violation parses");

        assert_eq!(v.code, "late_payment_current");
        assert_eq!(v.label, "late_payment_current");
        assert_eq!(v.severity, 3);
        assert_eq!(v.bureau, Some(Bureau::Equifax));
        assert!(v.bureaus.contains(&Bureau::Equifax));
        assert_eq!(v.fcra_section.as_deref(), Some("1681s-2(a)"));
    }

    #[test]
    fn test_violation_without_code_is_rejected() {
        assert!(Violation::from_value(&json!({"label": "x"})).is_none());
        assert!(Violation::from_value(&json!("CODE")).is_none());
    }

    #[test]
    fn test_headline_text() {
        let mut v = Violation {
            code: "X".into(),
            label: "Balance reported on closed account".into(),
            ..Default::default()
        };
        assert_eq!(
            v.headline_text().as_deref(),
            Some("Balance reported on closed account")
        );
        v.category = Some("Metro 2".into());
        assert_eq!(
            v.headline_text().as_deref(),
            Some("Metro 2 – Balance reported on closed account")
        );
        v.label = "  ".into();
        assert_eq!(v.headline_text(), None);
    }
}
