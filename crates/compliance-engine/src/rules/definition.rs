//! Declarative rule definitions, as authored

use serde::Deserialize;
use serde_json::{Map, Value};

/// Rule scopes understood by the per-bureau evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    PerBureau,
    Other,
}

impl RuleScope {
    /// `per_bureau`, `per-bureau` and `tradeline` are per-bureau; a missing
    /// scope is too. Anything else is evaluated elsewhere (or not at all).
    pub fn parse(scope: Option<&str>) -> RuleScope {
        let Some(scope) = scope else {
            return RuleScope::PerBureau;
        };
        let normalized = scope.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "" | "per_bureau" | "tradeline" => RuleScope::PerBureau,
            _ => RuleScope::Other,
        }
    }
}

/// Predicate tree of a rule
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateNode {
    All(Vec<PredicateNode>),
    Any(Vec<PredicateNode>),
    Not(Box<PredicateNode>),
    Leaf(LeafCondition),
    /// A node that could not be read; compiles to nothing
    Unresolved,
}

impl PredicateNode {
    pub fn from_value(value: &Value) -> PredicateNode {
        let Some(obj) = value.as_object() else {
            return PredicateNode::Unresolved;
        };
        if let Some(children) = key(obj, "all") {
            return PredicateNode::All(list(children));
        }
        if let Some(children) = key(obj, "any") {
            return PredicateNode::Any(list(children));
        }
        if let Some(inner) = key(obj, "not") {
            return PredicateNode::Not(Box::new(PredicateNode::from_value(inner)));
        }
        if obj.contains_key("field") {
            return match LeafCondition::deserialize(value) {
                Ok(leaf) => PredicateNode::Leaf(leaf),
                Err(err) => {
                    tracing::debug!(error = %err, "unreadable leaf condition");
                    PredicateNode::Unresolved
                }
            };
        }
        PredicateNode::Unresolved
    }
}

fn key<'a>(obj: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    obj.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v)
}

fn list(children: &Value) -> Vec<PredicateNode> {
    match children {
        Value::Array(items) => items.iter().map(PredicateNode::from_value).collect(),
        Value::Null => Vec::new(),
        single => vec![PredicateNode::from_value(single)],
    }
}

/// A single-field condition. Every comparator present must hold.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafCondition {
    /// Dot path into the field set
    pub field: String,
    #[serde(default)]
    pub eq: Option<Value>,
    #[serde(default, alias = "ne")]
    pub neq: Option<Value>,
    #[serde(default, rename = "in")]
    pub in_list: Option<Value>,
    #[serde(default, alias = "notIn", alias = "not_in")]
    pub nin: Option<Value>,
    #[serde(default, alias = "match")]
    pub regex: Option<String>,
    #[serde(default)]
    pub flags: Option<String>,
    #[serde(default)]
    pub exists: Option<Value>,
    #[serde(default)]
    pub empty: Option<Value>,
    #[serde(default)]
    pub gt: Option<Value>,
    #[serde(default)]
    pub gte: Option<Value>,
    #[serde(default)]
    pub lt: Option<Value>,
    #[serde(default)]
    pub lte: Option<Value>,
    #[serde(default, alias = "case_sensitive")]
    pub case_sensitive: Option<bool>,
    #[serde(default)]
    pub trim: Option<bool>,
}

/// A rule as written in a rule table
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDefinition {
    pub id: String,
    pub scope: Option<String>,
    pub rule: PredicateNode,
    pub detail: Option<String>,
    pub category: Option<String>,
    pub evidence: Option<Value>,
    pub evidence_fields: Vec<String>,
    pub fields_impacted: Vec<String>,
}

impl RuleDefinition {
    pub fn from_entry(id: &str, def: &Map<String, Value>) -> RuleDefinition {
        let text = |name: &str| {
            def.get(name)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let strings = |names: &[&str]| -> Vec<String> {
            match names.iter().find_map(|n| def.get(*n)) {
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
                Some(Value::String(single)) if !single.trim().is_empty() => {
                    vec![single.trim().to_string()]
                }
                _ => Vec::new(),
            }
        };

        RuleDefinition {
            id: id.to_string(),
            scope: text("scope"),
            rule: def
                .get("rule")
                .map(PredicateNode::from_value)
                .unwrap_or(PredicateNode::Unresolved),
            detail: text("detail"),
            category: text("category"),
            evidence: def.get("evidence").filter(|v| !v.is_null()).cloned(),
            evidence_fields: strings(&["evidenceFields", "evidence_fields"]),
            fields_impacted: strings(&["fieldsImpacted", "fields_impacted"]),
        }
    }

    pub fn scope(&self) -> RuleScope {
        RuleScope::parse(self.scope.as_deref())
    }
}
