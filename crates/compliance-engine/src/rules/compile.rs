//! Compilation of rule definitions into predicates
//!
//! Rules are compiled once; evaluation never looks at the source JSON again.
//! Anything that cannot be compiled (unknown node, leaf without a recognized
//! comparator, invalid regex, non-numeric threshold) drops out. An `all`
//! missing any child is dropped whole; an `any` keeps the children that
//! compiled and is dropped only when none did.

use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};
use shared_types::normalize::numeric_value;
use shared_types::{is_blank, value_text, FieldSet};
use std::fs;
use std::path::Path;

use crate::error::RuleSourceError;
use crate::rules::definition::{LeafCondition, PredicateNode, RuleDefinition, RuleScope};
use crate::rules::source::{normalize_rule_source, parse_rule_source};

/// String comparison options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TextOptions {
    case_sensitive: bool,
    trim: bool,
}

impl TextOptions {
    fn prepare(&self, text: &str) -> String {
        let text = if self.trim { text.trim() } else { text };
        if self.case_sensitive {
            text.to_string()
        } else {
            text.to_lowercase()
        }
    }
}

/// An expected value, prepared for comparison
#[derive(Debug, Clone)]
struct Expected {
    text: String,
    number: Option<f64>,
}

impl Expected {
    fn new(value: &Value, options: TextOptions) -> Expected {
        Expected {
            text: options.prepare(&value_text(value)),
            number: match value {
                Value::Number(n) => n.as_f64(),
                _ => None,
            },
        }
    }

    fn matches(&self, actual: &Value, options: TextOptions) -> bool {
        if let Some(expected) = self.number {
            if let Some(actual) = numeric_value(&value_text(actual)) {
                return (actual - expected).abs() < 1e-9;
            }
        }
        options.prepare(&value_text(actual)) == self.text
    }
}

#[derive(Debug, Clone)]
enum Check {
    Eq(Expected),
    Neq(Expected),
    In(Vec<Expected>),
    Nin(Vec<Expected>),
    Regex(Regex),
    Exists(bool),
    Empty(bool),
    Gt(f64),
    Gte(f64),
    Lt(f64),
    Lte(f64),
}

/// Compiled single-field condition
#[derive(Debug, Clone)]
pub struct CompiledLeaf {
    path: String,
    options: TextOptions,
    checks: Vec<Check>,
}

impl CompiledLeaf {
    pub fn path(&self) -> &str {
        &self.path
    }

    fn evaluate(&self, fields: &FieldSet) -> bool {
        let actual = fields.resolve(&self.path).filter(|v| !v.is_null());
        self.checks.iter().all(|check| self.check(check, actual))
    }

    fn check(&self, check: &Check, actual: Option<&Value>) -> bool {
        let options = self.options;
        let number = || actual.and_then(|v| numeric_value(&value_text(v)));
        match check {
            Check::Eq(expected) => actual.map_or(false, |v| expected.matches(v, options)),
            Check::Neq(expected) => actual.map_or(true, |v| !expected.matches(v, options)),
            Check::In(list) => actual.map_or(false, |v| list.iter().any(|e| e.matches(v, options))),
            Check::Nin(list) => actual.map_or(true, |v| !list.iter().any(|e| e.matches(v, options))),
            Check::Regex(re) => actual.map_or(false, |v| {
                let text = value_text(v);
                re.is_match(if options.trim { text.trim() } else { text.as_str() })
            }),
            Check::Exists(wanted) => actual.map_or(false, |v| !is_blank(v)) == *wanted,
            Check::Empty(wanted) => actual.map_or(true, is_blank) == *wanted,
            Check::Gt(t) => number().map_or(false, |n| n > *t),
            Check::Gte(t) => number().map_or(false, |n| n >= *t),
            Check::Lt(t) => number().map_or(false, |n| n < *t),
            Check::Lte(t) => number().map_or(false, |n| n <= *t),
        }
    }
}

/// Executable predicate tree
#[derive(Debug, Clone)]
pub enum CompiledPredicate {
    All(Vec<CompiledPredicate>),
    Any(Vec<CompiledPredicate>),
    Not(Box<CompiledPredicate>),
    Leaf(CompiledLeaf),
}

impl CompiledPredicate {
    pub fn evaluate(&self, fields: &FieldSet) -> bool {
        match self {
            CompiledPredicate::All(children) => children.iter().all(|c| c.evaluate(fields)),
            CompiledPredicate::Any(children) => children.iter().any(|c| c.evaluate(fields)),
            CompiledPredicate::Not(inner) => !inner.evaluate(fields),
            CompiledPredicate::Leaf(leaf) => leaf.evaluate(fields),
        }
    }

    /// Compile a node; `None` when nothing in it can be evaluated.
    pub fn compile(node: &PredicateNode) -> Option<CompiledPredicate> {
        match node {
            PredicateNode::All(children) => {
                let compiled: Option<Vec<_>> = children.iter().map(Self::compile).collect();
                compiled
                    .filter(|c| !c.is_empty())
                    .map(CompiledPredicate::All)
            }
            PredicateNode::Any(children) => {
                let compiled: Vec<_> = children.iter().filter_map(Self::compile).collect();
                (!compiled.is_empty()).then_some(CompiledPredicate::Any(compiled))
            }
            PredicateNode::Not(inner) => {
                Self::compile(inner).map(|c| CompiledPredicate::Not(Box::new(c)))
            }
            PredicateNode::Leaf(leaf) => compile_leaf(leaf).map(CompiledPredicate::Leaf),
            PredicateNode::Unresolved => None,
        }
    }
}

fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        _ => None,
    }
}

fn threshold(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => numeric_value(s),
        _ => None,
    }
}

fn expected_list(value: &Value, options: TextOptions) -> Vec<Expected> {
    match value {
        Value::Array(items) => items.iter().map(|v| Expected::new(v, options)).collect(),
        single => vec![Expected::new(single, options)],
    }
}

fn compile_leaf(leaf: &LeafCondition) -> Option<CompiledLeaf> {
    let path = leaf.field.trim();
    if path.is_empty() {
        return None;
    }
    let options = TextOptions {
        case_sensitive: leaf.case_sensitive.unwrap_or(false),
        trim: leaf.trim.unwrap_or(true),
    };

    let mut checks = Vec::new();
    if let Some(v) = &leaf.eq {
        checks.push(Check::Eq(Expected::new(v, options)));
    }
    if let Some(v) = &leaf.neq {
        checks.push(Check::Neq(Expected::new(v, options)));
    }
    if let Some(v) = &leaf.in_list {
        checks.push(Check::In(expected_list(v, options)));
    }
    if let Some(v) = &leaf.nin {
        checks.push(Check::Nin(expected_list(v, options)));
    }
    if let Some(pattern) = &leaf.regex {
        let mut builder = RegexBuilder::new(pattern);
        match &leaf.flags {
            Some(flags) => {
                builder
                    .case_insensitive(flags.contains('i'))
                    .multi_line(flags.contains('m'))
                    .dot_matches_new_line(flags.contains('s'))
                    .ignore_whitespace(flags.contains('x'));
            }
            None => {
                builder.case_insensitive(!options.case_sensitive);
            }
        }
        match builder.build() {
            Ok(re) => checks.push(Check::Regex(re)),
            Err(err) => {
                tracing::warn!(field = path, error = %err, "invalid regex in rule");
                return None;
            }
        }
    }
    if let Some(v) = &leaf.exists {
        checks.push(Check::Exists(as_flag(v)?));
    }
    if let Some(v) = &leaf.empty {
        checks.push(Check::Empty(as_flag(v)?));
    }
    let thresholds: [(&Option<Value>, fn(f64) -> Check); 4] = [
        (&leaf.gt, Check::Gt),
        (&leaf.gte, Check::Gte),
        (&leaf.lt, Check::Lt),
        (&leaf.lte, Check::Lte),
    ];
    for (value, make) in thresholds {
        if let Some(v) = value {
            let Some(t) = threshold(v) else {
                tracing::warn!(field = path, "non-numeric threshold in rule");
                return None;
            };
            checks.push(make(t));
        }
    }

    if checks.is_empty() {
        return None;
    }
    Some(CompiledLeaf {
        path: path.to_string(),
        options,
        checks,
    })
}

#[derive(Debug, Clone, PartialEq)]
enum EvidenceSource {
    None,
    Static(Value),
    Fields(Vec<String>),
}

/// Metadata a rule contributes to each violation it raises
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtraMetadata {
    pub detail: Option<String>,
    pub category: Option<String>,
    pub fields_impacted: Vec<String>,
    pub scope: Option<String>,
    pub evidence: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct CompiledRule {
    id: String,
    predicate: CompiledPredicate,
    detail: Option<String>,
    category: Option<String>,
    fields_impacted: Vec<String>,
    scope: Option<String>,
    evidence: EvidenceSource,
}

impl CompiledRule {
    /// Compile a per-bureau rule; other scopes and unresolvable predicates
    /// yield `None`.
    pub fn compile(def: &RuleDefinition) -> Option<CompiledRule> {
        if def.scope() != RuleScope::PerBureau {
            tracing::debug!(rule = %def.id, scope = ?def.scope, "rule scope not evaluated per bureau");
            return None;
        }
        let Some(predicate) = CompiledPredicate::compile(&def.rule) else {
            tracing::warn!(rule = %def.id, "rule has no evaluable predicate; dropped");
            return None;
        };
        let evidence = match (&def.evidence, def.evidence_fields.is_empty()) {
            (Some(value), _) => EvidenceSource::Static(value.clone()),
            (None, false) => EvidenceSource::Fields(def.evidence_fields.clone()),
            (None, true) => EvidenceSource::None,
        };
        Some(CompiledRule {
            id: def.id.clone(),
            predicate,
            detail: def.detail.clone(),
            category: def.category.clone(),
            fields_impacted: def.fields_impacted.clone(),
            scope: def.scope.clone(),
            evidence,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn predicate(&self) -> &CompiledPredicate {
        &self.predicate
    }

    pub fn evaluate(&self, fields: &FieldSet) -> bool {
        self.predicate.evaluate(fields)
    }

    /// Static metadata plus evidence captured from `fields`
    pub fn build_extra(&self, fields: &FieldSet) -> ExtraMetadata {
        let evidence = match &self.evidence {
            EvidenceSource::None => None,
            EvidenceSource::Static(value) => Some(value.clone()),
            EvidenceSource::Fields(paths) => {
                let captured: Map<String, Value> = paths
                    .iter()
                    .filter_map(|path| {
                        fields
                            .resolve(path)
                            .filter(|v| !is_blank(v))
                            .map(|v| (path.clone(), v.clone()))
                    })
                    .collect();
                (!captured.is_empty()).then_some(Value::Object(captured))
            }
        };
        ExtraMetadata {
            detail: self.detail.clone(),
            category: self.category.clone(),
            fields_impacted: self.fields_impacted.clone(),
            scope: self.scope.clone(),
            evidence,
        }
    }
}

/// Immutable set of compiled rules, in source order
#[derive(Debug, Clone, Default)]
pub struct CompiledRuleSet {
    rules: Vec<CompiledRule>,
}

impl CompiledRuleSet {
    /// Compile every usable rule in `source` (any supported layout).
    pub fn compile(source: &Value) -> CompiledRuleSet {
        let entries = normalize_rule_source(source);
        let total = entries.len();
        let rules: Vec<CompiledRule> = entries
            .iter()
            .map(|(id, def)| RuleDefinition::from_entry(id, def))
            .filter_map(|def| CompiledRule::compile(&def))
            .collect();
        tracing::debug!(compiled = rules.len(), total, "compiled rule set");
        CompiledRuleSet { rules }
    }

    pub fn from_json_str(text: &str) -> Result<CompiledRuleSet, RuleSourceError> {
        Ok(Self::compile(&parse_rule_source(text)?))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<CompiledRuleSet, RuleSourceError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| RuleSourceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn get(&self, id: &str) -> Option<&CompiledRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaf(def: Value) -> Option<CompiledPredicate> {
        CompiledPredicate::compile(&PredicateNode::from_value(&def))
    }

    fn eval(def: Value, fields: Value) -> bool {
        leaf(def)
            .expect("predicate compiles")
            .evaluate(&FieldSet::from_json(fields))
    }

    #[test]
    fn test_string_comparisons_trim_and_lowercase() {
        assert!(eval(
            json!({"field": "account_status", "eq": "current"}),
            json!({"account_status": "  Current "})
        ));
        assert!(!eval(
            json!({"field": "account_status", "eq": "current", "caseSensitive": true}),
            json!({"account_status": "Current"})
        ));
        assert!(!eval(
            json!({"field": "account_status", "eq": "current", "trim": false}),
            json!({"account_status": "current "})
        ));
    }

    #[test]
    fn test_numeric_equality() {
        assert!(eval(json!({"field": "balance", "eq": 100}), json!({"balance": "$100.00"})));
        assert!(eval(json!({"field": "balance", "neq": 0}), json!({"balance": 12.5})));
        assert!(!eval(json!({"field": "balance", "eq": 100}), json!({"balance": "none"})));
    }

    #[test]
    fn test_missing_field_semantics() {
        let fields = json!({"balance": 1});
        assert!(!eval(json!({"field": "status", "eq": "open"}), fields.clone()));
        assert!(eval(json!({"field": "status", "neq": "open"}), fields.clone()));
        assert!(!eval(json!({"field": "status", "in": ["open"]}), fields.clone()));
        assert!(eval(json!({"field": "status", "nin": ["open"]}), fields.clone()));
        assert!(eval(json!({"field": "status", "empty": true}), fields.clone()));
        assert!(eval(json!({"field": "status", "exists": false}), fields.clone()));
        assert!(!eval(json!({"field": "status", "gt": 0}), fields));
    }

    #[test]
    fn test_blank_tokens_are_empty() {
        for blank in [json!("N/A"), json!("--"), json!("  "), json!([]), json!("Not Reported")] {
            assert!(eval(
                json!({"field": "remarks", "empty": true}),
                json!({ "remarks": blank })
            ));
        }
    }

    #[test]
    fn test_numeric_thresholds() {
        let fields = json!({"past_due": "$1,250.00"});
        assert!(eval(json!({"field": "past_due", "gt": 0}), fields.clone()));
        assert!(eval(json!({"field": "past_due", "gte": "1250"}), fields.clone()));
        assert!(eval(json!({"field": "past_due", "lt": 2000, "gt": 1000}), fields.clone()));
        assert!(!eval(json!({"field": "past_due", "lte": 1000}), fields));
        assert!(!eval(json!({"field": "past_due", "gt": 0}), json!({"past_due": "n/a"})));
    }

    #[test]
    fn test_regex_and_flags() {
        assert!(eval(
            json!({"field": "remarks", "regex": "charge.?off"}),
            json!({"remarks": "CHARGE OFF"})
        ));
        assert!(!eval(
            json!({"field": "remarks", "regex": "charge.?off", "flags": ""}),
            json!({"remarks": "CHARGE OFF"})
        ));
        assert!(eval(
            json!({"field": "remarks", "match": "^collection", "flags": "i"}),
            json!({"remarks": "Collection account"})
        ));
    }

    #[test]
    fn test_uncompilable_leaves() {
        assert!(leaf(json!({"field": "x"})).is_none());
        assert!(leaf(json!({"field": "x", "regex": "("})).is_none());
        assert!(leaf(json!({"field": "x", "gt": "lots"})).is_none());
        assert!(leaf(json!({"field": "", "eq": 1})).is_none());
    }

    #[test]
    fn test_composites_drop_unresolvable_children() {
        let partial = leaf(json!({"any": [
            {"field": "x", "regex": "("},
            {"field": "x", "eq": "a"}
        ]}))
        .unwrap();
        assert!(partial.evaluate(&FieldSet::from_json(json!({"x": "A"}))));

        let broken_conjunct = leaf(json!({"all": [
            {"field": "x", "eq": "a"},
            {"field": "y", "regex": "("}
        ]}));
        assert!(broken_conjunct.is_none());
        assert!(leaf(json!({"all": [
            {"field": "x", "eq": "a"},
            {"any": [{"field": "y", "gt": "lots"}]}
        ]}))
        .is_none());

        assert!(leaf(json!({"all": []})).is_none());
        assert!(leaf(json!({"all": [{"bogus": 1}]})).is_none());
        assert!(leaf(json!({"not": {"field": "x"}})).is_none());
        assert!(eval(json!({"not": {"field": "x", "eq": "a"}}), json!({"x": "b"})));
    }

    #[test]
    fn test_dot_paths() {
        assert!(eval(
            json!({"field": "payment.history.0", "eq": "30"}),
            json!({"payment": {"history": ["30", "OK"]}})
        ));
    }

    #[test]
    fn test_rule_set_compiles_only_per_bureau_rules() {
        let set = CompiledRuleSet::compile(&json!({
            "A": {"rule": {"field": "x", "exists": true}},
            "B": {"scope": "report", "rule": {"field": "x", "exists": true}},
            "C": {"rule": {"field": "x"}},
            "D": {"scope": "per-bureau", "rule": {"any": [{"field": "y", "empty": false}]}}
        }));
        let ids: Vec<&str> = set.iter().map(CompiledRule::id).collect();
        assert_eq!(ids, vec!["A", "D"]);
    }

    #[test]
    fn test_build_extra_evidence() {
        let set = CompiledRuleSet::compile(&json!([
            {"id": "DYN", "rule": {"field": "balance", "gt": 0},
             "evidenceFields": ["balance", "remarks", "missing"], "detail": "d"},
            {"id": "STATIC", "rule": {"field": "balance", "gt": 0},
             "evidence": {"note": ["a", "b"]}, "evidenceFields": ["balance"]},
            {"id": "NONE", "rule": {"field": "balance", "gt": 0}, "evidenceFields": ["remarks"]}
        ]));
        let fields = FieldSet::from_json(json!({"balance": 5.0, "remarks": "--"}));

        let dynamic = set.get("DYN").unwrap().build_extra(&fields);
        assert_eq!(dynamic.evidence, Some(json!({"balance": 5.0})));
        assert_eq!(dynamic.detail.as_deref(), Some("d"));

        let fixed = set.get("STATIC").unwrap().build_extra(&fields);
        assert_eq!(fixed.evidence, Some(json!({"note": ["a", "b"]})));

        assert_eq!(set.get("NONE").unwrap().build_extra(&fields).evidence, None);
    }
}
