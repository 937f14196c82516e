//! Metro 2 reporting-violation engine
//!
//! Compiles declarative rule tables into predicates, evaluates them against
//! per-bureau tradeline field sets, and projects the resulting violations
//! into negative items.

pub mod aggregate;
pub mod catalog;
pub mod error;
pub mod evaluate;
pub mod negative_items;
pub mod rules;

pub use aggregate::{aggregate_report_violations, ReportViolation, ViolationMetrics};
pub use catalog::{CatalogEntry, ViolationCatalog, GENERIC_LABEL};
pub use error::RuleSourceError;
pub use negative_items::{build_negative_items, mask_account_number, SyntheticInputs};
pub use rules::{CompiledRule, CompiledRuleSet};

use serde_json::Value;
use shared_types::{Bureau, FieldSet, NegativeItem, ParsedReport, Violation};

/// Rule table shipped with the crate
pub const BUILTIN_RULES: &str = include_str!("../data/metro2_rules.json");
/// Violation catalog shipped with the crate
pub const BUILTIN_CATALOG: &str = include_str!("../data/violation_catalog.json");

/// ComplianceEngine entry point
///
/// Holds a compiled rule set and the catalog used to enrich its violations.
/// Both are immutable once built, so one engine can serve many reports.
#[derive(Debug, Clone, Default)]
pub struct ComplianceEngine {
    rules: CompiledRuleSet,
    catalog: ViolationCatalog,
}

impl ComplianceEngine {
    pub fn new(rules: CompiledRuleSet, catalog: ViolationCatalog) -> Self {
        Self { rules, catalog }
    }

    /// Engine over the built-in Metro 2 rules and catalog
    pub fn builtin() -> Self {
        let rules = CompiledRuleSet::from_json_str(BUILTIN_RULES).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "built-in rule table unreadable");
            CompiledRuleSet::default()
        });
        let catalog = ViolationCatalog::from_json_str(BUILTIN_CATALOG).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "built-in catalog unreadable");
            ViolationCatalog::default()
        });
        Self::new(rules, catalog)
    }

    /// Build from already-parsed JSON sources (rule table in any layout,
    /// catalog keyed by code).
    pub fn from_values(rules: &Value, catalog: &Value) -> Self {
        Self::new(
            CompiledRuleSet::compile(rules),
            ViolationCatalog::from_value(catalog),
        )
    }

    pub fn from_json_str(rules: &str, catalog: &str) -> Result<Self, RuleSourceError> {
        Ok(Self::new(
            CompiledRuleSet::from_json_str(rules)?,
            ViolationCatalog::from_json_str(catalog)?,
        ))
    }

    pub fn rules(&self) -> &CompiledRuleSet {
        &self.rules
    }

    pub fn catalog(&self) -> &ViolationCatalog {
        &self.catalog
    }

    pub fn evaluate(&self, fields: &FieldSet) -> Vec<Violation> {
        evaluate::evaluate_fields(&self.rules, &self.catalog, fields)
    }

    /// Violations for one bureau's field set, tagged with that bureau
    pub fn evaluate_bureau(&self, bureau: Bureau, fields: &FieldSet) -> Vec<Violation> {
        evaluate::evaluate_bureau(&self.rules, &self.catalog, bureau, fields)
    }

    pub fn negative_items(&self, report: &ParsedReport, inputs: &SyntheticInputs) -> Vec<NegativeItem> {
        build_negative_items(report, inputs)
    }
}
