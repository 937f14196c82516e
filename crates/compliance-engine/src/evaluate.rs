use shared_types::{Bureau, FieldSet, Violation};

use crate::catalog::ViolationCatalog;
use crate::rules::CompiledRuleSet;

/// Run every compiled rule against one field set.
///
/// Violations come back in rule order, enriched from the catalog.
pub fn evaluate_fields(
    rules: &CompiledRuleSet,
    catalog: &ViolationCatalog,
    fields: &FieldSet,
) -> Vec<Violation> {
    rules
        .iter()
        .filter(|rule| rule.evaluate(fields))
        .map(|rule| catalog.enrich(rule.id(), &rule.build_extra(fields)))
        .collect()
}

/// As [`evaluate_fields`], tagging each violation with the reporting bureau.
pub fn evaluate_bureau(
    rules: &CompiledRuleSet,
    catalog: &ViolationCatalog,
    bureau: Bureau,
    fields: &FieldSet,
) -> Vec<Violation> {
    evaluate_fields(rules, catalog, fields)
        .into_iter()
        .map(|v| v.with_bureau(bureau))
        .collect()
}
