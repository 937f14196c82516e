//! Tradeline extraction from four-column comparison tables
//!
//! Each account block is a table with one label column and one value column
//! per bureau. Rows are matched against the field-rule table, values are
//! normalized per bureau, and the resulting field sets run through the
//! violation rules.

use compliance_engine::ComplianceEngine;
use report_document::DocumentTree;
use serde_json::Value;
use shared_types::normalize::collapse_whitespace;
use shared_types::{is_blank_text, raw_key, value_text, Bureau, FieldSet, Tradeline};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, trace};

use crate::field_rules;
use crate::headings::{nearest_heading, Denylist};
use crate::table::{all_rows, bureau_header, label_and_values};

pub const TRADELINE_TABLE_SELECTOR: &str =
    "table.rpt_table4column, table.tradeline-table, table[data-layout=four-column]";

pub const UNKNOWN_CREDITOR: &str = "Unknown Creditor";

/// Fields that identify a reported account across repeated blocks
const SNAPSHOT_FIELDS: &[&str] = &[
    "account_number",
    "date_opened",
    "date_last_payment",
    "last_reported",
    "date_first_delinquency",
    "balance",
    "past_due",
];

pub struct TradelineExtractor<'a> {
    denylist: &'a Denylist,
    engine: Option<&'a ComplianceEngine>,
    dedupe: bool,
}

impl<'a> TradelineExtractor<'a> {
    pub fn new(denylist: &'a Denylist) -> Self {
        Self {
            denylist,
            engine: None,
            dedupe: true,
        }
    }

    /// Evaluate every bureau's field set with `engine`
    pub fn with_engine(mut self, engine: &'a ComplianceEngine) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn dedupe(mut self, enabled: bool) -> Self {
        self.dedupe = enabled;
        self
    }

    pub fn extract<T: DocumentTree>(&self, tree: &T) -> Vec<Tradeline> {
        let tables = tree.select_all(TRADELINE_TABLE_SELECTOR);
        let mut tradelines = Vec::new();
        let mut seen = HashSet::new();

        for table in tables {
            let Some(tradeline) = self.extract_table(tree, table) else {
                continue;
            };
            if self.dedupe && !seen.insert(snapshot_key(&tradeline)) {
                debug!(creditor = %tradeline.creditor, "dropping repeated tradeline");
                continue;
            }
            tradelines.push(tradeline);
        }
        tradelines
    }

    fn extract_table<T: DocumentTree>(&self, tree: &T, table: T::Node) -> Option<Tradeline> {
        let rows = all_rows(tree, table);
        let heading = nearest_heading(tree, table);

        let screened = match &heading {
            Some(text) => text.clone(),
            None => tree.text(table),
        };
        if self.denylist.matches(&screened) {
            debug!(heading = %screened, "skipping non-creditor table");
            return None;
        }

        let Some(header) = bureau_header(tree, &rows) else {
            trace!("table names no bureau");
            return None;
        };

        let mut per_bureau: BTreeMap<Bureau, FieldSet> = BTreeMap::new();
        for row in rows.iter().copied().filter(|r| *r != header.row) {
            let Some((label, values)) = label_and_values(tree, row, header.width()) else {
                continue;
            };
            let Some(rule) = field_rules::lookup(&tree.text(label)) else {
                continue;
            };
            for (column, bureau) in header.bureaus() {
                let raw = values[column].map(|cell| tree.text(cell)).unwrap_or_default();
                if is_blank_text(&raw) {
                    continue;
                }
                rule.extract_into(&raw, per_bureau.entry(bureau).or_default());
            }
        }

        for fields in per_bureau.values_mut() {
            backfill_account_status(fields);
        }
        per_bureau.retain(|_, fields| fields.has_data());
        if per_bureau.is_empty() {
            return None;
        }

        let creditor = heading
            .or_else(|| {
                per_bureau
                    .values()
                    .find_map(|fields| fields.display_text("creditor_name"))
            })
            .unwrap_or_else(|| UNKNOWN_CREDITOR.to_string());

        let mut tradeline = Tradeline::new(creditor);
        if let Some(engine) = self.engine {
            for (bureau, fields) in &per_bureau {
                tradeline
                    .violations
                    .extend(engine.evaluate_bureau(*bureau, fields));
            }
        }
        tradeline.per_bureau = per_bureau;
        Some(tradeline)
    }
}

fn backfill_account_status(fields: &mut FieldSet) {
    if fields.contains_key("account_status") {
        return;
    }
    let Some(status) = fields.get("payment_status").cloned() else {
        return;
    };
    let raw = fields
        .raw("payment_status")
        .map(str::to_string)
        .unwrap_or_else(|| value_text(&status));
    fields.insert("account_status", status);
    fields.insert(raw_key("account_status"), Value::String(raw));
}

type SnapshotKey = (String, Vec<(Bureau, Vec<String>)>);

fn snapshot_key(tradeline: &Tradeline) -> SnapshotKey {
    let snapshot = tradeline
        .per_bureau
        .iter()
        .map(|(bureau, fields)| {
            let values = SNAPSHOT_FIELDS
                .iter()
                .map(|key| fields.get(key).map(value_text).unwrap_or_default())
                .collect();
            (*bureau, values)
        })
        .collect();
    (collapse_whitespace(&tradeline.creditor).to_lowercase(), snapshot)
}
