use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::fields::FieldSet;
use crate::types::{Bureau, Violation};

/// One reported account compared across bureaus
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tradeline {
    pub creditor: String,
    pub per_bureau: BTreeMap<Bureau, FieldSet>,
    #[serde(default)]
    pub violations: Vec<Violation>,
}

impl Tradeline {
    pub fn new(creditor: impl Into<String>) -> Self {
        Self {
            creditor: creditor.into(),
            ..Default::default()
        }
    }

    /// Bureaus that reported at least one normalized field
    pub fn reporting_bureaus(&self) -> Vec<Bureau> {
        self.per_bureau
            .iter()
            .filter(|(_, fields)| fields.has_data())
            .map(|(bureau, _)| *bureau)
            .collect()
    }

    pub fn has_data(&self) -> bool {
        self.per_bureau.values().any(FieldSet::has_data)
    }
}

/// One month cell of a payment-history grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryCell {
    /// "Jan ’24"
    pub month: String,
    /// Status token taken from the cell class, e.g. "ok", "late", "unknown"
    pub status: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTally {
    pub ok: usize,
    pub late: usize,
    pub unknown: usize,
    pub total: usize,
}

impl HistoryTally {
    pub fn merge(&mut self, other: &HistoryTally) {
        self.ok += other.ok;
        self.late += other.late;
        self.unknown += other.unknown;
        self.total += other.total;
    }
}

/// A two-year payment grid attributed to the nearest creditor heading
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentHistory {
    pub creditor: Option<String>,
    pub months: Vec<String>,
    pub bureaus: BTreeMap<Bureau, Vec<HistoryCell>>,
    pub summary: BTreeMap<Bureau, HistoryTally>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inquiry {
    pub creditor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_type: Option<String>,
    /// Normalized `MM/DD/YYYY`, when the printed date could be read
    pub date: Option<String>,
    pub date_raw: String,
    pub bureau: Option<Bureau>,
    pub bureau_raw: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquirySummary {
    pub by_bureau: BTreeMap<Bureau, usize>,
    pub total: usize,
    pub last_12_months: usize,
    pub last_24_months: usize,
}

/// Identity data as printed by a single bureau (or by the report as a whole)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalRecord {
    pub name: Option<String>,
    pub also_known_as: Vec<String>,
    pub former: Vec<String>,
    pub date_of_birth: Option<String>,
    pub current_addresses: Vec<String>,
    pub previous_addresses: Vec<String>,
    pub employers: Vec<String>,
}

impl PersonalRecord {
    pub fn is_empty(&self) -> bool {
        self.populated_fields().is_empty()
    }

    /// `(field, joined value)` for every populated field, in display order
    pub fn populated_fields(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if let Some(name) = &self.name {
            out.push(("name", name.clone()));
        }
        let lists: [(&'static str, &Vec<String>); 2] =
            [("also_known_as", &self.also_known_as), ("former", &self.former)];
        for (field, values) in lists {
            if !values.is_empty() {
                out.push((field, values.join("; ")));
            }
        }
        if let Some(dob) = &self.date_of_birth {
            out.push(("date_of_birth", dob.clone()));
        }
        let lists: [(&'static str, &Vec<String>); 3] = [
            ("current_addresses", &self.current_addresses),
            ("previous_addresses", &self.previous_addresses),
            ("employers", &self.employers),
        ];
        for (field, values) in lists {
            if !values.is_empty() {
                out.push((field, values.join("; ")));
            }
        }
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInformation {
    pub by_bureau: BTreeMap<Bureau, PersonalRecord>,
    /// Populated when the section has no per-bureau columns
    pub combined: Option<PersonalRecord>,
}

impl PersonalInformation {
    pub fn is_empty(&self) -> bool {
        self.by_bureau.values().all(PersonalRecord::is_empty)
            && self.combined.as_ref().map_or(true, PersonalRecord::is_empty)
    }
}

/// A personal-information field whose bureaus disagree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfoMismatch {
    pub field: String,
    pub values: BTreeMap<Bureau, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditScores {
    pub by_bureau: BTreeMap<Bureau, u32>,
    pub overall: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CreditorContact {
    pub creditor_name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Everything extracted from one credit report document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedReport {
    pub tradelines: Vec<Tradeline>,
    /// Document-wide payment tallies per bureau
    pub history: BTreeMap<Bureau, HistoryTally>,
    pub inquiries: Vec<Inquiry>,
    pub inquiry_summary: InquirySummary,
    pub personal_information: PersonalInformation,
    pub credit_scores: CreditScores,
    pub account_history: Vec<PaymentHistory>,
    pub inquiry_details: BTreeMap<Bureau, Vec<Inquiry>>,
    pub creditor_contacts: Vec<CreditorContact>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportStats {
    pub tradelines: usize,
    pub violations: usize,
    pub inquiries: usize,
    pub history_grids: usize,
    pub creditor_contacts: usize,
}

impl ParsedReport {
    pub fn stats(&self) -> ReportStats {
        ReportStats {
            tradelines: self.tradelines.len(),
            violations: self.tradelines.iter().map(|t| t.violations.len()).sum(),
            inquiries: self.inquiries.len(),
            history_grids: self.account_history.len(),
            creditor_contacts: self.creditor_contacts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == ParsedReport::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reporting_bureaus_skip_raw_only_sets() {
        let mut tradeline = Tradeline::new("ACME BANK");
        tradeline.per_bureau.insert(
            Bureau::Experian,
            FieldSet::from_json(json!({"balance": 10.0, "balance_raw": "$10"})),
        );
        tradeline
            .per_bureau
            .insert(Bureau::Equifax, FieldSet::from_json(json!({"balance_raw": ""})));

        assert_eq!(tradeline.reporting_bureaus(), vec![Bureau::Experian]);
        assert!(tradeline.has_data());
    }

    #[test]
    fn test_populated_fields_order() {
        let record = PersonalRecord {
            name: Some("JANE DOE".into()),
            date_of_birth: Some("1980".into()),
            current_addresses: vec!["1 MAIN ST".into(), "PO BOX 2".into()],
            ..Default::default()
        };
        let fields = record.populated_fields();
        assert_eq!(
            fields,
            vec![
                ("name", "JANE DOE".to_string()),
                ("date_of_birth", "1980".to_string()),
                ("current_addresses", "1 MAIN ST; PO BOX 2".to_string()),
            ]
        );
    }

    #[test]
    fn test_default_report_is_empty() {
        let report = ParsedReport::default();
        assert!(report.is_empty());
        assert_eq!(report.stats(), ReportStats::default());
    }
}
