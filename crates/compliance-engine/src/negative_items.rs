//! Projection of violations into consumer-facing negative items
//!
//! Each tradeline with at least one violation becomes an item. Two synthetic
//! items summarize inquiries and personal-information discrepancies.

use serde_json::{json, Value};
use shared_types::normalize::format_money;
use shared_types::{
    is_blank, is_blank_text, value_text, Bureau, FieldSet, Headline, Inquiry, InquirySummary,
    ItemKind, NegativeItem, ParsedReport, PersonalInfoMismatch, PersonalInformation, Tradeline,
    Violation,
};
use std::collections::{BTreeMap, BTreeSet};

use crate::aggregate::{dedupe_violations, headline, merge_violations, metrics, sort_violations};

const MASK: &str = "••••";

/// Fields shown per bureau on a tradeline item, in display order
pub const DISPLAY_FIELDS: &[&str] = &[
    "account_type",
    "account_status",
    "payment_status",
    "balance",
    "past_due",
    "credit_limit",
    "high_credit",
    "monthly_payment",
    "date_opened",
    "date_closed",
    "date_last_payment",
    "last_reported",
    "date_first_delinquency",
    "remarks",
];

const MONEY_FIELDS: &[&str] = &[
    "balance",
    "past_due",
    "credit_limit",
    "high_credit",
    "monthly_payment",
];

pub const INQUIRIES_CREDITOR: &str = "Inquiries";
pub const PERSONAL_INFO_CREDITOR: &str = "Personal Information";

/// Mask an account number down to its last four characters.
///
/// Non-alphanumerics are stripped first; four characters or fewer pass
/// through unchanged.
pub fn mask_account_number(account: &str) -> String {
    let cleaned: Vec<char> = account.chars().filter(|c| c.is_alphanumeric()).collect();
    if cleaned.len() <= 4 {
        return cleaned.into_iter().collect();
    }
    let last: String = cleaned[cleaned.len() - 4..].iter().collect();
    format!("{} {}", MASK, last)
}

fn is_date_field(key: &str) -> bool {
    key.starts_with("date_") || key == "last_reported"
}

/// Display text of one field: raw document text first, else the value
/// formatted by kind.
fn display_value(fields: &FieldSet, key: &str) -> Option<String> {
    if let Some(raw) = fields.raw(key).filter(|r| !is_blank_text(r)) {
        return Some(raw.trim().to_string());
    }
    let value = fields.get(key).filter(|v| !is_blank(v))?;
    let text = match value {
        Value::Number(n) if MONEY_FIELDS.contains(&key) => format_money(n.as_f64()?),
        _ if is_date_field(key) => value_text(value).chars().take(10).collect(),
        _ => value_text(value),
    };
    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn bureau_details(tradeline: &Tradeline) -> BTreeMap<Bureau, BTreeMap<String, String>> {
    tradeline
        .per_bureau
        .iter()
        .filter_map(|(bureau, fields)| {
            let details: BTreeMap<String, String> = DISPLAY_FIELDS
                .iter()
                .filter_map(|key| display_value(fields, key).map(|v| (key.to_string(), v)))
                .collect();
            (!details.is_empty()).then_some((*bureau, details))
        })
        .collect()
}

fn item(
    index: usize,
    kind: ItemKind,
    creditor: &str,
    violations: Vec<Violation>,
) -> NegativeItem {
    let summary = metrics(&violations);
    let top: Option<Headline> = headline(&violations);
    NegativeItem {
        index,
        kind,
        creditor: creditor.to_string(),
        account_numbers: BTreeMap::new(),
        bureaus: BTreeSet::new(),
        severity: summary.max_severity,
        headline: top,
        violations,
        bureau_details: BTreeMap::new(),
    }
}

/// Project one tradeline. `None` when it has no violations, computed or
/// external.
pub fn project_tradeline(
    index: usize,
    tradeline: &Tradeline,
    external: &[Value],
) -> Option<NegativeItem> {
    let violations = merge_violations(external, &tradeline.violations);
    if violations.is_empty() {
        return None;
    }
    let mut projected = item(index, ItemKind::Tradeline, &tradeline.creditor, violations);
    projected.account_numbers = tradeline
        .per_bureau
        .iter()
        .filter_map(|(bureau, fields)| {
            let masked = mask_account_number(&display_value(fields, "account_number")?);
            (!masked.is_empty()).then_some((*bureau, masked))
        })
        .collect();
    projected.bureaus = tradeline.reporting_bureaus().into_iter().collect();
    projected.bureau_details = bureau_details(tradeline);
    Some(projected)
}

/// Severity of the inquiries item, by inquiries in the last 12 months
pub fn inquiry_severity(last_12_months: usize) -> u32 {
    match last_12_months {
        n if n >= 6 => 4,
        n if n >= 4 => 3,
        n if n >= 2 => 2,
        _ => 1,
    }
}

/// Severity of the personal-information item, by mismatched fields
pub fn personal_info_severity(mismatches: usize) -> u32 {
    match mismatches {
        0 => 1,
        1 => 2,
        _ => 3,
    }
}

pub fn inquiries_item(
    index: usize,
    inquiries: &[Inquiry],
    summary: &InquirySummary,
) -> Option<NegativeItem> {
    if inquiries.is_empty() && summary.total == 0 {
        return None;
    }
    let severity = inquiry_severity(summary.last_12_months);
    let bureaus: BTreeSet<Bureau> = inquiries
        .iter()
        .filter_map(|i| i.bureau)
        .chain(summary.by_bureau.keys().copied())
        .collect();

    let mut violations = vec![Violation {
        code: "INQUIRY_VOLUME".into(),
        label: "Hard inquiries on file".into(),
        severity,
        category: Some("Inquiries".into()),
        detail: Some(format!(
            "{} in the last 12 months, {} in the last 24 months, {} total",
            summary.last_12_months, summary.last_24_months, summary.total
        )),
        evidence: Some(json!({
            "last_12_months": summary.last_12_months,
            "last_24_months": summary.last_24_months,
            "total": summary.total,
        })),
        bureaus: bureaus.clone(),
        ..Default::default()
    }];
    for inquiry in inquiries {
        let mut detail = inquiry.creditor.clone();
        let date = inquiry
            .date
            .clone()
            .unwrap_or_else(|| inquiry.date_raw.trim().to_string());
        if !date.is_empty() {
            detail.push_str(" on ");
            detail.push_str(&date);
        }
        let violation = Violation {
            code: "INQUIRY_REVIEW".into(),
            label: "Inquiry to verify".into(),
            severity: 1,
            category: Some("Inquiries".into()),
            detail: Some(detail),
            ..Default::default()
        };
        violations.push(match inquiry.bureau {
            Some(bureau) => violation.with_bureau(bureau),
            None => violation,
        });
    }
    let mut violations = dedupe_violations(violations);
    sort_violations(&mut violations);

    let mut projected = item(index, ItemKind::Inquiries, INQUIRIES_CREDITOR, violations);
    projected.bureaus = bureaus;
    projected.bureau_details = summary
        .by_bureau
        .iter()
        .map(|(bureau, count)| {
            (
                *bureau,
                BTreeMap::from([("inquiries".to_string(), count.to_string())]),
            )
        })
        .collect();
    Some(projected)
}

pub fn personal_information_item(
    index: usize,
    info: &PersonalInformation,
    mismatches: Option<&[PersonalInfoMismatch]>,
) -> Option<NegativeItem> {
    let mismatches = mismatches.unwrap_or(&[]);
    if info.is_empty() && mismatches.is_empty() {
        return None;
    }
    let severity = personal_info_severity(mismatches.len());
    let mut violations = Vec::new();

    if mismatches.is_empty() {
        let records = info
            .by_bureau
            .iter()
            .map(|(bureau, record)| (Some(*bureau), record))
            .chain(info.combined.iter().map(|record| (None, record)));
        for (bureau, record) in records {
            for (field, value) in record.populated_fields() {
                let violation = Violation {
                    code: "PERSONAL_INFO_ON_FILE".into(),
                    label: "Personal information to verify".into(),
                    severity: 1,
                    category: Some("Personal Information".into()),
                    detail: Some(format!("{}: {}", field, value)),
                    fields_impacted: vec![field.to_string()],
                    ..Default::default()
                };
                violations.push(match bureau {
                    Some(bureau) => violation.with_bureau(bureau),
                    None => violation,
                });
            }
        }
    } else {
        for mismatch in mismatches {
            let shown: Vec<String> = mismatch
                .values
                .iter()
                .map(|(bureau, value)| format!("{}: {}", bureau, value))
                .collect();
            violations.push(Violation {
                code: "PERSONAL_INFO_MISMATCH".into(),
                label: "Personal information differs between bureaus".into(),
                severity,
                category: Some("Personal Information".into()),
                detail: Some(format!("{} differs: {}", mismatch.field, shown.join("; "))),
                evidence: serde_json::to_value(&mismatch.values).ok(),
                fields_impacted: vec![mismatch.field.clone()],
                bureaus: mismatch.values.keys().copied().collect(),
                ..Default::default()
            });
        }
    }
    let mut violations = dedupe_violations(violations);
    sort_violations(&mut violations);

    let mut projected = item(
        index,
        ItemKind::PersonalInformation,
        PERSONAL_INFO_CREDITOR,
        violations,
    );
    projected.bureaus = info
        .by_bureau
        .iter()
        .filter(|(_, record)| !record.is_empty())
        .map(|(bureau, _)| *bureau)
        .chain(mismatches.iter().flat_map(|m| m.values.keys().copied()))
        .collect();
    projected.bureau_details = info
        .by_bureau
        .iter()
        .filter(|(_, record)| !record.is_empty())
        .map(|(bureau, record)| {
            let details = record
                .populated_fields()
                .into_iter()
                .map(|(field, value)| (field.to_string(), value))
                .collect();
            (*bureau, details)
        })
        .collect();
    Some(projected)
}

/// Inputs to the synthetic items and external per-tradeline violations.
///
/// Anything left `None` is taken from the parsed report.
#[derive(Debug, Clone, Default)]
pub struct SyntheticInputs {
    pub personal_information: Option<PersonalInformation>,
    pub mismatches: Option<Vec<PersonalInfoMismatch>>,
    pub inquiries: Option<Vec<Inquiry>>,
    pub inquiry_summary: Option<InquirySummary>,
    /// Externally supplied violations keyed by tradeline index
    pub external_violations: BTreeMap<usize, Vec<Value>>,
}

/// Tradeline items (in report order) followed by the inquiries and
/// personal-information items.
pub fn build_negative_items(report: &ParsedReport, inputs: &SyntheticInputs) -> Vec<NegativeItem> {
    let mut items: Vec<NegativeItem> = report
        .tradelines
        .iter()
        .enumerate()
        .filter_map(|(index, tradeline)| {
            let external = inputs
                .external_violations
                .get(&index)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            project_tradeline(index, tradeline, external)
        })
        .collect();

    let synthetic_base = report.tradelines.len();
    let inquiries = inputs.inquiries.as_deref().unwrap_or(&report.inquiries);
    let summary = inputs
        .inquiry_summary
        .as_ref()
        .unwrap_or(&report.inquiry_summary);
    items.extend(inquiries_item(synthetic_base, inquiries, summary));

    let info = inputs
        .personal_information
        .as_ref()
        .unwrap_or(&report.personal_information);
    items.extend(personal_information_item(
        synthetic_base + 1,
        info,
        inputs.mismatches.as_deref(),
    ));

    tracing::debug!(items = items.len(), "built negative items");
    items
}
