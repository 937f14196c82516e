//! Violation dedup, ordering and summary metrics

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::normalize::collapse_whitespace;
use shared_types::{Headline, Tradeline, Violation};
use std::collections::HashSet;

/// Code as compared for dedup and ordering
fn code_key(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Identity of a violation for dedup: uppercase code, bureau set, detail.
pub fn dedup_key(violation: &Violation) -> (String, String, String) {
    let bureaus: Vec<&str> = violation
        .bureau_set()
        .into_iter()
        .map(|b| b.name())
        .collect();
    (
        code_key(&violation.code),
        bureaus.join(","),
        violation.detail.as_deref().unwrap_or("").trim().to_string(),
    )
}

/// Drop repeats; the first occurrence of each key wins.
pub fn dedupe_violations<I>(violations: I) -> Vec<Violation>
where
    I: IntoIterator<Item = Violation>,
{
    let mut seen = HashSet::new();
    violations
        .into_iter()
        .filter(|v| seen.insert(dedup_key(v)))
        .collect()
}

/// Severity descending, then uppercase code ascending. Stable.
pub fn sort_violations(violations: &mut [Violation]) {
    violations.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| code_key(&a.code).cmp(&code_key(&b.code)))
    });
}

/// Merge externally supplied violations (lenient JSON) with computed ones,
/// then dedupe and sort. External entries without a code are ignored.
pub fn merge_violations(external: &[Value], computed: &[Violation]) -> Vec<Violation> {
    let incoming = external
        .iter()
        .filter_map(Violation::from_value)
        .chain(computed.iter().cloned());
    let mut merged = dedupe_violations(incoming);
    sort_violations(&mut merged);
    merged
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationMetrics {
    pub violation_count: usize,
    pub max_severity: u32,
}

pub fn metrics(violations: &[Violation]) -> ViolationMetrics {
    ViolationMetrics {
        violation_count: violations.len(),
        max_severity: violations.iter().map(|v| v.severity).max().unwrap_or(0),
    }
}

/// Headline from the first violation (in the given order) with a label.
pub fn headline(violations: &[Violation]) -> Option<Headline> {
    violations.iter().find_map(|v| {
        v.headline_text().map(|text| Headline {
            code: v.code.clone(),
            text,
            severity: v.severity,
        })
    })
}

/// A tradeline violation tagged with the creditor it was reported under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportViolation {
    pub creditor: String,
    pub tradeline_index: usize,
    #[serde(flatten)]
    pub violation: Violation,
}

fn creditor_key(creditor: &str) -> String {
    collapse_whitespace(creditor).to_lowercase()
}

/// Every tradeline's violations as one list, deduplicated across the report
/// (creditor included in the key) and sorted.
pub fn aggregate_report_violations(tradelines: &[Tradeline]) -> Vec<ReportViolation> {
    let mut seen = HashSet::new();
    let mut out: Vec<ReportViolation> = tradelines
        .iter()
        .enumerate()
        .flat_map(|(index, tradeline)| {
            tradeline.violations.iter().map(move |v| ReportViolation {
                creditor: tradeline.creditor.clone(),
                tradeline_index: index,
                violation: v.clone(),
            })
        })
        .filter(|rv| seen.insert((creditor_key(&rv.creditor), dedup_key(&rv.violation))))
        .collect();
    out.sort_by(|a, b| {
        b.violation
            .severity
            .cmp(&a.violation.severity)
            .then_with(|| code_key(&a.violation.code).cmp(&code_key(&b.violation.code)))
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use shared_types::Bureau;

    fn violation(code: &str, severity: u32, bureau: Bureau, detail: &str) -> Violation {
        Violation {
            code: code.into(),
            label: code.to_lowercase(),
            severity,
            detail: Some(detail.into()),
            ..Default::default()
        }
        .with_bureau(bureau)
    }

    #[test]
    fn test_dedupe_first_wins() {
        let mut second = violation("A", 2, Bureau::Equifax, "d");
        second.label = "second".into();
        let out = dedupe_violations(vec![
            violation("A", 2, Bureau::Equifax, "d"),
            second,
            violation("a", 2, Bureau::Equifax, "d "),
            violation("A", 2, Bureau::Experian, "d"),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].label, "a");
    }

    #[test]
    fn test_sort_severity_then_code() {
        let mut list = vec![
            violation("B", 1, Bureau::Equifax, ""),
            violation("C", 3, Bureau::Equifax, ""),
            violation("A", 1, Bureau::Equifax, ""),
        ];
        sort_violations(&mut list);
        let codes: Vec<&str> = list.iter().map(|v| v.code.as_str()).collect();
        assert_eq!(codes, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_sort_ignores_code_case() {
        let mut list = vec![
            violation("stale_data", 2, Bureau::Equifax, ""),
            violation("TRADELINE_GAP", 2, Bureau::Equifax, ""),
            violation("balance_mismatch", 2, Bureau::Equifax, ""),
            violation("ACCOUNT_TYPE", 2, Bureau::Equifax, ""),
        ];
        sort_violations(&mut list);
        let codes: Vec<&str> = list.iter().map(|v| v.code.as_str()).collect();
        assert_eq!(codes, vec!["ACCOUNT_TYPE", "balance_mismatch", "stale_data", "TRADELINE_GAP"]);
    }

    #[test]
    fn test_merge_collapses_cross_source_duplicates() {
        let computed = vec![violation("BALANCE_MISMATCH", 3, Bureau::TransUnion, "x")];
        let external = vec![
            json!({"code": "balance_mismatch", "severity": 3, "bureau": "TU", "detail": "x"}),
            json!({"severity": 9}),
            json!({"code": "STALE_DATA", "severity": -2, "bureaus": ["Experian"]}),
        ];
        let merged = merge_violations(&external, &computed);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].code, "balance_mismatch");
        assert_eq!(merged[1].code, "STALE_DATA");
        assert_eq!(merged[1].severity, 0);
    }

    #[test]
    fn test_metrics_and_headline() {
        assert_eq!(metrics(&[]), ViolationMetrics::default());
        let mut list = vec![
            Violation {
                code: "UNLABELED".into(),
                severity: 5,
                ..Default::default()
            },
            Violation {
                code: "LATE".into(),
                label: "Late payment after payoff".into(),
                category: Some("Payment History".into()),
                severity: 2,
                ..Default::default()
            },
        ];
        sort_violations(&mut list);
        assert_eq!(
            metrics(&list),
            ViolationMetrics {
                violation_count: 2,
                max_severity: 5
            }
        );
        let headline = headline(&list).unwrap();
        assert_eq!(headline.code, "LATE");
        assert_eq!(headline.text, "Payment History – Late payment after payoff");
        assert_eq!(headline.severity, 2);
    }

    #[test]
    fn test_aggregate_report_violations() {
        let mut first = Tradeline::new("ACME BANK");
        first.violations = vec![violation("A", 1, Bureau::Equifax, "d")];
        let mut second = Tradeline::new("acme  bank");
        second.violations = vec![
            violation("A", 1, Bureau::Equifax, "d"),
            violation("B", 4, Bureau::Equifax, "d"),
        ];
        let mut third = Tradeline::new("OTHER LENDER");
        third.violations = vec![violation("A", 1, Bureau::Equifax, "d")];

        let all = aggregate_report_violations(&[first, second, third]);
        let summary: Vec<(&str, usize, &str)> = all
            .iter()
            .map(|rv| (rv.violation.code.as_str(), rv.tradeline_index, rv.creditor.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![("B", 1, "acme  bank"), ("A", 0, "ACME BANK"), ("A", 2, "OTHER LENDER")]
        );
    }
}
