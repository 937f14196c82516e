//! Credit inquiries and their recency summary

use chrono::{Months, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use report_document::DocumentTree;
use shared_types::normalize::{normalize_date, parse_date};
use shared_types::{is_blank_text, Bureau, Inquiry, InquirySummary};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::trace;

use crate::table::{cell_texts, cells};

pub const INQUIRY_ROW_SELECTOR: &str = "tr[ng-repeat*=inqPartition], tr.inquiry-row";

lazy_static! {
    static ref DATE_SHAPE: Regex =
        Regex::new(r"^\d{1,2}[/-]\d{1,2}[/-]\d{2,4}$|^\d{4}-\d{1,2}-\d{1,2}$|^\d{1,2}/\d{4}$")
            .unwrap();
}

fn looks_like_date(text: &str) -> bool {
    let text = text.trim();
    DATE_SHAPE.is_match(text) || parse_date(text).is_some()
}

/// Rows holding inquiries: marker rows first, then heuristic matches, each
/// row once.
fn inquiry_rows<T: DocumentTree>(tree: &T) -> Vec<T::Node> {
    let mut rows = tree.select_all(INQUIRY_ROW_SELECTOR);
    for row in tree.select_all("tr") {
        if rows.contains(&row) {
            continue;
        }
        let tds: Vec<T::Node> = cells(tree, row)
            .into_iter()
            .filter(|c| tree.tag(*c) == "td")
            .collect();
        if tds.len() != 4 {
            continue;
        }
        if Bureau::canonicalize(&tree.text(tds[3])).is_some() && looks_like_date(&tree.text(tds[2])) {
            rows.push(row);
        }
    }
    rows
}

fn inquiry_from_cells(texts: &[String]) -> Option<Inquiry> {
    let cell = |i: usize| texts.get(i).map(|t| t.trim().to_string()).unwrap_or_default();
    let creditor = cell(0);
    if is_blank_text(&creditor) {
        return None;
    }
    let business_type = Some(cell(1)).filter(|t| !is_blank_text(t));
    let date_raw = cell(2);
    let bureau_raw = cell(3);
    Some(Inquiry {
        creditor,
        business_type,
        date: normalize_date(&date_raw),
        bureau: Bureau::canonicalize(&bureau_raw),
        date_raw,
        bureau_raw,
    })
}

fn inquiry_date(inquiry: &Inquiry) -> Option<NaiveDate> {
    inquiry.date.as_deref().and_then(parse_date)
}

/// Newest first; undated inquiries keep their order at the end.
pub fn sort_newest_first(inquiries: &mut [Inquiry]) {
    inquiries.sort_by(|a, b| match (inquiry_date(a), inquiry_date(b)) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

pub fn extract<T: DocumentTree>(tree: &T) -> Vec<Inquiry> {
    let mut inquiries: Vec<Inquiry> = inquiry_rows(tree)
        .into_iter()
        .filter_map(|row| {
            let parsed = inquiry_from_cells(&cell_texts(tree, row));
            if parsed.is_none() {
                trace!("inquiry row without creditor");
            }
            parsed
        })
        .collect();
    sort_newest_first(&mut inquiries);
    inquiries
}

/// Counts per bureau and within the 12/24 months up to `as_of`.
///
/// Inquiries dated after `as_of` count toward both windows.
pub fn summarize(inquiries: &[Inquiry], as_of: NaiveDate) -> InquirySummary {
    let cutoff = |months: u32| as_of.checked_sub_months(Months::new(months));
    let (year, two_years) = (cutoff(12), cutoff(24));
    let within = |date: NaiveDate, bound: Option<NaiveDate>| bound.map_or(true, |b| date >= b);

    let mut summary = InquirySummary {
        total: inquiries.len(),
        ..Default::default()
    };
    for inquiry in inquiries {
        if let Some(bureau) = inquiry.bureau {
            *summary.by_bureau.entry(bureau).or_default() += 1;
        }
        if let Some(date) = inquiry_date(inquiry) {
            if within(date, year) {
                summary.last_12_months += 1;
            }
            if within(date, two_years) {
                summary.last_24_months += 1;
            }
        }
    }
    summary
}

/// Inquiries grouped by bureau, each group in input order
pub fn group_by_bureau(inquiries: &[Inquiry]) -> BTreeMap<Bureau, Vec<Inquiry>> {
    let mut groups: BTreeMap<Bureau, Vec<Inquiry>> = BTreeMap::new();
    for inquiry in inquiries {
        if let Some(bureau) = inquiry.bureau {
            groups.entry(bureau).or_default().push(inquiry.clone());
        }
    }
    groups
}
