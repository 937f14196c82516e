//! Two-year payment history grids

use lazy_static::lazy_static;
use regex::Regex;
use report_document::DocumentTree;
use shared_types::{Bureau, HistoryCell, HistoryTally, PaymentHistory};
use std::collections::BTreeMap;

use crate::headings::{find_heading, Denylist};
use crate::table::{cell_texts, cells};

pub const HISTORY_TABLE_SELECTOR: &str = "table.addr_hsrty, table.payment-history";

const STATUS_PREFIX: &str = "hstry-";
const UNKNOWN_STATUS: &str = "unknown";

lazy_static! {
    static ref DAYS_LATE: Regex = Regex::new(r"\b(30|60|90|120|150|180)\b").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMark {
    Ok,
    Late,
    Unknown,
}

/// Classify one grid cell from its status token and display text.
pub fn classify(status: &str, text: &str) -> PaymentMark {
    let status = status.to_lowercase();
    let text = text.trim();
    if ["late", "derog", "neg"].iter().any(|t| status.contains(t)) || DAYS_LATE.is_match(text) {
        PaymentMark::Late
    } else if status == "ok" || text.eq_ignore_ascii_case("ok") {
        PaymentMark::Ok
    } else {
        PaymentMark::Unknown
    }
}

pub fn tally(cells: &[HistoryCell]) -> HistoryTally {
    let mut tally = HistoryTally::default();
    for cell in cells {
        match classify(&cell.status, &cell.text) {
            PaymentMark::Ok => tally.ok += 1,
            PaymentMark::Late => tally.late += 1,
            PaymentMark::Unknown => tally.unknown += 1,
        }
        tally.total += 1;
    }
    tally
}

/// "Jan" + "19" → "Jan ’19"
fn month_label(month: &str, year: &str) -> String {
    let year = year.trim();
    if year.is_empty() {
        return month.trim().to_string();
    }
    let short: String = year
        .chars()
        .skip(year.chars().count().saturating_sub(2))
        .collect();
    format!("{} \u{2019}{}", month.trim(), short)
}

/// `hstry-*` suffix on the cell or any element inside it
fn status_token<T: DocumentTree>(tree: &T, cell: T::Node) -> String {
    std::iter::once(cell)
        .chain(tree.find(cell, "[class]"))
        .find_map(|node| {
            tree.classes(node)
                .into_iter()
                .find_map(|c| c.strip_prefix(STATUS_PREFIX).map(str::to_string))
        })
        .filter(|token| !token.is_empty())
        .unwrap_or_else(|| UNKNOWN_STATUS.to_string())
}

pub fn extract_grid<T: DocumentTree>(
    tree: &T,
    table: T::Node,
    denylist: &Denylist,
) -> Option<PaymentHistory> {
    let rows = tree.rows(table);
    if rows.len() < 2 {
        return None;
    }
    let month_names = cell_texts(tree, rows[0]);
    let years = cell_texts(tree, rows[1]);
    let months: Vec<String> = month_names
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, month)| month_label(month, years.get(i).map(String::as_str).unwrap_or("")))
        .collect();

    let mut bureaus: BTreeMap<Bureau, Vec<HistoryCell>> = BTreeMap::new();
    for row in rows.iter().skip(2) {
        let row_cells = cells(tree, *row);
        let Some((first, rest)) = row_cells.split_first() else {
            continue;
        };
        let Some(bureau) = Bureau::canonicalize(&tree.text(*first)) else {
            continue;
        };
        let grid = bureaus.entry(bureau).or_default();
        for (i, cell) in rest.iter().enumerate() {
            grid.push(HistoryCell {
                month: months.get(i).cloned().unwrap_or_default(),
                status: status_token(tree, *cell),
                text: tree.text(*cell),
            });
        }
    }
    if bureaus.is_empty() {
        return None;
    }

    let summary = bureaus
        .iter()
        .map(|(bureau, grid)| (*bureau, tally(grid)))
        .collect();
    let creditor = find_heading(tree, table, |text| !denylist.matches(text)).map(|(_, text)| text);
    Some(PaymentHistory {
        creditor,
        months,
        bureaus,
        summary,
    })
}

/// Every grid in the document, plus the document-wide tally per bureau.
pub fn extract<T: DocumentTree>(
    tree: &T,
    denylist: &Denylist,
) -> (Vec<PaymentHistory>, BTreeMap<Bureau, HistoryTally>) {
    let grids: Vec<PaymentHistory> = tree
        .select_all(HISTORY_TABLE_SELECTOR)
        .into_iter()
        .filter_map(|table| extract_grid(tree, table, denylist))
        .collect();
    let mut totals: BTreeMap<Bureau, HistoryTally> = BTreeMap::new();
    for grid in &grids {
        for (bureau, tally) in &grid.summary {
            totals.entry(*bureau).or_default().merge(tally);
        }
    }
    (grids, totals)
}
