use lazy_static::lazy_static;
use regex::Regex;
use report_document::DocumentTree;
use shared_types::normalize::normalize_label;
use shared_types::CreditScores;

use crate::headings::section_titled;
use crate::table::{all_rows, bureau_header, label_and_values};

const SECTION_TITLES: &[&str] = &["credit score"];

lazy_static! {
    static ref THREE_DIGITS: Regex = Regex::new(r"\b(\d{3})\b").unwrap();
    static ref SCORE_SHAPED: Regex = Regex::new(r"\b([3-8]\d{2})\b").unwrap();
}

fn first_match(pattern: &Regex, text: &str) -> Option<u32> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn extract_table<T: DocumentTree>(tree: &T, table: T::Node, scores: &mut CreditScores) {
    let rows = all_rows(tree, table);
    if let Some(header) = bureau_header(tree, &rows) {
        let score_row = rows
            .iter()
            .copied()
            .filter(|r| *r != header.row)
            .filter_map(|r| label_and_values(tree, r, header.width()))
            .find(|(label, _)| normalize_label(&tree.text(*label)).contains("score"));
        if let Some((_, values)) = score_row {
            for (column, bureau) in header.bureaus() {
                let score = values[column].and_then(|cell| first_match(&THREE_DIGITS, &tree.text(cell)));
                if let Some(score) = score {
                    scores.by_bureau.entry(bureau).or_insert(score);
                }
            }
            return;
        }
    }
    if scores.overall.is_none() {
        scores.overall = first_match(&SCORE_SHAPED, &tree.text(table));
    }
}

/// Scores from every table under a "credit score" heading.
pub fn extract<T: DocumentTree>(tree: &T) -> CreditScores {
    let mut scores = CreditScores::default();
    for table in tree.select_all("table") {
        if section_titled(tree, table, SECTION_TITLES) {
            extract_table(tree, table, &mut scores);
        }
    }
    scores
}
