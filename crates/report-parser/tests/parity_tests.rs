//! Backend parity for full report parsing
//!
//! The sample report is parsed as markup, as a JSON node tree and as an
//! in-memory tree. Every representation must produce the same report and
//! the same negative items.
//!
//! Run with: cargo test -p report-parser --test parity_tests

#[path = "common/convert.rs"]
mod convert;
#[path = "common/fixtures.rs"]
mod fixtures;

use convert::all_backends;
use fixtures::{init_tracing, parser, REPORT};
use pretty_assertions::assert_eq;
use report_document::{ElementTree, RawDocument};
use serde_json::json;
use shared_types::Bureau;

#[test]
fn test_sample_report_identical_across_backends() {
    init_tracing();
    let parser = parser();
    let [(_, html), rest @ ..] = all_backends(REPORT);
    let expected = parser.parse(&html);
    assert_eq!(expected.tradelines.len(), 2);

    for (name, document) in rest {
        let report = parser.parse(&document);
        assert_eq!(report, expected, "{} backend diverged", name);
        assert_eq!(
            parser.negative_items(&report),
            parser.negative_items(&expected),
            "{} backend negative items diverged",
            name
        );
    }
}

#[test]
fn test_serialized_report_identical_across_backends() {
    let parser = parser();
    let serialized: Vec<String> = all_backends(REPORT)
        .iter()
        .map(|(_, document)| serde_json::to_string(&parser.parse(document)).unwrap())
        .collect();
    assert_eq!(serialized[0], serialized[1]);
    assert_eq!(serialized[0], serialized[2]);
}

const SMALL: &str = r#"<div><div class="sub_header">ALLY FINANCIAL</div><table class="tradeline-table"><tr><th></th><th>Experian</th></tr><tr><td class="label">Balance:</td><td class="info">$9,100</td></tr></table></div>"#;

fn hand_built_tree() -> ElementTree {
    let mut tree = ElementTree::new();
    let root = tree.add_element(None, "div", &[]);
    let heading = tree.add_element(Some(root), "div", &[("class", "sub_header")]);
    tree.add_text(heading, "ALLY FINANCIAL");
    let table = tree.add_element(Some(root), "table", &[("class", "tradeline-table")]);
    let header = tree.add_element(Some(table), "tr", &[]);
    tree.add_element(Some(header), "th", &[]);
    let bureau = tree.add_element(Some(header), "th", &[]);
    tree.add_text(bureau, "Experian");
    let row = tree.add_element(Some(table), "tr", &[]);
    let label = tree.add_element(Some(row), "td", &[("class", "label")]);
    tree.add_text(label, "Balance:");
    let value = tree.add_element(Some(row), "td", &[("class", "info")]);
    tree.add_text(value, "$9,100");
    tree
}

#[test]
fn test_hand_built_inputs_match_markup() {
    let parser = parser();
    let from_markup = parser.parse_html(SMALL);
    assert_eq!(from_markup.tradelines[0].creditor, "ALLY FINANCIAL");
    assert_eq!(
        from_markup.tradelines[0].per_bureau[&Bureau::Experian].get("balance"),
        Some(&json!(9100.0))
    );

    // JSON as a collector might emit it: "name"/"attributes" keys, {text} children
    let lenient = json!({
        "name": "DIV",
        "children": [
            {"name": "div", "attributes": {"class": "sub_header"}, "children": [{"text": "ALLY FINANCIAL"}]},
            {"name": "table", "attributes": {"class": "tradeline-table"}, "children": [
                {"name": "tr", "children": [
                    {"name": "th"},
                    {"name": "th", "children": ["Experian"]}
                ]},
                {"name": "tr", "children": [
                    {"name": "td", "attributes": {"class": "label"}, "children": ["Balance:"]},
                    {"name": "td", "attributes": {"class": "info"}, "children": [{"text": "$9,100"}]}
                ]}
            ]}
        ]
    });
    let from_json = parser.parse_json(&lenient);
    let from_tree = parser.parse(&RawDocument::Tree(hand_built_tree()));

    assert_eq!(from_json.tradelines, from_markup.tradelines);
    assert_eq!(from_tree.tradelines, from_markup.tradelines);
}

const ADDRESSES: &str = r#"<div><div class="sub_header">Personal Information</div><table><tr><td>Name</td><td>PAT O&#x27;BRIEN</td></tr><tr><td>Current Address</td><td>12 ELM &amp; OAK<br/><span>APT&nbsp;4</span><br>SPRINGFIELD</td></tr></table></div>"#;

#[test]
fn test_line_split_cells_match_across_backends() {
    let parser = parser();
    let [(_, html), rest @ ..] = all_backends(ADDRESSES);
    let expected = parser.parse(&html).personal_information;
    let combined = expected.combined.clone().unwrap();
    assert_eq!(combined.name.as_deref(), Some("PAT O'BRIEN"));
    assert_eq!(
        combined.current_addresses,
        vec!["12 ELM & OAK", "APT 4", "SPRINGFIELD"]
    );
    for (name, document) in rest {
        assert_eq!(parser.parse(&document).personal_information, expected, "{} backend diverged", name);
    }
}
