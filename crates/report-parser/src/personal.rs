//! Personal information section
//!
//! Identity fields are printed per bureau (or once for the whole report) in
//! a label/value table under a "Personal Information" heading. Address and
//! alias cells hold several values as list items or `<br>`-separated lines.

use report_document::DocumentTree;
use shared_types::normalize::{collapse_whitespace, normalize_label};
use shared_types::{is_blank_text, Bureau, PersonalInfoMismatch, PersonalInformation, PersonalRecord};
use std::collections::{BTreeMap, BTreeSet};

use crate::headings::section_titled;
use crate::table::{all_rows, bureau_header, cells, label_and_values};

const SECTION_TITLES: &[&str] = &["personal information", "personal info"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalField {
    Name,
    AlsoKnownAs,
    Former,
    DateOfBirth,
    CurrentAddresses,
    PreviousAddresses,
    Employers,
}

impl PersonalField {
    /// Fuzzy match of a row label
    pub fn from_label(label: &str) -> Option<Self> {
        let label = normalize_label(label);
        let has = |needle: &str| label.contains(needle);
        if has("also known") || label == "aka" {
            Some(Self::AlsoKnownAs)
        } else if has("former") {
            Some(Self::Former)
        } else if has("birth") || label == "dob" {
            Some(Self::DateOfBirth)
        } else if (has("previous") || has("prior")) && has("address") {
            Some(Self::PreviousAddresses)
        } else if has("address") {
            Some(Self::CurrentAddresses)
        } else if has("employer") {
            Some(Self::Employers)
        } else if has("name") {
            Some(Self::Name)
        } else {
            None
        }
    }
}

/// Distinct non-blank values of a list-structured cell.
pub fn cell_values<T: DocumentTree>(tree: &T, cell: T::Node) -> Vec<String> {
    let items = tree.find(cell, "li");
    let candidates: Vec<String> = if items.is_empty() {
        tree.lines(cell)
    } else {
        items.into_iter().map(|li| tree.text(li)).collect()
    };
    let mut values: Vec<String> = Vec::new();
    for value in candidates {
        if !is_blank_text(&value) && !values.contains(&value) {
            values.push(value);
        }
    }
    values
}

fn push_distinct(target: &mut Vec<String>, values: Vec<String>) {
    for value in values {
        if !target.contains(&value) {
            target.push(value);
        }
    }
}

fn apply(record: &mut PersonalRecord, field: PersonalField, values: Vec<String>) {
    match field {
        PersonalField::Name => {
            if record.name.is_none() {
                record.name = values.into_iter().next();
            }
        }
        PersonalField::DateOfBirth => {
            if record.date_of_birth.is_none() {
                record.date_of_birth = values.into_iter().next();
            }
        }
        PersonalField::AlsoKnownAs => push_distinct(&mut record.also_known_as, values),
        PersonalField::Former => push_distinct(&mut record.former, values),
        PersonalField::CurrentAddresses => push_distinct(&mut record.current_addresses, values),
        PersonalField::PreviousAddresses => push_distinct(&mut record.previous_addresses, values),
        PersonalField::Employers => push_distinct(&mut record.employers, values),
    }
}

fn extract_table<T: DocumentTree>(tree: &T, table: T::Node, info: &mut PersonalInformation) {
    let rows = all_rows(tree, table);
    match bureau_header(tree, &rows) {
        Some(header) => {
            for row in rows.iter().copied().filter(|r| *r != header.row) {
                let Some((label, values)) = label_and_values(tree, row, header.width()) else {
                    continue;
                };
                let Some(field) = PersonalField::from_label(&tree.text(label)) else {
                    continue;
                };
                for (column, bureau) in header.bureaus() {
                    let Some(cell) = values[column] else {
                        continue;
                    };
                    let found = cell_values(tree, cell);
                    if !found.is_empty() {
                        apply(info.by_bureau.entry(bureau).or_default(), field, found);
                    }
                }
            }
        }
        None => {
            for row in rows {
                let row_cells = cells(tree, row);
                let [label, value, ..] = row_cells.as_slice() else {
                    continue;
                };
                let Some(field) = PersonalField::from_label(&tree.text(*label)) else {
                    continue;
                };
                let found = cell_values(tree, *value);
                if !found.is_empty() {
                    apply(info.combined.get_or_insert_with(Default::default), field, found);
                }
            }
        }
    }
}

pub fn extract<T: DocumentTree>(tree: &T) -> PersonalInformation {
    let mut info = PersonalInformation::default();
    for table in tree.select_all("table") {
        if section_titled(tree, table, SECTION_TITLES) {
            extract_table(tree, table, &mut info);
        }
    }
    info.by_bureau.retain(|_, record| !record.is_empty());
    if info.combined.as_ref().is_some_and(PersonalRecord::is_empty) {
        info.combined = None;
    }
    info
}

fn comparable(text: &str) -> String {
    collapse_whitespace(text).to_lowercase()
}

type Compared = Option<(String, BTreeSet<String>)>;

fn single(value: &Option<String>) -> Compared {
    value
        .as_ref()
        .map(|v| (v.clone(), BTreeSet::from([comparable(v)])))
}

fn compared_name(record: &PersonalRecord) -> Compared {
    single(&record.name)
}

fn compared_birth(record: &PersonalRecord) -> Compared {
    single(&record.date_of_birth)
}

fn compared_addresses(record: &PersonalRecord) -> Compared {
    if record.current_addresses.is_empty() {
        return None;
    }
    Some((
        record.current_addresses.join("; "),
        record.current_addresses.iter().map(|a| comparable(a)).collect(),
    ))
}

/// Fields whose populated per-bureau values disagree.
///
/// Compared fields: name, date of birth, current addresses (as a set).
pub fn detect_mismatches(info: &PersonalInformation) -> Vec<PersonalInfoMismatch> {
    let fields: [(&str, fn(&PersonalRecord) -> Compared); 3] = [
        ("name", compared_name),
        ("date_of_birth", compared_birth),
        ("current_addresses", compared_addresses),
    ];

    let mut mismatches = Vec::new();
    for (field, accessor) in fields {
        let populated: Vec<(Bureau, String, BTreeSet<String>)> = info
            .by_bureau
            .iter()
            .filter_map(|(bureau, record)| accessor(record).map(|(shown, key)| (*bureau, shown, key)))
            .collect();
        let distinct: BTreeSet<&BTreeSet<String>> = populated.iter().map(|(_, _, key)| key).collect();
        if populated.len() >= 2 && distinct.len() > 1 {
            mismatches.push(PersonalInfoMismatch {
                field: field.to_string(),
                values: populated
                    .into_iter()
                    .map(|(bureau, shown, _)| (bureau, shown))
                    .collect::<BTreeMap<_, _>>(),
            });
        }
    }
    mismatches
}
