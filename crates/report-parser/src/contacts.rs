//! Creditor contact directory

use lazy_static::lazy_static;
use regex::Regex;
use report_document::DocumentTree;
use shared_types::{is_blank_text, CreditorContact};
use std::collections::HashSet;

use crate::headings::section_titled;
use crate::table::cells;

const SECTION_TITLES: &[&str] = &["creditor contact", "creditor information"];

lazy_static! {
    static ref DIGIT_RUN: Regex = Regex::new(r"\d{3,}").unwrap();
    static ref PHONE_SAFE: Regex = Regex::new(r"^[0-9()+\-.\s/#xXextEXT]+$").unwrap();
}

/// Three consecutive digits, or nothing but phone punctuation.
pub fn looks_like_phone(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    if DIGIT_RUN.is_match(text) && !text.chars().any(char::is_alphabetic) {
        return true;
    }
    PHONE_SAFE.is_match(text) && text.chars().any(|c| c.is_ascii_digit())
}

fn contact_from_cells(texts: &[String]) -> Option<CreditorContact> {
    let (name_index, name) = texts
        .iter()
        .enumerate()
        .find(|(_, t)| !is_blank_text(t))?;
    let phone = texts
        .iter()
        .enumerate()
        .find(|(i, t)| *i != name_index && looks_like_phone(t));
    let phone_index = phone.map(|(i, _)| i);
    let address = texts
        .iter()
        .enumerate()
        .find(|(i, t)| *i != name_index && Some(*i) != phone_index && !is_blank_text(t))
        .map(|(_, t)| t.clone());
    Some(CreditorContact {
        creditor_name: name.clone(),
        address,
        phone: phone.map(|(_, t)| t.clone()),
    })
}

pub fn extract<T: DocumentTree>(tree: &T) -> Vec<CreditorContact> {
    let mut seen = HashSet::new();
    let mut contacts = Vec::new();
    for table in tree.select_all("table") {
        if !section_titled(tree, table, SECTION_TITLES) {
            continue;
        }
        for row in tree.rows(table) {
            let tds: Vec<String> = cells(tree, row)
                .into_iter()
                .filter(|c| tree.tag(*c) == "td")
                .map(|c| tree.text(c))
                .collect();
            let Some(contact) = contact_from_cells(&tds) else {
                continue;
            };
            let key = (
                contact.creditor_name.to_lowercase(),
                contact.address.as_deref().unwrap_or("").to_lowercase(),
                contact.phone.as_deref().unwrap_or("").to_lowercase(),
            );
            if seen.insert(key) {
                contacts.push(contact);
            }
        }
    }
    contacts
}
