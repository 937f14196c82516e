//! Row-label → canonical field table
//!
//! Labels are matched after [`normalize_label`]. The exact table is
//! authoritative; the regex table only catches wording variants the exact
//! table has no entry for.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use shared_types::normalize::normalize_label;
use shared_types::{is_blank_text, FieldSet, Normalizer};
use std::collections::HashMap;

/// Canonical key(s) a row fills, and how its text is normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub keys: &'static [&'static str],
    pub normalizer: Option<Normalizer>,
}

const fn rule(keys: &'static [&'static str], normalizer: Option<Normalizer>) -> FieldRule {
    FieldRule { keys, normalizer }
}

const TEXT: Option<Normalizer> = None;
const MONEY: Option<Normalizer> = Some(Normalizer::Money);
const DATE: Option<Normalizer> = Some(Normalizer::Date);
const INTEGER: Option<Normalizer> = Some(Normalizer::Integer);

const ACCOUNT_NUMBER: FieldRule = rule(&["account_number"], TEXT);
const ACCOUNT_TYPE: FieldRule = rule(&["account_type"], TEXT);
const ACCOUNT_TYPE_DETAIL: FieldRule = rule(&["account_type_detail"], TEXT);
const BUREAU_CODE: FieldRule = rule(&["bureau_code"], TEXT);
const ACCOUNT_STATUS: FieldRule = rule(&["account_status"], TEXT);
const PAYMENT_STATUS: FieldRule = rule(&["payment_status"], TEXT);
const COMBINED_STATUS: FieldRule = rule(&["account_status", "payment_status"], TEXT);
const MONTHLY_PAYMENT: FieldRule = rule(&["monthly_payment"], MONEY);
const DATE_OPENED: FieldRule = rule(&["date_opened"], DATE);
const BALANCE: FieldRule = rule(&["balance"], MONEY);
const TERM_MONTHS: FieldRule = rule(&["term_months"], INTEGER);
const HIGH_CREDIT: FieldRule = rule(&["high_credit"], MONEY);
const CREDIT_LIMIT: FieldRule = rule(&["credit_limit"], MONEY);
const PAST_DUE: FieldRule = rule(&["past_due"], MONEY);
const LAST_REPORTED: FieldRule = rule(&["last_reported"], DATE);
const REMARKS: FieldRule = rule(&["remarks"], TEXT);
const DATE_LAST_ACTIVE: FieldRule = rule(&["date_last_active"], DATE);
const DATE_LAST_PAYMENT: FieldRule = rule(&["date_last_payment"], DATE);
const DATE_CLOSED: FieldRule = rule(&["date_closed"], DATE);
const DATE_FIRST_DELINQUENCY: FieldRule = rule(&["date_first_delinquency"], DATE);
const CREDITOR_NAME: FieldRule = rule(&["creditor_name"], TEXT);

lazy_static! {
    static ref EXACT_RULES: HashMap<&'static str, FieldRule> = {
        let mut m = HashMap::new();
        for label in ["account", "account number", "account no", "acct number", "acct"] {
            m.insert(label, ACCOUNT_NUMBER);
        }
        m.insert("account type", ACCOUNT_TYPE);
        m.insert("account type detail", ACCOUNT_TYPE_DETAIL);
        m.insert("detail", ACCOUNT_TYPE_DETAIL);
        m.insert("bureau code", BUREAU_CODE);
        m.insert("account status", ACCOUNT_STATUS);
        m.insert("payment status", PAYMENT_STATUS);
        m.insert("account status payment status", COMBINED_STATUS);
        m.insert("monthly payment", MONTHLY_PAYMENT);
        m.insert("date opened", DATE_OPENED);
        m.insert("balance", BALANCE);
        m.insert("current balance", BALANCE);
        for label in ["no of months terms", "no of months", "terms", "term length"] {
            m.insert(label, TERM_MONTHS);
        }
        m.insert("high credit", HIGH_CREDIT);
        m.insert("credit limit", CREDIT_LIMIT);
        for label in ["past due", "past due amount", "amount past due"] {
            m.insert(label, PAST_DUE);
        }
        m.insert("last reported", LAST_REPORTED);
        m.insert("date reported", LAST_REPORTED);
        for label in ["comments", "remarks", "creditor remarks"] {
            m.insert(label, REMARKS);
        }
        m.insert("date last active", DATE_LAST_ACTIVE);
        for label in ["date of last payment", "date last payment", "last payment"] {
            m.insert(label, DATE_LAST_PAYMENT);
        }
        m.insert("date closed", DATE_CLOSED);
        for label in ["date of first delinquency", "date first delinquency", "dofd"] {
            m.insert(label, DATE_FIRST_DELINQUENCY);
        }
        for label in ["creditor", "creditor name", "company name"] {
            m.insert(label, CREDITOR_NAME);
        }
        m
    };

    static ref PATTERN_RULES: Vec<(Regex, FieldRule)> = vec![
        (Regex::new(r"^acc(oun)?t\b.*\b(number|no|num)\b").unwrap(), ACCOUNT_NUMBER),
        (Regex::new(r"\bfirst\s+delinquen").unwrap(), DATE_FIRST_DELINQUENCY),
        (Regex::new(r"\bpast\s+due\b").unwrap(), PAST_DUE),
        (Regex::new(r"\bhigh(est)?\s+(credit|balance)\b").unwrap(), HIGH_CREDIT),
        (Regex::new(r"\bcredit\s+limit\b").unwrap(), CREDIT_LIMIT),
        (Regex::new(r"\bmonthly\s+payment").unwrap(), MONTHLY_PAYMENT),
        (Regex::new(r"\blast\s+payment\b").unwrap(), DATE_LAST_PAYMENT),
        (Regex::new(r"\b(date\s+)?(last\s+)?reported\b").unwrap(), LAST_REPORTED),
        (Regex::new(r"\bopened\b").unwrap(), DATE_OPENED),
        (Regex::new(r"\bclosed\b").unwrap(), DATE_CLOSED),
        (Regex::new(r"\b(remark|comment)s?\b").unwrap(), REMARKS),
        (Regex::new(r"\bterms?\b").unwrap(), TERM_MONTHS),
    ];
}

/// Rule for a row label, exact table first.
pub fn lookup(label: &str) -> Option<&'static FieldRule> {
    let normalized = normalize_label(label);
    if normalized.is_empty() {
        return None;
    }
    let exact: &'static HashMap<&'static str, FieldRule> = &EXACT_RULES;
    if let Some(rule) = exact.get(normalized.as_str()) {
        return Some(rule);
    }
    let patterns: &'static Vec<(Regex, FieldRule)> = &PATTERN_RULES;
    patterns
        .iter()
        .find(|(pattern, _)| pattern.is_match(&normalized))
        .map(|(_, rule)| rule)
}

impl FieldRule {
    /// Normalize `raw` and store each key with its raw twin.
    ///
    /// Multi-key rules split on `/` when the part count matches the key
    /// count; otherwise every key receives the whole text. Blank parts are
    /// skipped.
    pub fn extract_into(&self, raw: &str, fields: &mut FieldSet) {
        let raw = raw.trim();
        let parts: Vec<&str> = if self.keys.len() > 1 {
            let split: Vec<&str> = raw.split('/').map(str::trim).collect();
            if split.len() == self.keys.len() {
                split
            } else {
                vec![raw; self.keys.len()]
            }
        } else {
            vec![raw]
        };
        for (key, text) in self.keys.iter().zip(parts) {
            if is_blank_text(text) {
                continue;
            }
            let value = match self.normalizer {
                Some(normalizer) => normalizer.apply(text),
                None => Value::String(text.to_string()),
            };
            fields.insert_extracted(key, value, text);
        }
    }
}
