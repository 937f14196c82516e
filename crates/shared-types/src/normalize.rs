//! Value normalizers for money, dates and integers
//!
//! Credit reports print the same quantity many ways ("$1,200", "1200.00",
//! "06/2019", "Jun 3, 2019"). These helpers reduce them to one shape:
//! money → number rounded to cents, dates → `MM/DD/YYYY`, integers → i64.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

lazy_static! {
    static ref NON_NUMERIC: Regex = Regex::new(r"[^0-9.\-]").unwrap();
    static ref NON_INTEGER: Regex = Regex::new(r"[^0-9\-]").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref LABEL_NOISE: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
    static ref SLASH_DATE_LONG: Regex = Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").unwrap();
    static ref SLASH_DATE_SHORT: Regex = Regex::new(r"^\d{1,2}/\d{1,2}/\d{2}$").unwrap();
    static ref DASH_DATE_US: Regex = Regex::new(r"^\d{1,2}-\d{1,2}-\d{4}$").unwrap();
    static ref ISO_DATE: Regex = Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}").unwrap();
    static ref MONTH_YEAR: Regex = Regex::new(r"^(\d{1,2})/(\d{4})$").unwrap();
}

/// How a field's raw text is reduced to its canonical value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalizer {
    Money,
    Date,
    Integer,
}

impl Normalizer {
    /// Normalize `raw`. Text the normalizer cannot read is kept as trimmed
    /// text so nothing extracted is silently lost.
    pub fn apply(&self, raw: &str) -> Value {
        let trimmed = raw.trim();
        let normalized = match self {
            Normalizer::Money => parse_money(trimmed).map(Value::from),
            Normalizer::Date => normalize_date(trimmed).map(Value::from),
            Normalizer::Integer => parse_integer(trimmed).map(Value::from),
        };
        normalized.unwrap_or_else(|| Value::String(trimmed.to_string()))
    }
}

/// Collapse runs of whitespace to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Lowercase a row label and collapse punctuation/whitespace runs to one space.
///
/// "Account Status / Payment Status:" → "account status payment status"
pub fn normalize_label(label: &str) -> String {
    let lower = label.to_lowercase();
    LABEL_NOISE.replace_all(&lower, " ").trim().to_string()
}

/// Strip everything except digits, period and minus, then parse.
pub fn numeric_value(text: &str) -> Option<f64> {
    let cleaned = NON_NUMERIC.replace_all(text, "");
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a money amount, rounded to cents.
pub fn parse_money(text: &str) -> Option<f64> {
    numeric_value(text).map(|n| (n * 100.0).round() / 100.0)
}

/// Format as "$#,##0.00" (negative amounts as "-$#,##0.00").
pub fn format_money(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

pub fn parse_integer(text: &str) -> Option<i64> {
    let cleaned = NON_INTEGER.replace_all(text, "");
    cleaned.parse::<i64>().ok()
}

/// Parse the date shapes found on bureau reports.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if SLASH_DATE_LONG.is_match(text) {
        return NaiveDate::parse_from_str(text, "%m/%d/%Y").ok();
    }
    if SLASH_DATE_SHORT.is_match(text) {
        return NaiveDate::parse_from_str(text, "%m/%d/%y").ok();
    }
    if DASH_DATE_US.is_match(text) {
        return NaiveDate::parse_from_str(text, "%m-%d-%Y").ok();
    }
    if let Some(iso) = ISO_DATE.find(text) {
        return NaiveDate::parse_from_str(iso.as_str(), "%Y-%m-%d").ok();
    }
    if let Some(caps) = MONTH_YEAR.captures(text) {
        let month = caps[1].parse::<u32>().ok()?;
        let year = caps[2].parse::<i32>().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1);
    }
    ["%b %d, %Y", "%B %d, %Y", "%b %d %Y", "%B %d %Y", "%d %b %Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// Normalize a date to `MM/DD/YYYY`. Idempotent on already-normalized input.
pub fn normalize_date(text: &str) -> Option<String> {
    parse_date(text).map(|d| d.format("%m/%d/%Y").to_string())
}
