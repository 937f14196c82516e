use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::types::{Bureau, Violation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Tradeline,
    Inquiries,
    PersonalInformation,
}

/// Display headline of a negative item, taken from its top violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    pub code: String,
    pub text: String,
    pub severity: u32,
}

/// Consumer-facing aggregation of one tradeline's (or one synthetic
/// category's) violations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegativeItem {
    pub index: usize,
    pub kind: ItemKind,
    pub creditor: String,
    /// Masked as "•••• 1234"
    pub account_numbers: BTreeMap<Bureau, String>,
    pub bureaus: BTreeSet<Bureau>,
    pub severity: u32,
    pub headline: Option<Headline>,
    pub violations: Vec<Violation>,
    pub bureau_details: BTreeMap<Bureau, BTreeMap<String, String>>,
}
