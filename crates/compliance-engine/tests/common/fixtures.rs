//! Violation builders shared by the integration tests
#![allow(dead_code)]

use shared_types::{Bureau, Violation};

pub const BUREAUS: [Bureau; 3] = Bureau::ALL;

pub fn violation(code: &str, severity: u32, bureau: Bureau, detail: &str) -> Violation {
    Violation {
        code: code.to_string(),
        label: format!("{} label", code),
        severity,
        detail: (!detail.is_empty()).then(|| detail.to_string()),
        ..Default::default()
    }
    .with_bureau(bureau)
}
