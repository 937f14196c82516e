pub mod fields;
pub mod negative;
pub mod normalize;
pub mod report;
pub mod types;

pub use fields::{is_blank, is_blank_text, raw_key, value_text, FieldSet, RAW_SUFFIX};
pub use negative::{Headline, ItemKind, NegativeItem};
pub use normalize::Normalizer;
pub use report::{
    CreditScores, CreditorContact, HistoryCell, HistoryTally, Inquiry, InquirySummary,
    ParsedReport, PaymentHistory, PersonalInfoMismatch, PersonalInformation, PersonalRecord,
    ReportStats, Tradeline,
};
pub use types::{coerce_severity, Bureau, Violation};
