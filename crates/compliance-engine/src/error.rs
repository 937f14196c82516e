use thiserror::Error;

/// Failures loading rule tables or violation catalogs.
///
/// Only the loading edge can fail; individual malformed rules are dropped
/// during compilation instead of surfacing here.
#[derive(Error, Debug)]
pub enum RuleSourceError {
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported source shape: {0}")]
    Shape(String),
}
