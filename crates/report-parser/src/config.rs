//! Parser configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! as_of = "2024-06-30"
//! extra_denylist = ["account summary"]
//! evaluate_rules = true
//! dedupe_tradelines = true
//! ```

use anyhow::Context;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid as_of date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),

    #[error("Blank denylist entry at position {0}")]
    BlankDenylistEntry(usize),
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Reference date for the 12/24-month inquiry windows; today when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<String>,
    /// Phrases added to the built-in non-creditor heading denylist
    #[serde(default)]
    pub extra_denylist: Vec<String>,
    #[serde(default = "default_true")]
    pub evaluate_rules: bool,
    #[serde(default = "default_true")]
    pub dedupe_tradelines: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            as_of: None,
            extra_denylist: Vec::new(),
            evaluate_rules: true,
            dedupe_tradelines: true,
        }
    }
}

impl ParserConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed,
    /// or a value fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Example
    ///
    /// ```
    /// use report_parser::config::ParserConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = ParserConfig::from_str(r#"as_of = "2024-06-30""#)?;
    /// assert!(config.evaluate_rules);
    /// # Ok(())
    /// # }
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: ParserConfig = toml::from_str(s).context("Failed to parse TOML config")?;
        config.validate().context("Invalid parser config")?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.as_of_date()?;
        if let Some(pos) = self.extra_denylist.iter().position(|p| p.trim().is_empty()) {
            return Err(ConfigError::BlankDenylistEntry(pos));
        }
        Ok(())
    }

    pub fn as_of_date(&self) -> Result<Option<NaiveDate>, ConfigError> {
        match self.as_of.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| ConfigError::InvalidDate(text.to_string())),
        }
    }

    /// The configured `as_of`, or today's local date.
    pub fn reference_date(&self) -> NaiveDate {
        self.as_of_date()
            .ok()
            .flatten()
            .unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn with_as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = Some(date.format("%Y-%m-%d").to_string());
        self
    }
}
