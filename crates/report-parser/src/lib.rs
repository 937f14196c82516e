//! Credit report parser
//!
//! Turns a report document (markup, JSON node tree or in-memory tree) into a
//! [`ParsedReport`]: tradelines with their Metro 2 violations, payment
//! history, inquiries, personal information, scores and creditor contacts.
//!
//! Extraction never fails. Input that is not a recognizable tree yields an
//! empty report, and rows the parser does not understand are skipped.
//!
//! ```
//! use report_parser::ReportParser;
//!
//! let parser = ReportParser::builtin();
//! let report = parser.parse_html("<p>not a credit report</p>");
//! assert!(report.tradelines.is_empty());
//! ```

pub mod config;
pub mod contacts;
pub mod field_rules;
pub mod headings;
pub mod history;
pub mod inquiries;
pub mod personal;
pub mod scores;
pub mod table;
pub mod tradelines;

pub use config::{ConfigError, ParserConfig};
pub use field_rules::FieldRule;
pub use headings::Denylist;
pub use tradelines::TradelineExtractor;

use compliance_engine::{ComplianceEngine, SyntheticInputs};
use report_document::{DocumentTree, RawDocument, TreeVisitor};
use serde_json::Value;
use shared_types::{NegativeItem, ParsedReport};
use tracing::{debug, info};

/// Report parser bound to one configuration and rule engine
#[derive(Debug, Clone)]
pub struct ReportParser {
    config: ParserConfig,
    engine: ComplianceEngine,
    denylist: Denylist,
}

impl Default for ReportParser {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ReportParser {
    pub fn new(config: ParserConfig, engine: ComplianceEngine) -> Self {
        let denylist = Denylist::with_extra(&config.extra_denylist);
        Self {
            config,
            engine,
            denylist,
        }
    }

    /// Default configuration with the built-in rule table and catalog
    pub fn builtin() -> Self {
        Self::new(ParserConfig::default(), ComplianceEngine::builtin())
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self::new(config, ComplianceEngine::builtin())
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn engine(&self) -> &ComplianceEngine {
        &self.engine
    }

    pub fn denylist(&self) -> &Denylist {
        &self.denylist
    }

    /// Parse a document in any supported representation.
    pub fn parse(&self, document: &RawDocument) -> ParsedReport {
        let backend = document.backend();
        match document.visit(ParseVisitor { parser: self }) {
            Some(report) => {
                let stats = report.stats();
                info!(
                    ?backend,
                    tradelines = stats.tradelines,
                    violations = stats.violations,
                    inquiries = stats.inquiries,
                    history_grids = stats.history_grids,
                    contacts = stats.creditor_contacts,
                    "parsed credit report"
                );
                report
            }
            None => {
                debug!(?backend, "unrecognized document, returning empty report");
                ParsedReport::default()
            }
        }
    }

    pub fn parse_html(&self, markup: &str) -> ParsedReport {
        self.parse(&RawDocument::Html(markup.to_string()))
    }

    /// Parse a JSON document: a string holding markup, or a node tree.
    pub fn parse_json(&self, value: &Value) -> ParsedReport {
        self.parse(&RawDocument::from_value(value.clone()))
    }

    /// Run every extractor against an already-open tree.
    pub fn parse_tree<T: DocumentTree>(&self, tree: &T) -> ParsedReport {
        let mut extractor = TradelineExtractor::new(&self.denylist).dedupe(self.config.dedupe_tradelines);
        if self.config.evaluate_rules {
            extractor = extractor.with_engine(&self.engine);
        }
        let tradelines = extractor.extract(tree);

        let (account_history, history) = history::extract(tree, &self.denylist);

        let inquiries = inquiries::extract(tree);
        let inquiry_summary = inquiries::summarize(&inquiries, self.config.reference_date());
        let inquiry_details = inquiries::group_by_bureau(&inquiries);

        ParsedReport {
            tradelines,
            history,
            inquiries,
            inquiry_summary,
            personal_information: personal::extract(tree),
            credit_scores: scores::extract(tree),
            account_history,
            inquiry_details,
            creditor_contacts: contacts::extract(tree),
        }
    }

    /// Negative items for a parsed report, including the inquiry and
    /// personal-information items derived from the report itself.
    pub fn negative_items(&self, report: &ParsedReport) -> Vec<NegativeItem> {
        let inputs = SyntheticInputs {
            mismatches: Some(personal::detect_mismatches(&report.personal_information)),
            ..Default::default()
        };
        self.engine.negative_items(report, &inputs)
    }
}

struct ParseVisitor<'a> {
    parser: &'a ReportParser,
}

impl TreeVisitor for ParseVisitor<'_> {
    type Output = ParsedReport;

    fn visit<T: DocumentTree>(self, tree: &T) -> ParsedReport {
        self.parser.parse_tree(tree)
    }
}
