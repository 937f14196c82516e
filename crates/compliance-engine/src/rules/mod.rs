//! Declarative rule language
//!
//! Rule tables are authored outside the code base and are not trusted: a
//! rule that cannot be compiled is logged and dropped, never an error.

pub mod compile;
pub mod definition;
pub mod source;

pub use compile::{CompiledPredicate, CompiledRule, CompiledRuleSet, ExtraMetadata};
pub use definition::{LeafCondition, PredicateNode, RuleDefinition, RuleScope};
pub use source::{normalize_rule_source, parse_rule_source, read_rule_source, RuleEntry};
