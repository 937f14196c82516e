//! Section headings and the non-creditor denylist
//!
//! Reports title each account block with a heading element somewhere before
//! its comparison table: a sibling, a sibling's descendant, or a sibling of
//! some ancestor. Report boilerplate uses the same heading markup, so
//! candidate creditor names are screened against a denylist.

use report_document::DocumentTree;
use shared_types::normalize::normalize_label;

/// Elements that can title a report section
pub const HEADING_SELECTOR: &str =
    "div.sub_header, div.hdr_header, .section-title, .creditor-name, h1, h2, h3, h4, h5, h6";

const DEFAULT_DENYLIST: &[&str] = &[
    "risk factors",
    "credit report",
    "reference #",
    "personal information",
    "credit score",
    "account history",
    "payment history",
    "inquiries",
    "public records",
    "creditor contacts",
    "creditor information",
    "consumer statement",
    "back to top",
];

/// Generic words that only mark boilerplate as the last word of a heading
/// ("Account Summary"), never in a creditor name ("SUMMARY FCU").
const TRAILING_DENYLIST: &[&str] = &["summary", "overview"];

/// Nearest heading before `node` whose text passes `accept`.
///
/// Walks previous siblings (each sibling itself, then its last matching
/// descendant), then repeats from the parent. Headings with empty text are
/// passed over.
pub fn find_heading<T, F>(tree: &T, node: T::Node, accept: F) -> Option<(T::Node, String)>
where
    T: DocumentTree,
    F: Fn(&str) -> bool,
{
    let mut current = Some(node);
    while let Some(anchor) = current {
        let mut sibling = tree.previous(anchor);
        while let Some(candidate) = sibling {
            if tree.matches(candidate, HEADING_SELECTOR) {
                let text = tree.text(candidate);
                if !text.is_empty() && accept(&text) {
                    return Some((candidate, text));
                }
            }
            let nested = tree
                .find(candidate, HEADING_SELECTOR)
                .into_iter()
                .rev()
                .map(|n| (n, tree.text(n)))
                .find(|(_, text)| !text.is_empty() && accept(text));
            if nested.is_some() {
                return nested;
            }
            sibling = tree.previous(candidate);
        }
        current = tree.parent(anchor);
    }
    None
}

/// Text of the nearest heading before `node`.
pub fn nearest_heading<T: DocumentTree>(tree: &T, node: T::Node) -> Option<String> {
    find_heading(tree, node, |_| true).map(|(_, text)| text)
}

/// Whether the nearest heading before `node` mentions any of `phrases`.
pub fn section_titled<T: DocumentTree>(tree: &T, node: T::Node, phrases: &[&str]) -> bool {
    nearest_heading(tree, node)
        .map(|heading| {
            let label = normalize_label(&heading);
            phrases
                .iter()
                .any(|phrase| label.contains(&normalize_label(phrase)))
        })
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Whole words anywhere in the text
    Anywhere,
    /// The text's final words
    Trailing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Phrase {
    words: String,
    placement: Placement,
}

impl Phrase {
    fn matches(&self, label: &str) -> bool {
        match self.placement {
            Placement::Anywhere => format!(" {} ", label).contains(&format!(" {} ", self.words)),
            Placement::Trailing => label == self.words || label.ends_with(&format!(" {}", self.words)),
        }
    }
}

/// Report-boilerplate phrases that never name a creditor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denylist {
    phrases: Vec<Phrase>,
}

impl Default for Denylist {
    fn default() -> Self {
        let mut list = Self::new(DEFAULT_DENYLIST.iter().copied());
        list.push(TRAILING_DENYLIST.iter().copied(), Placement::Trailing);
        list
    }
}

impl Denylist {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self { phrases: Vec::new() };
        list.extend(phrases);
        list
    }

    /// Built-in phrases plus `extra`
    pub fn with_extra<S: AsRef<str>>(extra: &[S]) -> Self {
        let mut list = Self::default();
        list.extend(extra);
        list
    }

    /// Add phrases matched as whole words anywhere in a heading.
    pub fn extend<I, S>(&mut self, phrases: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.push(phrases, Placement::Anywhere);
    }

    fn push<I, S>(&mut self, phrases: I, placement: Placement)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for phrase in phrases {
            let words = normalize_label(phrase.as_ref());
            if !words.is_empty() && !self.phrases.iter().any(|p| p.words == words) {
                self.phrases.push(Phrase { words, placement });
            }
        }
    }

    /// Whole-word match on the normalized text
    pub fn matches(&self, text: &str) -> bool {
        let label = normalize_label(text);
        if label.is_empty() {
            return false;
        }
        self.phrases.iter().any(|phrase| phrase.matches(&label))
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use report_document::HtmlDocument;

    const MARKUP: &str = r#"<html><body>
        <div class="sub_header">Three Bureau Credit Report</div>
        <div class="block">
          <div class="wrap"><div class="sub_header">MIDLAND FUNDING</div></div>
          <p>filler</p>
          <table id="first"><tr><td>x</td></tr></table>
        </div>
        <div class="block">
          <div class="sub_header"></div>
          <table id="second"><tr><td>y</td></tr></table>
        </div>
        </body></html>"#;

    #[test]
    fn test_heading_from_sibling_descendant() {
        let doc = HtmlDocument::parse(MARKUP);
        let tree = doc.tree();
        let table = tree.select_all("#first")[0];
        assert_eq!(nearest_heading(&tree, table).as_deref(), Some("MIDLAND FUNDING"));
    }

    #[test]
    fn test_heading_skips_empty_and_climbs() {
        let doc = HtmlDocument::parse(MARKUP);
        let tree = doc.tree();
        let table = tree.select_all("#second")[0];
        // the empty sub_header is passed over; the previous block's heading wins
        assert_eq!(nearest_heading(&tree, table).as_deref(), Some("MIDLAND FUNDING"));
        let denylist = Denylist::default();
        let (_, text) = find_heading(&tree, table, |t| !t.contains("MIDLAND")).unwrap();
        assert!(denylist.matches(&text));
    }

    #[test]
    fn test_no_heading() {
        let doc = HtmlDocument::parse("<table id='t'><tr><td>x</td></tr></table>");
        let tree = doc.tree();
        let table = tree.select_all("#t")[0];
        assert_eq!(nearest_heading(&tree, table), None);
        assert!(!section_titled(&tree, table, &["credit score"]));
    }

    #[test]
    fn test_denylist_matching() {
        let denylist = Denylist::default();
        assert!(denylist.matches("Three Bureau Credit Report ... Reference # 12345"));
        assert!(denylist.matches("RISK FACTORS"));
        assert!(denylist.matches("Personal Information:"));
        assert!(!denylist.matches("CAPITAL ONE"));
        assert!(!denylist.matches("   "));
    }

    #[test]
    fn test_summary_only_as_last_word() {
        let denylist = Denylist::default();
        assert!(denylist.matches("Summary"));
        assert!(denylist.matches("Account Summary:"));
        assert!(denylist.matches("Credit Overview"));
        assert!(!denylist.matches("SUMMARY FEDERAL CREDIT UNION"));
        assert!(!denylist.matches("SUMMARYBANK NA"));
        assert!(!denylist.matches("OVERVIEW LENDING LLC"));
    }

    #[test]
    fn test_phrases_match_whole_words() {
        let denylist = Denylist::with_extra(&["Midland"]);
        assert!(denylist.matches("MIDLAND CREDIT MGMT"));
        assert!(!denylist.matches("MIDLANDS BANK"));
        assert!(!Denylist::default().matches("INQUIRIESCO LLC"));
    }

    #[test]
    fn test_denylist_extension() {
        let builtin = DEFAULT_DENYLIST.len() + TRAILING_DENYLIST.len();
        let denylist = Denylist::with_extra(&["Account Summary Totals", "summary"]);
        assert_eq!(denylist.len(), builtin + 1);
        assert!(denylist.matches("account summary totals"));
        assert!(Denylist::new(Vec::<String>::new()).is_empty());
    }
}
