//! Uniform tree queries over credit-report documents
//!
//! Reports reach the parser in three shapes: raw HTML markup, a JSON node
//! tree captured by a browser-side collector, or an [`ElementTree`] built in
//! memory. Each shape implements [`DocumentTree`]; extractors are written
//! once against the trait and must produce identical output for all three.

mod arena;
mod html;
mod json;
mod nav;
mod selector;

pub use arena::{ElementTree, NodeId};
pub use html::{HtmlDocument, HtmlTree};
pub use json::{JsonNode, JsonTree};

use serde_json::Value;
use std::fmt;

/// Read-only query capability shared by every document backend.
///
/// Text accessors never fail: missing nodes and attributes read as empty.
pub trait DocumentTree {
    type Node: Copy + Eq + fmt::Debug;

    /// All elements matching `selector`, in document order
    fn select_all(&self, selector: &str) -> Vec<Self::Node>;

    /// Descendants of `node` matching `selector`, in document order
    fn find(&self, node: Self::Node, selector: &str) -> Vec<Self::Node>;

    fn matches(&self, node: Self::Node, selector: &str) -> bool;

    /// Element children of `node`
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Previous element sibling
    fn previous(&self, node: Self::Node) -> Option<Self::Node>;

    /// Lowercase tag name
    fn tag(&self, node: Self::Node) -> &str;

    fn attr(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// Whitespace-collapsed, trimmed descendant text
    fn text(&self, node: Self::Node) -> String;

    /// Inner markup of `node`
    fn html(&self, node: Self::Node) -> String;

    /// Descendant text split at `<br>` elements, each line collapsed;
    /// blank lines are dropped.
    fn lines(&self, node: Self::Node) -> Vec<String>;

    fn has_attr(&self, node: Self::Node, name: &str) -> bool {
        self.attr(node, name).is_some()
    }

    fn classes(&self, node: Self::Node) -> Vec<&str> {
        self.attr(node, "class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    fn first(&self, node: Self::Node, selector: &str) -> Option<Self::Node> {
        self.find(node, selector).into_iter().next()
    }

    /// Text of `node`, or of its first descendant matching `selector`.
    /// Empty when nothing matches.
    fn text_of(&self, node: Self::Node, selector: Option<&str>) -> String {
        match selector {
            None => self.text(node),
            Some(sel) => self
                .first(node, sel)
                .map(|n| self.text(n))
                .unwrap_or_default(),
        }
    }

    /// Rows of a table: body-section rows when the table has `<tbody>`
    /// sections, otherwise every row under it.
    fn rows(&self, table: Self::Node) -> Vec<Self::Node> {
        let bodies: Vec<Self::Node> = self
            .children(table)
            .into_iter()
            .filter(|c| self.tag(*c) == "tbody")
            .collect();
        if bodies.is_empty() {
            return self.find(table, "tr");
        }
        bodies
            .into_iter()
            .flat_map(|body| self.children(body))
            .filter(|row| self.tag(*row) == "tr")
            .collect()
    }
}

/// Collapse whitespace runs (including no-break spaces) and trim.
pub(crate) fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse each raw line and drop the empty ones.
pub(crate) fn finish_lines(raw: Vec<String>) -> Vec<String> {
    raw.iter()
        .map(|line| collapse(line))
        .filter(|line| !line.is_empty())
        .collect()
}

/// Callback run against whichever backend a [`RawDocument`] resolves to.
pub trait TreeVisitor {
    type Output;

    fn visit<T: DocumentTree>(self, tree: &T) -> Self::Output;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Html,
    Json,
    Tree,
}

/// A report document in one of the supported representations
#[derive(Debug, Clone)]
pub enum RawDocument {
    Html(String),
    Json(Value),
    Tree(ElementTree),
}

impl RawDocument {
    /// JSON strings are treated as markup, anything else as a node tree.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(markup) => RawDocument::Html(markup),
            other => RawDocument::Json(other),
        }
    }

    pub fn backend(&self) -> Backend {
        match self {
            RawDocument::Html(_) => Backend::Html,
            RawDocument::Json(_) => Backend::Json,
            RawDocument::Tree(_) => Backend::Tree,
        }
    }

    /// Whether the input looks like a usable tree at all
    pub fn is_recognized(&self) -> bool {
        match self {
            RawDocument::Html(markup) => looks_like_markup(markup),
            RawDocument::Json(value) => JsonTree::new(value).is_some(),
            RawDocument::Tree(tree) => !tree.is_empty(),
        }
    }

    /// Open the document with its backend and run `visitor` against it.
    ///
    /// Returns `None` when the input cannot be recognized as any supported
    /// representation; callers turn that into an empty result.
    pub fn visit<V: TreeVisitor>(&self, visitor: V) -> Option<V::Output> {
        match self {
            RawDocument::Html(markup) => {
                if !looks_like_markup(markup) {
                    tracing::debug!("document is not markup");
                    return None;
                }
                let document = HtmlDocument::parse(markup);
                Some(visitor.visit(&document.tree()))
            }
            RawDocument::Json(value) => {
                let Some(tree) = JsonTree::new(value) else {
                    tracing::debug!("json value is not a node tree");
                    return None;
                };
                Some(visitor.visit(&tree))
            }
            RawDocument::Tree(tree) => {
                if tree.is_empty() {
                    return None;
                }
                Some(visitor.visit(tree))
            }
        }
    }
}

fn looks_like_markup(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.contains('<') && trimmed.contains('>')
}

impl From<ElementTree> for RawDocument {
    fn from(tree: ElementTree) -> Self {
        RawDocument::Tree(tree)
    }
}
