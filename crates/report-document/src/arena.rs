use crate::nav::{self, ChildRef, ElementNav};
use crate::{collapse, finish_lines, DocumentTree};

/// Element handle into an [`ElementTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
enum Child {
    Element(NodeId),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    parent: Option<NodeId>,
    children: Vec<Child>,
}

/// Owned, in-memory element tree
///
/// Built bottom-up by callers (tests, converters from other DOMs):
///
/// ```
/// use report_document::ElementTree;
///
/// let mut tree = ElementTree::new();
/// let table = tree.add_element(None, "table", &[("class", "rpt_table4column")]);
/// let row = tree.add_element(Some(table), "tr", &[]);
/// let cell = tree.add_element(Some(row), "td", &[("class", "label")]);
/// tree.add_text(cell, "Balance:");
/// assert_eq!(tree.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementTree {
    nodes: Vec<Element>,
    roots: Vec<NodeId>,
}

impl ElementTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element under `parent`, or as a new root.
    pub fn add_element(
        &mut self,
        parent: Option<NodeId>,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Element {
            tag: tag.trim().to_ascii_lowercase(),
            attrs: attrs
                .iter()
                .map(|(n, v)| (n.to_ascii_lowercase(), (*v).to_string()))
                .collect(),
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.nodes[p.0].children.push(Child::Element(id)),
            None => self.roots.push(id),
        }
        id
    }

    pub fn add_text(&mut self, parent: NodeId, text: &str) {
        self.nodes[parent.0]
            .children
            .push(Child::Text(text.to_string()));
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        let attrs = &mut self.nodes[node.0].attrs;
        match attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => attrs.push((name, value.to_string())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

impl ElementNav for ElementTree {
    type Id = NodeId;

    fn roots(&self) -> Vec<NodeId> {
        self.roots.clone()
    }

    fn tag_name(&self, id: NodeId) -> &str {
        &self.nodes[id.0].tag
    }

    fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes[id.0]
            .attrs
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn attributes(&self, id: NodeId) -> Vec<(&str, &str)> {
        self.nodes[id.0]
            .attrs
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_str()))
            .collect()
    }

    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    fn child_nodes(&self, id: NodeId) -> Vec<ChildRef<'_, NodeId>> {
        self.nodes[id.0]
            .children
            .iter()
            .map(|child| match child {
                Child::Element(el) => ChildRef::Element(*el),
                Child::Text(text) => ChildRef::Text(text.as_str()),
            })
            .collect()
    }
}

impl DocumentTree for ElementTree {
    type Node = NodeId;

    fn select_all(&self, selector: &str) -> Vec<NodeId> {
        nav::select_all(self, selector)
    }

    fn find(&self, node: NodeId, selector: &str) -> Vec<NodeId> {
        nav::find(self, node, selector)
    }

    fn matches(&self, node: NodeId, selector: &str) -> bool {
        nav::matches(self, node, selector)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        nav::element_children(self, node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parent_of(node)
    }

    fn previous(&self, node: NodeId) -> Option<NodeId> {
        nav::previous_element(self, node)
    }

    fn tag(&self, node: NodeId) -> &str {
        self.tag_name(node)
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.attribute(node, name)
    }

    fn text(&self, node: NodeId) -> String {
        let mut out = String::new();
        nav::raw_text(self, node, &mut out);
        collapse(&out)
    }

    fn html(&self, node: NodeId) -> String {
        nav::inner_html(self, node)
    }

    fn lines(&self, node: NodeId) -> Vec<String> {
        let mut lines = vec![String::new()];
        nav::raw_lines(self, node, &mut lines);
        finish_lines(lines)
    }
}
