//! JSON node trees
//!
//! Accepted shape, per element:
//!
//! ```json
//! {"tag": "td", "attrs": {"class": "info"}, "children": ["$0", {"tag": "br"}]}
//! ```
//!
//! `name` is accepted for `tag` and `attributes` for `attrs`. Text children
//! are plain strings or `{"text": "..."}` objects. The root may be a single
//! element, an array of elements, or a wrapper object with only `children`.

use serde_json::{Map, Value};

use crate::nav::{self, ChildRef, ElementNav};
use crate::{collapse, finish_lines, DocumentTree};

/// Element handle into a [`JsonTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JsonNode(usize);

enum JsonChild<'a> {
    Element(usize),
    Text(&'a str),
}

struct JsonEntry<'a> {
    tag: String,
    attrs: Vec<(String, String)>,
    parent: Option<usize>,
    children: Vec<JsonChild<'a>>,
}

/// Index over a borrowed `serde_json::Value` node tree
pub struct JsonTree<'a> {
    entries: Vec<JsonEntry<'a>>,
    roots: Vec<usize>,
}

fn element_tag(obj: &Map<String, Value>) -> Option<&str> {
    obj.get("tag")
        .or_else(|| obj.get("name"))
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
}

impl<'a> JsonTree<'a> {
    /// Index `root`; `None` if it contains no elements.
    pub fn new(root: &'a Value) -> Option<Self> {
        let mut tree = JsonTree {
            entries: Vec::new(),
            roots: Vec::new(),
        };
        let top: Vec<&'a Value> = match root {
            Value::Array(items) => items.iter().collect(),
            Value::Object(obj) if element_tag(obj).is_some() => vec![root],
            Value::Object(obj) => match obj.get("children") {
                Some(Value::Array(items)) => items.iter().collect(),
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        for value in top {
            if let Some(idx) = tree.index(value, None) {
                tree.roots.push(idx);
            }
        }
        if tree.entries.is_empty() {
            None
        } else {
            Some(tree)
        }
    }

    fn index(&mut self, value: &'a Value, parent: Option<usize>) -> Option<usize> {
        let obj = value.as_object()?;
        let tag = element_tag(obj)?.trim().to_ascii_lowercase();
        let attrs = obj
            .get("attrs")
            .or_else(|| obj.get("attributes"))
            .and_then(Value::as_object)
            .map(|attrs| {
                attrs
                    .iter()
                    .filter_map(|(name, value)| {
                        let value = match value {
                            Value::String(s) => s.clone(),
                            Value::Number(n) => n.to_string(),
                            Value::Bool(b) => b.to_string(),
                            _ => return None,
                        };
                        Some((name.to_ascii_lowercase(), value))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let idx = self.entries.len();
        self.entries.push(JsonEntry {
            tag,
            attrs,
            parent,
            children: Vec::new(),
        });

        if let Some(Value::Array(children)) = obj.get("children") {
            for child in children {
                let entry = match child {
                    Value::String(text) => Some(JsonChild::Text(text.as_str())),
                    Value::Object(c) if element_tag(c).is_none() => c
                        .get("text")
                        .and_then(Value::as_str)
                        .map(JsonChild::Text),
                    Value::Object(_) => self.index(child, Some(idx)).map(JsonChild::Element),
                    _ => None,
                };
                if let Some(entry) = entry {
                    self.entries[idx].children.push(entry);
                }
            }
        }
        Some(idx)
    }
}

impl ElementNav for JsonTree<'_> {
    type Id = usize;

    fn roots(&self) -> Vec<usize> {
        self.roots.clone()
    }

    fn tag_name(&self, id: usize) -> &str {
        &self.entries[id].tag
    }

    fn attribute(&self, id: usize, name: &str) -> Option<&str> {
        self.entries[id]
            .attrs
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn attributes(&self, id: usize) -> Vec<(&str, &str)> {
        self.entries[id]
            .attrs
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_str()))
            .collect()
    }

    fn parent_of(&self, id: usize) -> Option<usize> {
        self.entries[id].parent
    }

    fn child_nodes(&self, id: usize) -> Vec<ChildRef<'_, usize>> {
        self.entries[id]
            .children
            .iter()
            .map(|child| match child {
                JsonChild::Element(idx) => ChildRef::Element(*idx),
                JsonChild::Text(text) => ChildRef::Text(text),
            })
            .collect()
    }
}

fn wrap(ids: Vec<usize>) -> Vec<JsonNode> {
    ids.into_iter().map(JsonNode).collect()
}

impl DocumentTree for JsonTree<'_> {
    type Node = JsonNode;

    fn select_all(&self, selector: &str) -> Vec<JsonNode> {
        wrap(nav::select_all(self, selector))
    }

    fn find(&self, node: JsonNode, selector: &str) -> Vec<JsonNode> {
        wrap(nav::find(self, node.0, selector))
    }

    fn matches(&self, node: JsonNode, selector: &str) -> bool {
        nav::matches(self, node.0, selector)
    }

    fn children(&self, node: JsonNode) -> Vec<JsonNode> {
        wrap(nav::element_children(self, node.0))
    }

    fn parent(&self, node: JsonNode) -> Option<JsonNode> {
        self.parent_of(node.0).map(JsonNode)
    }

    fn previous(&self, node: JsonNode) -> Option<JsonNode> {
        nav::previous_element(self, node.0).map(JsonNode)
    }

    fn tag(&self, node: JsonNode) -> &str {
        self.tag_name(node.0)
    }

    fn attr(&self, node: JsonNode, name: &str) -> Option<&str> {
        self.attribute(node.0, name)
    }

    fn text(&self, node: JsonNode) -> String {
        let mut out = String::new();
        nav::raw_text(self, node.0, &mut out);
        collapse(&out)
    }

    fn html(&self, node: JsonNode) -> String {
        nav::inner_html(self, node.0)
    }

    fn lines(&self, node: JsonNode) -> Vec<String> {
        let mut lines = vec![String::new()];
        nav::raw_lines(self, node.0, &mut lines);
        finish_lines(lines)
    }
}
