//! Builds the JSON and in-memory tree forms of an HTML fixture so a single
//! report can be parsed through every backend.

#![allow(dead_code)]

use report_document::{ElementTree, NodeId, RawDocument};
use scraper::{ElementRef, Html, Node};
use serde_json::{json, Map, Value};

fn root(markup: &str) -> Html {
    Html::parse_document(markup)
}

pub fn to_json(markup: &str) -> Value {
    let html = root(markup);
    element_json(html.root_element())
}

fn element_json(el: ElementRef<'_>) -> Value {
    let attrs: Map<String, Value> = el
        .value()
        .attrs()
        .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
        .collect();
    let children: Vec<Value> = el
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => Some(Value::String(text.to_string())),
            Node::Element(_) => ElementRef::wrap(child).map(element_json),
            _ => None,
        })
        .collect();
    json!({"tag": el.value().name(), "attrs": attrs, "children": children})
}

pub fn to_tree(markup: &str) -> ElementTree {
    let html = root(markup);
    let mut tree = ElementTree::new();
    copy_element(&mut tree, None, html.root_element());
    tree
}

fn copy_element(tree: &mut ElementTree, parent: Option<NodeId>, el: ElementRef<'_>) {
    let attrs: Vec<(&str, &str)> = el.value().attrs().collect();
    let id = tree.add_element(parent, el.value().name(), &attrs);
    for child in el.children() {
        match child.value() {
            Node::Text(text) => tree.add_text(id, text),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    copy_element(tree, Some(id), child_el);
                }
            }
            _ => {}
        }
    }
}

/// The same report as markup, JSON node tree and in-memory tree
pub fn all_backends(markup: &str) -> [(&'static str, RawDocument); 3] {
    [
        ("html", RawDocument::Html(markup.to_string())),
        ("json", RawDocument::Json(to_json(markup))),
        ("tree", RawDocument::Tree(to_tree(markup))),
    ]
}
