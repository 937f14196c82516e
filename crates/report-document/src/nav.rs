//! Shared traversal for the backends that do not come with their own DOM
//! (JSON node trees and the owned arena). Both expose the same low-level
//! navigation and get selection, text and markup serialization from here,
//! so their behavior cannot drift apart.

use crate::selector::SelectorList;

/// A child of an element: another element or a run of text
pub(crate) enum ChildRef<'a, Id> {
    Element(Id),
    Text(&'a str),
}

pub(crate) trait ElementNav {
    type Id: Copy + Eq;

    fn roots(&self) -> Vec<Self::Id>;
    fn tag_name(&self, id: Self::Id) -> &str;
    fn attribute(&self, id: Self::Id, name: &str) -> Option<&str>;
    fn attributes(&self, id: Self::Id) -> Vec<(&str, &str)>;
    fn parent_of(&self, id: Self::Id) -> Option<Self::Id>;
    fn child_nodes(&self, id: Self::Id) -> Vec<ChildRef<'_, Self::Id>>;
}

pub(crate) fn element_children<N: ElementNav>(nav: &N, id: N::Id) -> Vec<N::Id> {
    nav.child_nodes(id)
        .into_iter()
        .filter_map(|child| match child {
            ChildRef::Element(el) => Some(el),
            ChildRef::Text(_) => None,
        })
        .collect()
}

/// Descendants of `id` in document order, excluding `id` itself.
pub(crate) fn descendants<N: ElementNav>(nav: &N, id: N::Id) -> Vec<N::Id> {
    let mut out = Vec::new();
    let mut stack: Vec<N::Id> = element_children(nav, id).into_iter().rev().collect();
    while let Some(next) = stack.pop() {
        out.push(next);
        stack.extend(element_children(nav, next).into_iter().rev());
    }
    out
}

/// Every element in document order.
pub(crate) fn document_order<N: ElementNav>(nav: &N) -> Vec<N::Id> {
    let mut out = Vec::new();
    for root in nav.roots() {
        out.push(root);
        out.extend(descendants(nav, root));
    }
    out
}

pub(crate) fn select_all<N: ElementNav>(nav: &N, selector: &str) -> Vec<N::Id> {
    let Some(list) = SelectorList::parse(selector) else {
        tracing::trace!(selector, "unsupported selector");
        return Vec::new();
    };
    document_order(nav)
        .into_iter()
        .filter(|id| list.matches(nav, *id))
        .collect()
}

pub(crate) fn find<N: ElementNav>(nav: &N, id: N::Id, selector: &str) -> Vec<N::Id> {
    let Some(list) = SelectorList::parse(selector) else {
        return Vec::new();
    };
    descendants(nav, id)
        .into_iter()
        .filter(|el| list.matches(nav, *el))
        .collect()
}

pub(crate) fn matches<N: ElementNav>(nav: &N, id: N::Id, selector: &str) -> bool {
    SelectorList::parse(selector).map_or(false, |list| list.matches(nav, id))
}

pub(crate) fn previous_element<N: ElementNav>(nav: &N, id: N::Id) -> Option<N::Id> {
    let siblings = match nav.parent_of(id) {
        Some(parent) => element_children(nav, parent),
        None => nav.roots(),
    };
    let pos = siblings.iter().position(|s| *s == id)?;
    pos.checked_sub(1).map(|p| siblings[p])
}

/// Concatenated descendant text with `<br>` treated as a space.
pub(crate) fn raw_text<N: ElementNav>(nav: &N, id: N::Id, out: &mut String) {
    for child in nav.child_nodes(id) {
        match child {
            ChildRef::Text(text) => out.push_str(text),
            ChildRef::Element(el) => {
                if nav.tag_name(el).eq_ignore_ascii_case("br") {
                    out.push(' ');
                } else {
                    raw_text(nav, el, out);
                }
            }
        }
    }
}

/// Descendant text as lines; each `<br>` starts a new one.
pub(crate) fn raw_lines<N: ElementNav>(nav: &N, id: N::Id, lines: &mut Vec<String>) {
    for child in nav.child_nodes(id) {
        match child {
            ChildRef::Text(text) => {
                if let Some(line) = lines.last_mut() {
                    line.push_str(text);
                }
            }
            ChildRef::Element(el) => {
                if nav.tag_name(el).eq_ignore_ascii_case("br") {
                    lines.push(String::new());
                } else {
                    raw_lines(nav, el, lines);
                }
            }
        }
    }
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

pub(crate) fn inner_html<N: ElementNav>(nav: &N, id: N::Id) -> String {
    let mut out = String::new();
    write_children(nav, id, &mut out);
    out
}

fn write_children<N: ElementNav>(nav: &N, id: N::Id, out: &mut String) {
    for child in nav.child_nodes(id) {
        match child {
            ChildRef::Text(text) => escape_into(text, false, out),
            ChildRef::Element(el) => {
                let tag = nav.tag_name(el);
                out.push('<');
                out.push_str(tag);
                for (name, value) in nav.attributes(el) {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(value, true, out);
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag) {
                    continue;
                }
                write_children(nav, el, out);
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}
