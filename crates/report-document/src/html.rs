use scraper::{ElementRef, Html, Node, Selector};

use crate::{collapse, finish_lines, DocumentTree};

/// Markup parsed with html5ever (via `scraper`)
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    pub fn tree(&self) -> HtmlTree<'_> {
        HtmlTree { html: &self.html }
    }
}

#[derive(Clone, Copy)]
pub struct HtmlTree<'a> {
    html: &'a Html,
}

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::trace!(selector, "unsupported selector");
            None
        }
    }
}

impl<'a> DocumentTree for HtmlTree<'a> {
    type Node = ElementRef<'a>;

    fn select_all(&self, selector: &str) -> Vec<ElementRef<'a>> {
        match parse_selector(selector) {
            Some(sel) => self.html.select(&sel).collect(),
            None => Vec::new(),
        }
    }

    fn find(&self, node: ElementRef<'a>, selector: &str) -> Vec<ElementRef<'a>> {
        match parse_selector(selector) {
            Some(sel) => node.select(&sel).collect(),
            None => Vec::new(),
        }
    }

    fn matches(&self, node: ElementRef<'a>, selector: &str) -> bool {
        parse_selector(selector).map_or(false, |sel| sel.matches(&node))
    }

    fn children(&self, node: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        node.children().filter_map(ElementRef::wrap).collect()
    }

    fn parent(&self, node: ElementRef<'a>) -> Option<ElementRef<'a>> {
        node.parent().and_then(ElementRef::wrap)
    }

    fn previous(&self, node: ElementRef<'a>) -> Option<ElementRef<'a>> {
        node.prev_siblings().find_map(ElementRef::wrap)
    }

    fn tag(&self, node: ElementRef<'a>) -> &str {
        node.value().name()
    }

    fn attr(&self, node: ElementRef<'a>, name: &str) -> Option<&str> {
        node.value().attr(name)
    }

    fn text(&self, node: ElementRef<'a>) -> String {
        let mut out = String::new();
        for descendant in node.descendants() {
            match descendant.value() {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) if el.name() == "br" => out.push(' '),
                _ => {}
            }
        }
        collapse(&out)
    }

    fn html(&self, node: ElementRef<'a>) -> String {
        node.inner_html()
    }

    fn lines(&self, node: ElementRef<'a>) -> Vec<String> {
        let mut lines = vec![String::new()];
        for descendant in node.descendants() {
            match descendant.value() {
                Node::Text(text) => {
                    if let Some(line) = lines.last_mut() {
                        line.push_str(text);
                    }
                }
                Node::Element(el) if el.name() == "br" => lines.push(String::new()),
                _ => {}
            }
        }
        finish_lines(lines)
    }
}
