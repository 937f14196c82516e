//! Minimal CSS selector engine for the JSON and arena backends
//!
//! Supports type/universal selectors, `.class`, `#id`, attribute selectors
//! (`[a]`, `[a=v]`, `[a*=v]`, `[a^=v]`, `[a$=v]`, `[a~=v]`), descendant and
//! child combinators, and comma-separated groups. This is the subset the
//! extractors use; `scraper` handles the same subset natively for HTML.

use crate::nav::ElementNav;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SelectorList {
    groups: Vec<Complex>,
}

#[derive(Debug, Clone, PartialEq)]
struct Complex {
    compounds: Vec<Compound>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

#[derive(Debug, Clone, PartialEq)]
struct AttrMatch {
    name: String,
    op: AttrOp,
    value: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AttrOp {
    Exists,
    Equals,
    Contains,
    Prefix,
    Suffix,
    Includes,
}

impl SelectorList {
    /// Parse a selector list; `None` for anything outside the supported subset.
    pub(crate) fn parse(input: &str) -> Option<SelectorList> {
        let groups = split_groups(input)?
            .into_iter()
            .map(|group| parse_complex(group.trim()))
            .collect::<Option<Vec<_>>>()?;
        if groups.is_empty() {
            return None;
        }
        Some(SelectorList { groups })
    }

    pub(crate) fn matches<N: ElementNav>(&self, nav: &N, id: N::Id) -> bool {
        self.groups.iter().any(|complex| {
            let last = complex.compounds.len() - 1;
            matches_from(nav, complex, last, id)
        })
    }
}

fn matches_from<N: ElementNav>(nav: &N, complex: &Complex, idx: usize, id: N::Id) -> bool {
    if !complex.compounds[idx].matches(nav, id) {
        return false;
    }
    if idx == 0 {
        return true;
    }
    match complex.combinators[idx - 1] {
        Combinator::Child => nav
            .parent_of(id)
            .map_or(false, |parent| matches_from(nav, complex, idx - 1, parent)),
        Combinator::Descendant => {
            let mut current = nav.parent_of(id);
            while let Some(ancestor) = current {
                if matches_from(nav, complex, idx - 1, ancestor) {
                    return true;
                }
                current = nav.parent_of(ancestor);
            }
            false
        }
    }
}

impl Compound {
    fn matches<N: ElementNav>(&self, nav: &N, id: N::Id) -> bool {
        if let Some(tag) = &self.tag {
            if !nav.tag_name(id).eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if !self.ids.is_empty() {
            let own = nav.attribute(id, "id").unwrap_or("");
            if self.ids.iter().any(|wanted| wanted != own) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class_attr = nav.attribute(id, "class").unwrap_or("");
            let own: Vec<&str> = class_attr.split_whitespace().collect();
            if !self.classes.iter().all(|c| own.contains(&c.as_str())) {
                return false;
            }
        }
        self.attrs.iter().all(|attr| attr.matches(nav.attribute(id, &attr.name)))
    }
}

impl AttrMatch {
    fn matches(&self, actual: Option<&str>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        match self.op {
            AttrOp::Exists => true,
            AttrOp::Equals => actual == self.value,
            AttrOp::Contains => !self.value.is_empty() && actual.contains(&self.value),
            AttrOp::Prefix => !self.value.is_empty() && actual.starts_with(&self.value),
            AttrOp::Suffix => !self.value.is_empty() && actual.ends_with(&self.value),
            AttrOp::Includes => actual.split_whitespace().any(|w| w == self.value),
        }
    }
}

/// Split on top-level commas (ignoring commas inside brackets or quotes).
fn split_groups(input: &str) -> Option<Vec<&str>> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, ch) in input.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.checked_sub(1)?,
            (None, ',') if depth == 0 => {
                groups.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if quote.is_some() || depth != 0 {
        return None;
    }
    groups.push(&input[start..]);
    if groups.iter().any(|g| g.trim().is_empty()) {
        return None;
    }
    Some(groups)
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

fn parse_complex(input: &str) -> Option<Complex> {
    let chars: Vec<char> = input.chars().collect();
    let mut pos = 0;
    let mut compounds = Vec::new();
    let mut combinators = Vec::new();
    let mut pending: Option<Combinator> = None;

    while pos < chars.len() {
        let ch = chars[pos];
        if ch.is_whitespace() {
            if !compounds.is_empty() && pending.is_none() {
                pending = Some(Combinator::Descendant);
            }
            pos += 1;
            continue;
        }
        if ch == '>' {
            if compounds.is_empty() {
                return None;
            }
            pending = Some(Combinator::Child);
            pos += 1;
            continue;
        }

        let (compound, next) = parse_compound(&chars, pos)?;
        if !compounds.is_empty() {
            combinators.push(pending.take()?);
        }
        pending = None;
        compounds.push(compound);
        pos = next;
    }

    if compounds.is_empty() || pending == Some(Combinator::Child) {
        return None;
    }
    Some(Complex {
        compounds,
        combinators,
    })
}

fn read_ident(chars: &[char], mut pos: usize) -> (String, usize) {
    let start = pos;
    while pos < chars.len() && is_ident_char(chars[pos]) {
        pos += 1;
    }
    (chars[start..pos].iter().collect(), pos)
}

fn parse_compound(chars: &[char], mut pos: usize) -> Option<(Compound, usize)> {
    let mut compound = Compound::default();
    let start = pos;

    if chars[pos] == '*' {
        pos += 1;
    } else if is_ident_char(chars[pos]) {
        let (tag, next) = read_ident(chars, pos);
        compound.tag = Some(tag.to_ascii_lowercase());
        pos = next;
    }

    while pos < chars.len() {
        match chars[pos] {
            '.' | '#' => {
                let (name, next) = read_ident(chars, pos + 1);
                if name.is_empty() {
                    return None;
                }
                if chars[pos] == '.' {
                    compound.classes.push(name);
                } else {
                    compound.ids.push(name);
                }
                pos = next;
            }
            '[' => {
                let (attr, next) = parse_attr(chars, pos + 1)?;
                compound.attrs.push(attr);
                pos = next;
            }
            c if c.is_whitespace() || c == '>' => break,
            _ => return None,
        }
    }

    if pos == start {
        return None;
    }
    Some((compound, pos))
}

fn parse_attr(chars: &[char], pos: usize) -> Option<(AttrMatch, usize)> {
    let mut pos = skip_ws(chars, pos);
    let (name, next) = read_ident(chars, pos);
    if name.is_empty() {
        return None;
    }
    pos = skip_ws(chars, next);

    let op = match *chars.get(pos)? {
        ']' => {
            return Some((
                AttrMatch {
                    name: name.to_ascii_lowercase(),
                    op: AttrOp::Exists,
                    value: String::new(),
                },
                pos + 1,
            ))
        }
        '=' => {
            pos += 1;
            AttrOp::Equals
        }
        c @ ('*' | '^' | '$' | '~') => {
            if chars.get(pos + 1) != Some(&'=') {
                return None;
            }
            pos += 2;
            match c {
                '*' => AttrOp::Contains,
                '^' => AttrOp::Prefix,
                '$' => AttrOp::Suffix,
                _ => AttrOp::Includes,
            }
        }
        _ => return None,
    };

    pos = skip_ws(chars, pos);
    let value = match *chars.get(pos)? {
        q @ ('"' | '\'') => {
            let close = chars[pos + 1..].iter().position(|c| *c == q)? + pos + 1;
            let value: String = chars[pos + 1..close].iter().collect();
            pos = close + 1;
            value
        }
        _ => {
            let (value, next) = read_ident(chars, pos);
            if value.is_empty() {
                return None;
            }
            pos = next;
            value
        }
    };

    pos = skip_ws(chars, pos);
    if chars.get(pos) != Some(&']') {
        return None;
    }
    Some((
        AttrMatch {
            name: name.to_ascii_lowercase(),
            op,
            value,
        },
        pos + 1,
    ))
}

fn skip_ws(chars: &[char], mut pos: usize) -> usize {
    while pos < chars.len() && chars[pos].is_whitespace() {
        pos += 1;
    }
    pos
}
