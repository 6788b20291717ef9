//! Element Query and Methods
//!
//! querySelectorAll, closest, matches over compound selector lists.
//!
//! Supported grammar: a comma-separated list of compound selectors, each
//! made of `*`, a tag name, `#id`, `.class`, `[attr]` and `[attr=value]`.
//! Combinators are not supported.

use std::str::FromStr;

use crate::{Document, DomError, DomResult, NodeId};
use crate::node::ElementData;

/// Simple selector for matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    Universal,
    Tag(String),
    Id(String),
    Class(String),
    Attribute { name: String, value: Option<String> },
}

impl SimpleSelector {
    pub fn matches(&self, element: &ElementData) -> bool {
        match self {
            Self::Universal => true,
            Self::Tag(tag) => element.tag.eq_ignore_ascii_case(tag),
            Self::Id(id) => element.get_attr("id") == Some(id.as_str()),
            Self::Class(class) => element.has_class(class),
            Self::Attribute { name, value: None } => element.has_attr(name),
            Self::Attribute { name, value: Some(value) } => element.get_attr(name) == Some(value.as_str()),
        }
    }
}

/// Sequence of simple selectors that must all match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    parts: Vec<SimpleSelector>,
}

impl CompoundSelector {
    /// Parse a compound selector string
    pub fn parse(s: &str) -> DomResult<Self> {
        let source = s.trim();
        if source.is_empty() {
            return Err(DomError::Syntax(s.to_string()));
        }

        let syntax_error = || DomError::Syntax(source.to_string());
        let mut parts = Vec::new();
        let mut rest = source;

        while let Some(first) = rest.chars().next() {
            match first {
                '*' => {
                    parts.push(SimpleSelector::Universal);
                    rest = &rest[1..];
                }
                '#' | '.' => {
                    let (ident, tail) = split_ident(&rest[1..]);
                    if ident.is_empty() {
                        return Err(syntax_error());
                    }
                    parts.push(if first == '#' {
                        SimpleSelector::Id(ident.to_string())
                    } else {
                        SimpleSelector::Class(ident.to_string())
                    });
                    rest = tail;
                }
                '[' => {
                    let end = rest.find(']').ok_or_else(syntax_error)?;
                    parts.push(parse_attribute(&rest[1..end]).ok_or_else(syntax_error)?);
                    rest = &rest[end + 1..];
                }
                c if is_ident_char(c) => {
                    let (ident, tail) = split_ident(rest);
                    parts.push(SimpleSelector::Tag(ident.to_ascii_lowercase()));
                    rest = tail;
                }
                _ => return Err(syntax_error()),
            }
        }

        Ok(Self { parts })
    }

    pub fn matches(&self, element: &ElementData) -> bool {
        self.parts.iter().all(|part| part.matches(element))
    }

    pub fn parts(&self) -> &[SimpleSelector] {
        &self.parts
    }
}

/// Comma-separated selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<CompoundSelector>,
    source: String,
}

impl SelectorList {
    pub fn parse(s: &str) -> DomResult<Self> {
        let selectors = s.split(',')
            .map(CompoundSelector::parse)
            .collect::<DomResult<Vec<_>>>()?;
        Ok(Self { selectors, source: s.trim().to_string() })
    }

    pub fn matches(&self, element: &ElementData) -> bool {
        self.selectors.iter().any(|sel| sel.matches(element))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

impl FromStr for SelectorList {
    type Err = DomError;

    fn from_str(s: &str) -> DomResult<Self> {
        Self::parse(s)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn split_ident(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !is_ident_char(c)).unwrap_or(s.len());
    s.split_at(end)
}

fn parse_attribute(inner: &str) -> Option<SimpleSelector> {
    let (name, value) = match inner.split_once('=') {
        Some((name, value)) => {
            let value = value.trim();
            let unquoted = value
                .strip_prefix('"').and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            (name.trim(), Some(unquoted.to_string()))
        }
        None => (inner.trim(), None),
    };

    if name.is_empty() || !name.chars().all(is_ident_char) {
        return None;
    }
    Some(SimpleSelector::Attribute { name: name.to_ascii_lowercase(), value })
}

impl Document {
    /// All descendants of `root` (excluding `root`) matching `selectors`
    pub fn query_selector_all(&self, root: NodeId, selectors: &SelectorList) -> Vec<NodeId> {
        self.tree
            .descendants(root)
            .filter(|&node| self.matches(node, selectors))
            .collect()
    }

    /// First descendant of `root` matching `selectors`
    pub fn query_selector(&self, root: NodeId, selectors: &SelectorList) -> Option<NodeId> {
        self.tree
            .descendants(root)
            .find(|&node| self.matches(node, selectors))
    }

    /// Check if element matches selector
    pub fn matches(&self, element: NodeId, selectors: &SelectorList) -> bool {
        self.tree.element(element).is_some_and(|e| selectors.matches(e))
    }

    /// Find the closest inclusive ancestor matching `selectors`
    pub fn closest(&self, element: NodeId, selectors: &SelectorList) -> Option<NodeId> {
        std::iter::once(element)
            .chain(self.tree.ancestors(element))
            .find(|&node| self.matches(node, selectors))
    }
}
