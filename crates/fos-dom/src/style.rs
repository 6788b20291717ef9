//! Inline and computed style
//!
//! Only the properties the engine's focus and scroll handling read are
//! computed: `display`, `visibility`, `overflow-x`/`overflow-y` and
//! `position`.

use crate::{Document, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    #[default]
    Inline,
    Block,
    InlineBlock,
    Flex,
    Grid,
    Contents,
    None,
}

impl Display {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value.trim().to_ascii_lowercase().as_str() {
            "inline" => Self::Inline,
            "block" => Self::Block,
            "inline-block" => Self::InlineBlock,
            "flex" | "inline-flex" => Self::Flex,
            "grid" | "inline-grid" => Self::Grid,
            "contents" => Self::Contents,
            "none" => Self::None,
            _ => return None,
        })
    }

    fn default_for(tag: &str) -> Self {
        match tag {
            "head" | "script" | "style" | "template" | "title" | "meta" | "link" => Self::None,
            "html" | "body" | "div" | "p" | "section" | "article" | "aside" | "header" | "footer"
            | "main" | "nav" | "form" | "fieldset" | "ul" | "ol" | "li" | "dialog" | "h1" | "h2"
            | "h3" | "h4" | "h5" | "h6" => Self::Block,
            "button" | "input" | "select" | "textarea" | "img" | "video" | "audio" | "iframe" => Self::InlineBlock,
            _ => Self::Inline,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

impl Visibility {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value.trim().to_ascii_lowercase().as_str() {
            "visible" => Self::Visible,
            "hidden" => Self::Hidden,
            "collapse" => Self::Collapse,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Clip,
    Scroll,
    Auto,
}

impl Overflow {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value.trim().to_ascii_lowercase().as_str() {
            "visible" => Self::Visible,
            "hidden" => Self::Hidden,
            "clip" => Self::Clip,
            "scroll" => Self::Scroll,
            "auto" => Self::Auto,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

impl Position {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value.trim().to_ascii_lowercase().as_str() {
            "static" => Self::Static,
            "relative" => Self::Relative,
            "absolute" => Self::Absolute,
            "fixed" => Self::Fixed,
            "sticky" => Self::Sticky,
            _ => return None,
        })
    }
}

/// Resolved style for one element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComputedStyle {
    pub display: Display,
    pub visibility: Visibility,
    pub overflow_x: Overflow,
    pub overflow_y: Overflow,
    pub position: Position,
}

impl Document {
    /// Set an inline style property. Returns false if `id` is not an element.
    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) -> bool {
        match self.tree.element_mut(id) {
            Some(elem) => {
                elem.set_style(property, value);
                true
            }
            None => false,
        }
    }

    /// Remove an inline style property, returning its value
    pub fn remove_style(&mut self, id: NodeId, property: &str) -> Option<String> {
        self.tree.element_mut(id)?.remove_style(property)
    }

    /// Inline style property value
    pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.tree.element(id)?.get_style(property)
    }

    /// Compute style for an element
    pub fn computed_style(&self, id: NodeId) -> Option<ComputedStyle> {
        let elem = self.tree.element(id)?;

        let display = if elem.has_attr("hidden") || (elem.tag == "dialog" && !elem.has_attr("open")) {
            Display::None
        } else {
            elem.get_style("display")
                .and_then(Display::parse)
                .unwrap_or_else(|| Display::default_for(&elem.tag))
        };

        // visibility inherits: the nearest inclusive ancestor that sets it wins
        let visibility = std::iter::once(id)
            .chain(self.tree.ancestors(id))
            .find_map(|node| self.style(node, "visibility").and_then(Visibility::parse))
            .unwrap_or_default();

        let overflow = elem.get_style("overflow").and_then(Overflow::parse).unwrap_or_default();
        let overflow_x = elem.get_style("overflow-x").and_then(Overflow::parse).unwrap_or(overflow);
        let overflow_y = elem.get_style("overflow-y").and_then(Overflow::parse).unwrap_or(overflow);
        let position = elem.get_style("position").and_then(Position::parse).unwrap_or_default();

        Some(ComputedStyle { display, visibility, overflow_x, overflow_y, position })
    }

    /// An element generates boxes unless it or an ancestor is `display: none`
    pub fn is_rendered(&self, id: NodeId) -> bool {
        if !self.is_element(id) {
            return false;
        }
        std::iter::once(id)
            .chain(self.tree.ancestors(id))
            .filter(|&node| self.is_element(node))
            .all(|node| self.computed_style(node).is_some_and(|s| s.display != Display::None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_defaults_and_overrides() {
        let mut doc = Document::default();
        let body = doc.body();
        let div = doc.append_element(body, "div").unwrap();
        let span = doc.append_element(div, "span").unwrap();

        assert_eq!(doc.computed_style(div).unwrap().display, Display::Block);
        assert_eq!(doc.computed_style(span).unwrap().display, Display::Inline);
        assert_eq!(doc.computed_style(doc.head()).unwrap().display, Display::None);

        doc.set_style(span, "display", "flex");
        assert_eq!(doc.computed_style(span).unwrap().display, Display::Flex);

        doc.set_attribute(span, "hidden", "");
        assert_eq!(doc.computed_style(span).unwrap().display, Display::None);
    }

    #[test]
    fn test_closed_dialog_is_not_rendered() {
        let mut doc = Document::default();
        let body = doc.body();
        let dialog = doc.append_element(body, "dialog").unwrap();
        let button = doc.append_element(dialog, "button").unwrap();

        assert!(!doc.is_rendered(button));
        doc.set_attribute(dialog, "open", "");
        assert!(doc.is_rendered(button));
    }

    #[test]
    fn test_visibility_inherits() {
        let mut doc = Document::default();
        let body = doc.body();
        let outer = doc.append_element(body, "div").unwrap();
        let inner = doc.append_element(outer, "div").unwrap();

        doc.set_style(outer, "visibility", "hidden");
        assert_eq!(doc.computed_style(inner).unwrap().visibility, Visibility::Hidden);

        doc.set_style(inner, "visibility", "visible");
        assert_eq!(doc.computed_style(inner).unwrap().visibility, Visibility::Visible);
    }

    #[test]
    fn test_overflow_longhands() {
        let mut doc = Document::default();
        let body = doc.body();
        doc.set_style(body, "overflow", "hidden");
        doc.set_style(body, "overflow-x", "auto");

        let style = doc.computed_style(body).unwrap();
        assert_eq!(style.overflow_x, Overflow::Auto);
        assert_eq!(style.overflow_y, Overflow::Hidden);
    }
}
