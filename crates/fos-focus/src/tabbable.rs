//! Tabbable classification
//!
//! "Focusable" elements accept `focus()`; "tabbable" elements are also
//! reached by sequential Tab navigation. Classification reads live
//! attributes, style and ancestry, so results are never cached.

use fos_dom::{Document, NodeId};

use crate::visibility::{is_element_in_dom, is_element_visible, is_hidden};

/// Parsed `tabindex` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabIndex {
    /// Negative: focusable by script or click, skipped by Tab
    Programmatic(i32),
    /// Zero or positive: part of the sequential order
    Sequential(i32),
}

impl TabIndex {
    /// Parse an attribute value; non-integers are ignored like in HTML
    pub fn parse(value: &str) -> Option<Self> {
        let n = value.trim().parse::<i32>().ok()?;
        Some(if n < 0 { Self::Programmatic(n) } else { Self::Sequential(n) })
    }

    pub fn value(self) -> i32 {
        match self {
            Self::Programmatic(n) | Self::Sequential(n) => n,
        }
    }

    pub fn is_sequential(self) -> bool {
        matches!(self, Self::Sequential(_))
    }
}

/// Explicit `tabindex`, if present and well-formed
pub fn explicit_tab_index(doc: &Document, element: NodeId) -> Option<TabIndex> {
    doc.get_attribute(element, "tabindex").and_then(TabIndex::parse)
}

/// Effective tab index: the explicit value, else 0 for natively focusable
/// elements and -1 for everything else
pub fn tab_index(doc: &Document, element: NodeId) -> i32 {
    match explicit_tab_index(doc, element) {
        Some(index) => index.value(),
        None if is_natively_focusable(doc, element) => 0,
        None => -1,
    }
}

/// Can receive focus by any means
pub fn is_focusable(doc: &Document, element: Option<NodeId>) -> bool {
    let Some(element) = element else {
        return false;
    };
    is_structurally_focusable(doc, element)
        && !is_hidden(doc, element, None)
        && is_element_visible(doc, element)
}

/// Reached by sequential Tab navigation
pub fn is_tabbable(doc: &Document, element: Option<NodeId>) -> bool {
    is_focusable(doc, element) && element.is_some_and(|el| tab_index(doc, el) >= 0)
}

/// Focusability from attributes and ancestry alone (no layout)
pub(crate) fn is_structurally_focusable(doc: &Document, element: NodeId) -> bool {
    if !is_element_in_dom(doc, Some(element)) || is_inert(doc, element) || doc.is_disabled_control(element) {
        return false;
    }
    if is_hidden_input(doc, element) {
        return false;
    }
    explicit_tab_index(doc, element).is_some() || is_natively_focusable(doc, element)
}

pub(crate) fn is_structurally_tabbable(doc: &Document, element: NodeId) -> bool {
    is_structurally_focusable(doc, element) && tab_index(doc, element) >= 0
}

fn is_natively_focusable(doc: &Document, element: NodeId) -> bool {
    match doc.tag_name(element) {
        Some("a" | "area") => doc.has_attribute(element, "href"),
        Some("button" | "select" | "textarea" | "iframe" | "summary") => true,
        Some("input") => !is_hidden_input(doc, element),
        Some("audio" | "video") => doc.has_attribute(element, "controls"),
        Some(_) => is_content_editable(doc, element),
        None => false,
    }
}

fn is_hidden_input(doc: &Document, element: NodeId) -> bool {
    doc.tag_name(element) == Some("input")
        && doc.get_attribute(element, "type").is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
}

fn is_content_editable(doc: &Document, element: NodeId) -> bool {
    matches!(
        doc.get_attribute(element, "contenteditable").map(str::to_ascii_lowercase).as_deref(),
        Some("" | "true" | "plaintext-only")
    )
}

fn is_inert(doc: &Document, element: NodeId) -> bool {
    std::iter::once(element)
        .chain(doc.tree().ancestors(element))
        .any(|node| doc.has_attribute(node, "inert"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_dom::DOMRect;

    fn doc_with(tag: &str) -> (Document, NodeId) {
        let mut doc = Document::default();
        let body = doc.body();
        let el = doc.append_element(body, tag).unwrap();
        (doc, el)
    }

    #[test]
    fn test_tab_index_parse() {
        assert_eq!(TabIndex::parse("-1"), Some(TabIndex::Programmatic(-1)));
        assert_eq!(TabIndex::parse(" 0 "), Some(TabIndex::Sequential(0)));
        assert!(TabIndex::parse("5").unwrap().is_sequential());
        assert_eq!(TabIndex::parse("abc"), None);
    }

    #[test]
    fn test_native_controls_are_tabbable() {
        for tag in ["button", "input", "select", "textarea"] {
            let (doc, el) = doc_with(tag);
            assert!(is_tabbable(&doc, Some(el)), "{tag} should be tabbable");
        }
        assert!(!is_tabbable(&Document::default(), None));
    }

    #[test]
    fn test_negative_tabindex_is_focusable_only() {
        let (mut doc, el) = doc_with("div");
        assert!(!is_focusable(&doc, Some(el)));

        doc.set_attribute(el, "tabindex", "-1");
        assert!(is_focusable(&doc, Some(el)));
        assert!(!is_tabbable(&doc, Some(el)));
    }

    #[test]
    fn test_disabled_controls() {
        for tag in ["button", "input", "select", "textarea"] {
            let (mut doc, el) = doc_with(tag);
            doc.set_attribute(el, "disabled", "");
            assert!(!is_tabbable(&doc, Some(el)), "disabled {tag}");
        }
    }

    #[test]
    fn test_disabled_fieldset_spares_first_legend() {
        let mut doc = Document::default();
        let body = doc.body();
        let fieldset = doc.append_element(body, "fieldset").unwrap();
        doc.set_attribute(fieldset, "disabled", "");
        let legend = doc.append_element(fieldset, "legend").unwrap();
        let in_legend = doc.append_element(legend, "button").unwrap();
        let outside_legend = doc.append_element(fieldset, "input").unwrap();

        assert!(is_tabbable(&doc, Some(in_legend)));
        assert!(!is_tabbable(&doc, Some(outside_legend)));
    }

    #[test]
    fn test_hidden_input() {
        let (mut doc, el) = doc_with("input");
        doc.set_attribute(el, "type", "hidden");
        assert!(!is_focusable(&doc, Some(el)));
    }

    #[test]
    fn test_display_and_visibility() {
        let (mut doc, el) = doc_with("button");
        doc.set_style(el, "display", "none");
        assert!(!is_tabbable(&doc, Some(el)));

        let (mut doc, el) = doc_with("button");
        doc.set_style(el, "visibility", "hidden");
        assert!(!is_tabbable(&doc, Some(el)));
    }

    #[test]
    fn test_zero_size_without_rects() {
        let (mut doc, el) = doc_with("button");
        doc.set_layout_rect(el, DOMRect::new());
        assert!(!is_tabbable(&doc, Some(el)));
    }

    #[test]
    fn test_links_need_href() {
        for tag in ["a", "area"] {
            let (mut doc, el) = doc_with(tag);
            assert!(!is_tabbable(&doc, Some(el)));
            doc.set_attribute(el, "href", "/next");
            assert!(is_tabbable(&doc, Some(el)));
        }
    }

    #[test]
    fn test_media_need_controls() {
        for tag in ["audio", "video"] {
            let (mut doc, el) = doc_with(tag);
            assert!(!is_tabbable(&doc, Some(el)));
            doc.set_attribute(el, "controls", "");
            assert!(is_tabbable(&doc, Some(el)));
        }
    }

    #[test]
    fn test_explicit_tabindex_overrides_native_rules() {
        let (mut doc, el) = doc_with("video");
        doc.set_attribute(el, "tabindex", "0");
        assert!(is_tabbable(&doc, Some(el)));

        let (mut doc, el) = doc_with("a");
        doc.set_attribute(el, "tabindex", "0");
        assert!(is_tabbable(&doc, Some(el)));
    }

    #[test]
    fn test_contenteditable() {
        let (mut doc, el) = doc_with("div");
        doc.set_attribute(el, "contenteditable", "false");
        assert!(!is_focusable(&doc, Some(el)));

        doc.set_attribute(el, "contenteditable", "true");
        assert!(is_tabbable(&doc, Some(el)));
        assert_eq!(tab_index(&doc, el), 0);
    }

    #[test]
    fn test_inert() {
        let mut doc = Document::default();
        let body = doc.body();
        let region = doc.append_element(body, "section").unwrap();
        let button = doc.append_element(region, "button").unwrap();

        doc.set_attribute(region, "inert", "");
        assert!(!is_focusable(&doc, Some(button)));

        doc.remove_attribute(region, "inert");
        doc.set_attribute(button, "inert", "");
        assert!(!is_focusable(&doc, Some(button)));
    }

    #[test]
    fn test_detached_elements() {
        let mut doc = Document::default();
        let button = doc.create_element("button");
        assert!(!is_focusable(&doc, Some(button)));
        assert!(!is_tabbable(&doc, Some(button)));
    }
}
