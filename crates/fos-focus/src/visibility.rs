//! Visibility resolution
//!
//! `is_hidden` answers "would the user see this, looking no further up than
//! `up_to`?", which is what picking a focus target among candidates needs.
//! `is_element_visible` is the stricter check on the element's own box.

use fos_dom::{Display, Document, NodeId, Visibility};

/// Whether `element`, or an ancestor below `up_to`, hides it
///
/// `visibility: hidden` is checked on the element only (it inherits, so the
/// computed value already reflects ancestors). `display: none` is checked on
/// every node of the walk; the walk stops at `up_to` without checking it.
pub fn is_hidden(doc: &Document, element: NodeId, up_to: Option<NodeId>) -> bool {
    if doc.computed_style(element).is_some_and(|s| s.visibility == Visibility::Hidden) {
        return true;
    }

    let mut node = Some(element);
    while let Some(current) = node {
        if Some(current) == up_to {
            return false;
        }
        if doc.computed_style(current).is_some_and(|s| s.display == Display::None) {
            return true;
        }
        node = doc.parent_element(current);
    }
    false
}

/// Attached to the document's body
pub fn is_element_in_dom(doc: &Document, element: Option<NodeId>) -> bool {
    element.is_some_and(|el| doc.is_element(el) && doc.contains(doc.body(), el))
}

/// Has a box on screen and is neither `display: none` nor `visibility: hidden`
pub fn is_element_visible(doc: &Document, element: NodeId) -> bool {
    let Some(style) = doc.computed_style(element) else {
        return false;
    };
    let has_box = doc.offset_width(element) > 0.0
        || doc.offset_height(element) > 0.0
        || !doc.client_rects(element).is_empty();

    has_box && style.display != Display::None && style.visibility != Visibility::Hidden
}

/// First of `elements` not hidden below `container`
pub fn find_visible<I>(doc: &Document, container: NodeId, elements: I) -> Option<NodeId>
where
    I: IntoIterator<Item = NodeId>,
{
    elements.into_iter().find(|&el| !is_hidden(doc, el, Some(container)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_dom::DOMRect;

    struct Fixture {
        doc: Document,
        container: NodeId,
        parent: NodeId,
        grandchild: NodeId,
    }

    fn fixture() -> Fixture {
        let mut doc = Document::default();
        let body = doc.body();
        let container = doc.append_element(body, "div").unwrap();
        let parent = doc.append_element(container, "div").unwrap();
        let grandchild = doc.append_element(parent, "button").unwrap();
        Fixture { doc, container, parent, grandchild }
    }

    #[test]
    fn test_hidden_stops_at_boundary() {
        let Fixture { mut doc, container, parent, grandchild } = fixture();
        doc.set_style(container, "display", "none");

        assert!(!is_hidden(&doc, grandchild, Some(parent)));
        assert!(is_hidden(&doc, grandchild, None));
        assert!(is_hidden(&doc, grandchild, Some(doc.body())));
    }

    #[test]
    fn test_hidden_by_own_visibility() {
        let Fixture { mut doc, parent, grandchild, .. } = fixture();
        doc.set_style(grandchild, "visibility", "hidden");
        assert!(is_hidden(&doc, grandchild, Some(parent)));
    }

    #[test]
    fn test_in_dom() {
        let Fixture { mut doc, container, grandchild, .. } = fixture();
        assert!(is_element_in_dom(&doc, Some(grandchild)));
        assert!(!is_element_in_dom(&doc, None));

        doc.remove(container);
        assert!(!is_element_in_dom(&doc, Some(grandchild)));

        // Nodes outside <body> do not count
        assert!(!is_element_in_dom(&doc, Some(doc.head())));
    }

    #[test]
    fn test_element_visible() {
        let Fixture { mut doc, parent, grandchild, .. } = fixture();
        assert!(is_element_visible(&doc, grandchild));

        doc.set_layout_rect(grandchild, DOMRect::new());
        assert!(!is_element_visible(&doc, grandchild));

        doc.set_layout_rect(grandchild, DOMRect::from_xywh(0.0, 0.0, 10.0, 10.0));
        doc.set_style(parent, "visibility", "hidden");
        assert!(!is_element_visible(&doc, grandchild));
    }

    #[test]
    fn test_find_visible_skips_hidden() {
        let Fixture { mut doc, container, parent, grandchild } = fixture();
        let sibling = doc.append_element(container, "button").unwrap();
        doc.set_style(parent, "display", "none");

        assert_eq!(find_visible(&doc, container, [grandchild, sibling]), Some(sibling));
        assert_eq!(find_visible(&doc, container, [grandchild]), None);
    }
}
