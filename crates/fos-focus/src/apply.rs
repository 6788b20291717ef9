//! Applying focus
//!
//! Every focus change made by this crate goes through here, so none of them
//! scrolls the page.

use fos_dom::{Document, FocusOptions, NodeId};

/// Focus `element` without scrolling, optionally selecting its text
///
/// No-op for `None` and for nodes that are not elements. Text is selected
/// only on inputs and textareas that were not already the active element.
pub fn focus(doc: &mut Document, element: Option<NodeId>, select: bool) {
    let Some(element) = element.filter(|&el| doc.is_element(el)) else {
        return;
    };

    let previously_focused = doc.active_element();
    doc.focus(element, FocusOptions::prevent_scroll());

    if select && element != previously_focused && is_text_input(doc, element) {
        doc.select(element);
    }
}

/// Focus the first of `candidates` that takes focus
pub fn focus_first(doc: &mut Document, candidates: &[NodeId], select: bool) {
    let previously_focused = doc.active_element();
    for &candidate in candidates {
        focus(doc, Some(candidate), select);
        if doc.active_element() != previously_focused {
            return;
        }
    }
}

fn is_text_input(doc: &Document, element: NodeId) -> bool {
    matches!(doc.tag_name(element), Some("input" | "textarea"))
}
