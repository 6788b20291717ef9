//! Classifier and tab order tests through the public API

use fos_dom::{DOMRect, Document, NodeId};
use fos_focus::{
    find_visible, get_tabbable_candidates, get_tabbable_edges, is_focusable, is_hidden, is_tabbable,
};

fn append(doc: &mut Document, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
    let el = doc.append_element(parent, tag).unwrap();
    for (name, value) in attrs {
        doc.set_attribute(el, name, value);
    }
    el
}

// ============================================================================
// CLASSIFIER TABLE
// ============================================================================

#[test]
fn test_never_tabbable() {
    let mut doc = Document::default();
    let body = doc.body();

    let mut rejected = vec![
        append(&mut doc, body, "div", &[("tabindex", "-1")]),
        append(&mut doc, body, "input", &[("type", "hidden")]),
        append(&mut doc, body, "a", &[]),
        append(&mut doc, body, "area", &[]),
        append(&mut doc, body, "audio", &[]),
        append(&mut doc, body, "video", &[]),
        append(&mut doc, body, "button", &[("inert", "")]),
    ];
    for tag in ["button", "input", "select", "textarea"] {
        rejected.push(append(&mut doc, body, tag, &[("disabled", "")]));
    }

    let hidden = append(&mut doc, body, "button", &[]);
    doc.set_style(hidden, "display", "none");
    rejected.push(hidden);

    let invisible = append(&mut doc, body, "button", &[]);
    doc.set_style(invisible, "visibility", "hidden");
    rejected.push(invisible);

    let collapsed = append(&mut doc, body, "button", &[]);
    doc.set_layout_rect(collapsed, DOMRect::new());
    rejected.push(collapsed);

    let inert_region = append(&mut doc, body, "section", &[("inert", "")]);
    rejected.push(append(&mut doc, inert_region, "button", &[]));

    for el in rejected {
        assert!(!is_tabbable(&doc, Some(el)), "{:?} <{}> should not be tabbable", el, doc.tag_name(el).unwrap_or("?"));
    }
}

#[test]
fn test_focusable_but_not_tabbable() {
    let mut doc = Document::default();
    let body = doc.body();
    let el = append(&mut doc, body, "span", &[("tabindex", "-1")]);

    assert!(is_focusable(&doc, Some(el)));
    assert!(!is_tabbable(&doc, Some(el)));
}

#[test]
fn test_natively_tabbable() {
    let mut doc = Document::default();
    let body = doc.body();
    let accepted = [
        append(&mut doc, body, "a", &[("href", "#top")]),
        append(&mut doc, body, "area", &[("href", "/map")]),
        append(&mut doc, body, "video", &[("controls", "")]),
        append(&mut doc, body, "div", &[("contenteditable", "")]),
        append(&mut doc, body, "summary", &[]),
        append(&mut doc, body, "span", &[("tabindex", "4")]),
    ];
    for el in accepted {
        assert!(is_tabbable(&doc, Some(el)));
    }
}

// ============================================================================
// ORDERING
// ============================================================================

#[test]
fn test_candidate_ordering() {
    let mut doc = Document::default();
    let body = doc.body();
    let container = append(&mut doc, body, "div", &[]);
    let two = append(&mut doc, container, "div", &[("tabindex", "2")]);
    let button = append(&mut doc, container, "button", &[]);
    let one = append(&mut doc, container, "div", &[("tabindex", "1")]);
    let zero = append(&mut doc, container, "div", &[("tabindex", "0")]);

    assert_eq!(get_tabbable_candidates(&doc, container), vec![one, two, button, zero]);
    assert_eq!(get_tabbable_edges(&doc, container), (Some(one), Some(zero)));
}

#[test]
fn test_nested_candidates_in_document_order() {
    let mut doc = Document::default();
    let body = doc.body();
    let container = append(&mut doc, body, "form", &[]);
    let fieldset = append(&mut doc, container, "fieldset", &[]);
    let name = append(&mut doc, fieldset, "input", &[]);
    let email = append(&mut doc, fieldset, "input", &[("type", "email")]);
    let submit = append(&mut doc, container, "button", &[]);

    assert_eq!(get_tabbable_candidates(&doc, container), vec![name, email, submit]);
}

// ============================================================================
// VISIBILITY
// ============================================================================

#[test]
fn test_visibility_boundary() {
    let mut doc = Document::default();
    let body = doc.body();
    let container = append(&mut doc, body, "div", &[]);
    let parent = append(&mut doc, container, "div", &[]);
    let grandchild = append(&mut doc, parent, "button", &[]);
    doc.set_style(container, "display", "none");

    assert!(!is_hidden(&doc, grandchild, Some(parent)));
    assert!(is_hidden(&doc, grandchild, None));
    assert_eq!(find_visible(&doc, parent, [grandchild]), Some(grandchild));
    assert_eq!(find_visible(&doc, body, [grandchild]), None);
}
