//! Document focus
//!
//! Tracks the focused element, decides which elements `focus()` accepts and
//! fires `focusout`/`focusin` around every change.

use crate::{Document, DomEvent, NodeId, Visibility};

/// Options for `Document::focus`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusOptions {
    /// Do not scroll the focused element into view
    pub prevent_scroll: bool,
}

impl FocusOptions {
    pub fn prevent_scroll() -> Self {
        Self { prevent_scroll: true }
    }
}

const FORM_CONTROLS: &[&str] = &["button", "input", "select", "textarea", "optgroup", "option", "fieldset"];

impl Document {
    /// Focused element, or `<body>` when nothing has focus
    pub fn active_element(&self) -> NodeId {
        self.focused.unwrap_or(self.body())
    }

    /// Focused element, if any
    pub fn focused_element(&self) -> Option<NodeId> {
        self.focused
    }

    /// Whether `focus()` would accept this element
    pub fn is_focusable_area(&self, id: NodeId) -> bool {
        let Some(elem) = self.tree.element(id) else {
            return false;
        };
        if !self.is_connected(id) || !self.is_rendered(id) {
            return false;
        }
        if self.computed_style(id).is_some_and(|s| s.visibility != Visibility::Visible) {
            return false;
        }
        let inert = std::iter::once(id)
            .chain(self.tree.ancestors(id))
            .any(|node| self.has_attribute(node, "inert"));
        if inert {
            return false;
        }
        if self.is_disabled_control(id) {
            return false;
        }

        let has_tab_index = elem.get_attr("tabindex").is_some_and(|v| v.trim().parse::<i32>().is_ok());
        has_tab_index || match elem.tag.as_str() {
            "a" | "area" => elem.has_attr("href"),
            "button" | "select" | "textarea" | "iframe" | "summary" => true,
            "input" => !elem.get_attr("type").is_some_and(|t| t.eq_ignore_ascii_case("hidden")),
            "audio" | "video" => elem.has_attr("controls"),
            _ => matches!(
                elem.get_attr("contenteditable").map(str::to_ascii_lowercase).as_deref(),
                Some("" | "true" | "plaintext-only")
            ),
        }
    }

    /// Whether a form control is disabled, either by its own attribute or
    /// by a disabled `<fieldset>` ancestor.
    ///
    /// Descendants of a disabled fieldset's first `<legend>` stay enabled.
    pub fn is_disabled_control(&self, id: NodeId) -> bool {
        let Some(elem) = self.tree.element(id) else {
            return false;
        };
        if !FORM_CONTROLS.contains(&elem.tag.as_str()) {
            return false;
        }
        if elem.has_attr("disabled") {
            return true;
        }

        let mut child = id;
        for ancestor in self.tree.ancestors(id) {
            if self.tag_name(ancestor) == Some("fieldset") && self.has_attribute(ancestor, "disabled") {
                let first_legend = self.tree
                    .children(ancestor)
                    .find(|&c| self.tag_name(c) == Some("legend"));
                return first_legend != Some(child);
            }
            child = ancestor;
        }
        false
    }

    /// Focus an element
    ///
    /// Focusing `<body>` blurs. Returns whether `id` holds focus afterwards.
    /// If a `focusout` listener moves focus itself, that move wins.
    pub fn focus(&mut self, id: NodeId, options: FocusOptions) -> bool {
        if id == self.body() {
            self.blur();
            return true;
        }
        if !self.is_focusable_area(id) {
            return false;
        }

        self.focus_epoch += 1;
        let epoch = self.focus_epoch;
        if self.focused == Some(id) {
            return true;
        }

        let previous = self.focused;
        if let Some(old) = previous {
            let mut event = DomEvent::focus_out(old, Some(id));
            self.dispatch_event(&mut event);
            if self.focus_epoch != epoch {
                tracing::trace!(?id, "focus change superseded by a focusout listener");
                return self.focused == Some(id);
            }
            if !self.is_focusable_area(id) {
                return false;
            }
        }

        self.focused = Some(id);
        if !options.prevent_scroll {
            if let Some(rect) = self.layout_rect(id) {
                self.scroll_to(rect.x, rect.y);
            }
        }

        let mut event = DomEvent::focus_in(id, previous);
        self.dispatch_event(&mut event);
        true
    }

    /// Remove focus from the focused element
    pub fn blur(&mut self) {
        self.focus_epoch += 1;
        let epoch = self.focus_epoch;
        let Some(old) = self.focused else {
            return;
        };

        let mut event = DomEvent::focus_out(old, None);
        self.dispatch_event(&mut event);
        if self.focus_epoch == epoch {
            self.focused = None;
        }
    }

    /// Select the whole value of an `<input>` or `<textarea>`
    pub fn select(&mut self, id: NodeId) -> bool {
        let Some(elem) = self.tree.element_mut(id) else {
            return false;
        };
        if !matches!(elem.tag.as_str(), "input" | "textarea") {
            return false;
        }
        let len = elem.get_attr("value").map_or(0, |v| v.chars().count());
        elem.selection = Some((0, len));
        true
    }

    /// Current selection range of an input
    pub fn selection(&self, id: NodeId) -> Option<(usize, usize)> {
        self.tree.element(id)?.selection
    }

    /// Drop focus without events when the focused node left the document
    pub(crate) fn focus_fixup(&mut self) {
        if let Some(focused) = self.focused {
            if !self.is_connected(focused) {
                tracing::trace!(?focused, "focused element removed, focus reset to body");
                self.focused = None;
            }
        }
    }
}
