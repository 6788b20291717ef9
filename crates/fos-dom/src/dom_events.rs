//! DOM Events
//!
//! Focus and keyboard events, listener registration and dispatch.

use std::rc::Rc;

use crate::{Document, FocusOptions, NodeId};

/// DOM event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    FocusIn,
    FocusOut,
    KeyDown,
}

/// Keyboard event init dictionary
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyboardEventInit {
    pub key: String,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyboardEventInit {
    pub fn new(key: &str) -> Self {
        Self { key: key.into(), shift: false, ctrl: false, alt: false, meta: false }
    }
    pub fn shift(mut self) -> Self { self.shift = true; self }
    pub fn ctrl(mut self) -> Self { self.ctrl = true; self }
    pub fn alt(mut self) -> Self { self.alt = true; self }
    pub fn meta(mut self) -> Self { self.meta = true; self }

    /// Any modifier other than Shift
    pub fn has_command_modifier(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// DOM event
#[derive(Debug, Clone)]
pub struct DomEvent {
    pub event_type: EventType,
    pub target: NodeId,
    pub current_target: NodeId,
    /// Focus events: the node gaining (focusout) or losing (focusin) focus
    pub related_target: Option<NodeId>,
    pub keyboard: Option<KeyboardEventInit>,
    pub bubbles: bool,
    pub cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl DomEvent {
    fn new(event_type: EventType, target: NodeId, cancelable: bool) -> Self {
        Self {
            event_type,
            target,
            current_target: target,
            related_target: None,
            keyboard: None,
            bubbles: true,
            cancelable,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Create focusin event
    pub fn focus_in(target: NodeId, related_target: Option<NodeId>) -> Self {
        Self { related_target, ..Self::new(EventType::FocusIn, target, false) }
    }

    /// Create focusout event
    pub fn focus_out(target: NodeId, related_target: Option<NodeId>) -> Self {
        Self { related_target, ..Self::new(EventType::FocusOut, target, false) }
    }

    /// Create keydown event
    pub fn key_down(target: NodeId, init: KeyboardEventInit) -> Self {
        Self { keyboard: Some(init), ..Self::new(EventType::KeyDown, target, true) }
    }

    /// Pressed key, for keyboard events
    pub fn key(&self) -> Option<&str> {
        self.keyboard.as_ref().map(|k| k.key.as_str())
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop propagation
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Handle returned by `add_event_listener`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub(crate) type EventCallback = Rc<dyn Fn(&mut Document, &mut DomEvent)>;

pub(crate) struct RegisteredListener {
    id: ListenerId,
    target: NodeId,
    event_type: EventType,
    callback: EventCallback,
}

/// Distance scrolled by one arrow key press
const ARROW_SCROLL_STEP: f64 = 40.0;

impl Document {
    /// Register a listener on `target` (`NodeId::ROOT` for the document)
    pub fn add_event_listener<F>(&mut self, target: NodeId, event_type: EventType, callback: F) -> ListenerId
    where
        F: Fn(&mut Document, &mut DomEvent) + 'static,
    {
        let id = ListenerId(self.next_handle());
        self.listeners.push(RegisteredListener { id, target, event_type, callback: Rc::new(callback) });
        id
    }

    /// Unregister a listener. Returns false if it was not registered.
    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    /// Registered listeners across all targets
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Dispatch an event through target and ancestors
    ///
    /// Returns false if a listener prevented the default action.
    pub fn dispatch_event(&mut self, event: &mut DomEvent) -> bool {
        let mut path = vec![event.target];
        if event.bubbles {
            path.extend(self.tree.ancestors(event.target));
        }

        for node in path {
            event.current_target = node;
            let callbacks: Vec<(ListenerId, EventCallback)> = self.listeners.iter()
                .filter(|l| l.target == node && l.event_type == event.event_type)
                .map(|l| (l.id, Rc::clone(&l.callback)))
                .collect();

            for (id, callback) in callbacks {
                // Listeners removed by an earlier callback in this pass do not run
                if self.listeners.iter().any(|l| l.id == id) {
                    callback(self, event);
                }
            }
            if event.is_propagation_stopped() {
                break;
            }
        }

        !event.is_default_prevented()
    }

    /// Press a key on the focused element and run its default action
    ///
    /// Returns false if the default action was prevented.
    pub fn press_key(&mut self, init: KeyboardEventInit) -> bool {
        let target = self.active_element();
        let mut event = DomEvent::key_down(target, init.clone());
        if !self.dispatch_event(&mut event) {
            return false;
        }
        self.run_default_key_action(&init);
        true
    }

    fn run_default_key_action(&mut self, init: &KeyboardEventInit) {
        if init.has_command_modifier() {
            return;
        }
        let (x, y) = (self.viewport.scroll_x, self.viewport.scroll_y);
        match init.key.as_str() {
            "Tab" => self.sequential_focus_navigation(init.shift),
            "ArrowDown" => self.scroll_to(x, y + ARROW_SCROLL_STEP),
            "ArrowUp" => self.scroll_to(x, y - ARROW_SCROLL_STEP),
            "ArrowRight" => self.scroll_to(x + ARROW_SCROLL_STEP, y),
            "ArrowLeft" => self.scroll_to(x - ARROW_SCROLL_STEP, y),
            "Home" => self.scroll_to(x, 0.0),
            "End" => self.scroll_to(x, y + self.viewport.inner_height),
            _ => {}
        }
    }

    /// Tab / Shift+Tab default
    ///
    /// Follows the sequential navigation order: positive `tabindex` values
    /// ascending, then everything else in tree order. A focused element
    /// outside that order (`tabindex="-1"`) starts from its tree position.
    /// Past either end focus leaves the document.
    fn sequential_focus_navigation(&mut self, backwards: bool) {
        let order = self.sequential_focus_order();

        let next = match self.focused {
            Some(focused) => match order.iter().position(|&n| n == focused) {
                Some(i) if backwards => i.checked_sub(1).and_then(|i| order.get(i).copied()),
                Some(i) => order.get(i + 1).copied(),
                None => self.tree_order_neighbor(focused, &order, backwards),
            },
            None if backwards => order.last().copied(),
            None => order.first().copied(),
        };

        match next {
            Some(node) => {
                self.focus(node, FocusOptions::default());
            }
            None => self.blur(),
        }
    }

    /// Sequentially focusable elements in Tab order
    pub fn sequential_focus_order(&self) -> Vec<NodeId> {
        let mut positive = Vec::new();
        let mut rest = Vec::new();
        for node in self.tree.descendants(NodeId::ROOT) {
            match self.sequential_tab_index(node) {
                Some(index) if index > 0 => positive.push((index, node)),
                Some(_) => rest.push(node),
                None => {}
            }
        }
        // Stable: equal indices keep tree order
        positive.sort_by_key(|&(index, _)| index);
        positive.into_iter().map(|(_, node)| node).chain(rest).collect()
    }

    /// Nearest element of `order` following (or preceding) `from` in tree order
    fn tree_order_neighbor(&self, from: NodeId, order: &[NodeId], backwards: bool) -> Option<NodeId> {
        let tree_order: Vec<NodeId> = self.tree.descendants(NodeId::ROOT).collect();
        let at = tree_order.iter().position(|&n| n == from)?;
        if backwards {
            tree_order[..at].iter().rev().find(|&&n| order.contains(&n)).copied()
        } else {
            tree_order[at + 1..].iter().find(|&&n| order.contains(&n)).copied()
        }
    }

    fn sequential_tab_index(&self, node: NodeId) -> Option<i32> {
        if !self.is_focusable_area(node) {
            return None;
        }
        let index = self.get_attribute(node, "tabindex")
            .and_then(|v| v.trim().parse::<i32>().ok())
            .unwrap_or(0);
        (index >= 0).then_some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_focus_events() {
        let event = DomEvent::focus_out(NodeId(5), Some(NodeId(1)));
        assert_eq!(event.event_type, EventType::FocusOut);
        assert_eq!(event.related_target, Some(NodeId(1)));
        assert!(event.bubbles);
        assert!(!event.cancelable);
    }

    #[test]
    fn test_prevent_default_requires_cancelable() {
        let mut focus = DomEvent::focus_in(NodeId(2), None);
        focus.prevent_default();
        assert!(!focus.is_default_prevented());

        let mut key = DomEvent::key_down(NodeId(2), KeyboardEventInit::new("Tab").shift());
        key.prevent_default();
        assert!(key.is_default_prevented());
        assert_eq!(key.key(), Some("Tab"));
    }

    #[test]
    fn test_dispatch_bubbles_to_document() {
        let mut doc = Document::default();
        let body = doc.body();
        let button = doc.append_element(body, "button").unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        for node in [button, body, NodeId::ROOT] {
            let seen = Rc::clone(&seen);
            doc.add_event_listener(node, EventType::KeyDown, move |_, event| {
                seen.borrow_mut().push(event.current_target);
            });
        }

        let mut event = DomEvent::key_down(button, KeyboardEventInit::new("a"));
        assert!(doc.dispatch_event(&mut event));
        assert_eq!(*seen.borrow(), vec![button, body, NodeId::ROOT]);
    }

    #[test]
    fn test_listener_removed_during_dispatch_does_not_run() {
        let mut doc = Document::default();
        let calls = Rc::new(RefCell::new(0));

        let second = Rc::new(RefCell::new(None));
        let second_id = Rc::clone(&second);
        doc.add_event_listener(NodeId::ROOT, EventType::KeyDown, move |doc, _| {
            if let Some(id) = *second_id.borrow() {
                doc.remove_event_listener(id);
            }
        });
        let counter = Rc::clone(&calls);
        let id = doc.add_event_listener(NodeId::ROOT, EventType::KeyDown, move |_, _| {
            *counter.borrow_mut() += 1;
        });
        *second.borrow_mut() = Some(id);

        doc.press_key(KeyboardEventInit::new("x"));
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_default_tab_navigation() {
        let mut doc = Document::default();
        let body = doc.body();
        let first = doc.append_element(body, "button").unwrap();
        let skipped = doc.append_element(body, "div").unwrap();
        doc.set_attribute(skipped, "tabindex", "-1");
        let second = doc.append_element(body, "input").unwrap();

        assert!(doc.press_key(KeyboardEventInit::new("Tab")));
        assert_eq!(doc.active_element(), first);
        doc.press_key(KeyboardEventInit::new("Tab"));
        assert_eq!(doc.active_element(), second);
        doc.press_key(KeyboardEventInit::new("Tab").shift());
        assert_eq!(doc.active_element(), first);

        // Leaving the end of the document blurs
        doc.focus(second, FocusOptions::default());
        doc.press_key(KeyboardEventInit::new("Tab"));
        assert_eq!(doc.active_element(), body);
    }

    #[test]
    fn test_positive_tab_index_goes_first() {
        let mut doc = Document::default();
        let body = doc.body();
        let two = doc.append_element(body, "div").unwrap();
        doc.set_attribute(two, "tabindex", "2");
        let button = doc.append_element(body, "button").unwrap();
        let one = doc.append_element(body, "div").unwrap();
        doc.set_attribute(one, "tabindex", "1");
        let also_one = doc.append_element(body, "span").unwrap();
        doc.set_attribute(also_one, "tabindex", "1");

        assert_eq!(doc.sequential_focus_order(), vec![one, also_one, two, button]);

        doc.focus(also_one, FocusOptions::default());
        doc.press_key(KeyboardEventInit::new("Tab"));
        assert_eq!(doc.active_element(), two);
        doc.press_key(KeyboardEventInit::new("Tab"));
        assert_eq!(doc.active_element(), button);
        doc.press_key(KeyboardEventInit::new("Tab").shift());
        assert_eq!(doc.active_element(), two);
    }

    #[test]
    fn test_tab_from_unordered_element_uses_tree_position() {
        let mut doc = Document::default();
        let body = doc.body();
        let before = doc.append_element(body, "button").unwrap();
        let region = doc.append_element(body, "div").unwrap();
        doc.set_attribute(region, "tabindex", "-1");
        let inside = doc.append_element(region, "button").unwrap();
        let after = doc.append_element(body, "button").unwrap();

        doc.focus(region, FocusOptions::default());
        doc.press_key(KeyboardEventInit::new("Tab"));
        assert_eq!(doc.active_element(), inside);

        doc.focus(region, FocusOptions::default());
        doc.press_key(KeyboardEventInit::new("Tab").shift());
        assert_eq!(doc.active_element(), before);

        doc.set_attribute(inside, "disabled", "");
        doc.focus(region, FocusOptions::default());
        doc.press_key(KeyboardEventInit::new("Tab"));
        assert_eq!(doc.active_element(), after);
    }

    #[test]
    fn test_prevented_key_skips_default_action() {
        let mut doc = Document::default();
        doc.add_event_listener(NodeId::ROOT, EventType::KeyDown, |_, event| event.prevent_default());

        assert!(!doc.press_key(KeyboardEventInit::new("ArrowDown")));
        assert_eq!(doc.viewport().scroll_y, 0.0);
    }
}
