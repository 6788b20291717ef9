//! Arrow key navigation
//!
//! Moves focus between the items of a composite widget (toolbar, tab list,
//! menu) with the arrow keys plus Home/End. Independent of the trap stack.

use std::cell::Cell;
use std::rc::Rc;

use fos_dom::{Document, DomEvent, EventType, ListenerId, NodeId, SelectorList};
use serde::{Deserialize, Serialize};

use crate::apply::focus;
use crate::tabbable::is_tabbable;
use crate::{ensure_browsing_context, FocusError};

/// Set on the container while arrow navigation is active
pub const ARROW_NAVIGATION_ATTRIBUTE: &str = "data-fos-arrow-navigation";

/// Which arrow pair moves focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// ArrowLeft / ArrowRight
    #[default]
    Horizontal,
    /// ArrowUp / ArrowDown
    Vertical,
}

/// Reading direction; right-to-left swaps ArrowLeft and ArrowRight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingDirection {
    #[default]
    Ltr,
    Rtl,
}

/// Arrow navigation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArrowNavigationOptions {
    /// Selectors for the items, queried inside the container
    pub item_selectors: Vec<String>,
    pub orientation: Orientation,
    pub dir: ReadingDirection,
    /// Wrap past the ends instead of stopping
    #[serde(rename = "loop")]
    pub loop_focus: bool,
    /// Suppress the default scrolling of handled keys
    pub prevent_scroll: bool,
}

impl Default for ArrowNavigationOptions {
    fn default() -> Self {
        Self {
            item_selectors: Vec::new(),
            orientation: Orientation::Horizontal,
            dir: ReadingDirection::Ltr,
            loop_focus: true,
            prevent_scroll: true,
        }
    }
}

impl ArrowNavigationOptions {
    pub fn new<I, S>(item_selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            item_selectors: item_selectors.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn dir(mut self, dir: ReadingDirection) -> Self {
        self.dir = dir;
        self
    }

    pub fn loop_focus(mut self, loop_focus: bool) -> Self {
        self.loop_focus = loop_focus;
        self
    }

    pub fn prevent_scroll(mut self, prevent_scroll: bool) -> Self {
        self.prevent_scroll = prevent_scroll;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Move {
    First,
    Last,
    By(isize),
}

struct NavState {
    container: NodeId,
    options: ArrowNavigationOptions,
    selectors: SelectorList,
    listener: Cell<Option<ListenerId>>,
}

impl NavState {
    fn key_move(&self, key: &str) -> Option<Move> {
        let forward = match self.options.dir {
            ReadingDirection::Ltr => 1,
            ReadingDirection::Rtl => -1,
        };
        match (key, self.options.orientation) {
            ("Home", _) => Some(Move::First),
            ("End", _) => Some(Move::Last),
            ("ArrowRight", Orientation::Horizontal) => Some(Move::By(forward)),
            ("ArrowLeft", Orientation::Horizontal) => Some(Move::By(-forward)),
            ("ArrowDown", Orientation::Vertical) => Some(Move::By(1)),
            ("ArrowUp", Orientation::Vertical) => Some(Move::By(-1)),
            _ => None,
        }
    }

    /// Tabbable items, minus text fields that need the arrow keys themselves
    fn items(&self, doc: &Document) -> Vec<NodeId> {
        doc.query_selector_all(self.container, &self.selectors)
            .into_iter()
            .filter(|&el| is_tabbable(doc, Some(el)))
            .filter(|&el| !matches!(doc.tag_name(el), Some("input" | "textarea")))
            .collect()
    }

    fn on_key_down(&self, doc: &mut Document, event: &mut DomEvent) {
        let Some(init) = event.keyboard.as_ref() else {
            return;
        };
        if init.has_command_modifier() {
            return;
        }
        let Some(step) = self.key_move(&init.key) else {
            return;
        };

        let items = self.items(doc);
        let active = doc.active_element();
        let Some(current) = items.iter().position(|&el| el == active) else {
            return;
        };
        let next = match step {
            Move::First => 0,
            Move::Last => items.len() - 1,
            Move::By(step) => next_index(current, items.len(), step, self.options.loop_focus),
        };

        tracing::trace!(current, next, "arrow navigation");
        focus(doc, Some(items[next]), false);
        if self.options.prevent_scroll {
            event.prevent_default();
        }
    }
}

/// Index `step` away from `current`, wrapped or clamped to `0..len`
fn next_index(current: usize, len: usize, step: isize, wrap: bool) -> usize {
    let last = len.saturating_sub(1);
    let target = current as isize + step;
    if target < 0 {
        if wrap { last } else { 0 }
    } else if target as usize > last {
        if wrap { 0 } else { last }
    } else {
        target as usize
    }
}

/// Arrow key navigation controller
pub struct ArrowNavigation {
    state: Rc<NavState>,
}

impl ArrowNavigation {
    /// Validate the item selectors up front
    pub fn new(container: NodeId, options: ArrowNavigationOptions) -> Result<Self, FocusError> {
        let joined = options.item_selectors.iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        if joined.is_empty() {
            return Err(FocusError::EmptySelectorList);
        }
        let selectors = SelectorList::parse(&joined)?;

        Ok(Self {
            state: Rc::new(NavState {
                container,
                options,
                selectors,
                listener: Cell::new(None),
            }),
        })
    }

    pub fn container(&self) -> NodeId {
        self.state.container
    }

    pub fn options(&self) -> &ArrowNavigationOptions {
        &self.state.options
    }

    pub fn is_active(&self) -> bool {
        self.state.listener.get().is_some()
    }

    /// Start handling arrow keys on the container
    pub fn activate(&self, doc: &mut Document) -> Result<(), FocusError> {
        if !ensure_browsing_context(doc, "ArrowNavigation::activate")? || self.is_active() {
            return Ok(());
        }
        let container = self.state.container;
        if !doc.is_element(container) || !doc.is_connected(container) {
            tracing::debug!(?container, "arrow navigation container not attached, not activating");
            return Ok(());
        }

        let weak = Rc::downgrade(&self.state);
        let listener = doc.add_event_listener(container, EventType::KeyDown, move |doc, event| {
            if let Some(state) = weak.upgrade() {
                state.on_key_down(doc, event);
            }
        });
        self.state.listener.set(Some(listener));
        doc.set_attribute(container, ARROW_NAVIGATION_ATTRIBUTE, "");
        tracing::debug!(?container, orientation = ?self.state.options.orientation, "arrow navigation activated");
        Ok(())
    }

    pub fn deactivate(&self, doc: &mut Document) -> Result<(), FocusError> {
        if !ensure_browsing_context(doc, "ArrowNavigation::deactivate")? {
            return Ok(());
        }
        let Some(listener) = self.state.listener.take() else {
            return Ok(());
        };
        doc.remove_event_listener(listener);
        doc.remove_attribute(self.state.container, ARROW_NAVIGATION_ATTRIBUTE);
        tracing::debug!(container = ?self.state.container, "arrow navigation deactivated");
        Ok(())
    }
}

impl std::fmt::Debug for ArrowNavigation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrowNavigation")
            .field("container", &self.state.container)
            .field("selectors", &self.state.selectors.as_str())
            .field("options", &self.state.options)
            .field("active", &self.is_active())
            .finish()
    }
}
