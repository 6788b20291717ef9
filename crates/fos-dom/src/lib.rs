//! fOS DOM - Document Object Model
//!
//! Arena-backed DOM tree for the fOS engine.
//!
//! Besides the node tree this crate carries the live state that focus and
//! keyboard handling depend on:
//! - attributes and `querySelectorAll`-style selector lists
//! - inline style and computed `display`/`visibility`/`overflow`
//! - layout boxes, client rects and the viewport
//! - focus state, `focusin`/`focusout`/`keydown` dispatch with default actions
//! - mutation observers and a single-threaded event loop

mod node;
mod tree;
mod document;
mod operations;
mod element;
mod style;
mod geometry;
mod dom_events;
mod observer;
mod event_loop;
mod focus;

pub use node::{Node, NodeData, ElementData, Attribute};
pub use tree::{DomTree, Children, Ancestors, Descendants};
pub use document::Document;
pub use operations::{DomError, DomResult};
pub use element::{SelectorList, CompoundSelector, SimpleSelector};
pub use style::{ComputedStyle, Display, Visibility, Overflow, Position};
pub use geometry::{DOMRect, DOMRectList, Viewport, Platform};
pub use dom_events::{DomEvent, EventType, KeyboardEventInit, ListenerId};
pub use observer::{MutationObserverInit, MutationRecord, ObserverId};
pub use focus::FocusOptions;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID (the document node)
    pub const ROOT: NodeId = NodeId(0);

    /// Null handle
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check that this is not the null handle
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}
