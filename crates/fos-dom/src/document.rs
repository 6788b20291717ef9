//! Document - High-level document API

use std::fmt;

use crate::{DomTree, NodeId, Viewport};
use crate::dom_events::RegisteredListener;
use crate::event_loop::EventLoop;
use crate::observer::RegisteredObserver;

/// HTML Document
///
/// Owns the tree plus every piece of live state scripts can observe: the
/// focused element, the viewport, registered listeners and observers, and
/// the task queue that stands in for "next tick".
pub struct Document {
    /// The DOM tree
    pub(crate) tree: DomTree,
    /// Document URL
    url: String,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
    /// False for documents built for serialisation only
    browsing_context: bool,
    pub(crate) focused: Option<NodeId>,
    pub(crate) focus_epoch: u64,
    pub(crate) viewport: Viewport,
    pub(crate) listeners: Vec<RegisteredListener>,
    pub(crate) observers: Vec<RegisteredObserver>,
    pub(crate) event_loop: EventLoop,
    next_handle: u64,
}

impl Document {
    /// Create a document with `<html><head></head><body></body></html>`
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        // Freshly allocated nodes under the document node cannot fail to link
        let _ = tree.append_child(tree.root(), html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        Self {
            tree,
            url: url.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
            browsing_context: true,
            focused: None,
            focus_epoch: 0,
            viewport: Viewport::default(),
            listeners: Vec::new(),
            observers: Vec::new(),
            event_loop: EventLoop::default(),
            next_handle: 1,
        }
    }

    /// Create a document that is only built and serialised (no window)
    pub fn without_browsing_context(url: &str) -> Self {
        Self {
            browsing_context: false,
            ..Self::new(url)
        }
    }

    /// Whether the document is displayed in a window
    pub fn has_browsing_context(&self) -> bool {
        self.browsing_context
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.create_element(tag)
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.tree.create_text(text)
    }

    /// Check that `id` is an element
    pub fn is_element(&self, id: NodeId) -> bool {
        self.tree.element(id).is_some()
    }

    /// Lower-case tag name
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.tree.element(id).map(|e| e.tag.as_str())
    }

    /// Get an attribute value
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.tree.element(id)?.get_attr(name)
    }

    /// Check attribute presence
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.get_attribute(id, name).is_some()
    }

    /// Set an attribute. Returns false if `id` is not an element.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        match self.tree.element_mut(id) {
            Some(elem) => {
                elem.set_attr(name, value);
                true
            }
            None => false,
        }
    }

    /// Remove an attribute, returning its previous value
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        self.tree.element_mut(id)?.remove_attr(name)
    }

    /// Parent of `id` if that parent is an element
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.tree.parent(id).filter(|&p| self.is_element(p))
    }

    /// Inclusive containment check
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.tree.contains(ancestor, node)
    }

    /// Check that `id` is attached to this document
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.tree.is_connected(id)
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .descendants(NodeId::ROOT)
            .find(|&node| self.get_attribute(node, "id") == Some(id))
    }

    pub(crate) fn next_handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("url", &self.url)
            .field("nodes", &self.tree.len())
            .field("browsing_context", &self.browsing_context)
            .field("focused", &self.focused)
            .field("listeners", &self.listeners.len())
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}
