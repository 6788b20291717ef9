//! DOM Node Operations
//!
//! appendChild, insertBefore, removeChild at the document level. Unlike the
//! raw `DomTree` operations these queue mutation records and fix up focus
//! when the focused element leaves the document.

use crate::{Document, MutationRecord, NodeId};

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found
    #[error("node not found")]
    NotFound,
    /// Hierarchy error (e.g., inserting an ancestor)
    #[error("hierarchy request error")]
    HierarchyRequest,
    /// Invalid node type
    #[error("invalid node type")]
    InvalidNodeType,
    /// Node is not a child
    #[error("node is not a child")]
    NotAChild,
    /// Selector could not be parsed
    #[error("invalid selector `{0}`")]
    Syntax(String),
}

impl Document {
    /// Append `child` to `parent`, moving it if already attached elsewhere
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (append when `None`)
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) -> DomResult<NodeId> {
        let old_parent = self.tree.parent(child);
        self.tree.insert_before(parent, child, reference)?;

        if let Some(old_parent) = old_parent {
            self.queue_mutation_record(MutationRecord::removed(old_parent, child));
        }
        self.queue_mutation_record(MutationRecord::added(parent, child));
        self.focus_fixup();
        Ok(child)
    }

    /// Remove `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.tree.remove_child(parent, child)?;
        self.queue_mutation_record(MutationRecord::removed(parent, child));
        self.focus_fixup();
        Ok(child)
    }

    /// Detach `node` from its parent. Returns false if it was not attached.
    pub fn remove(&mut self, node: NodeId) -> bool {
        match self.tree.parent(node) {
            Some(parent) => self.remove_child(parent, node).is_ok(),
            None => false,
        }
    }

    /// Create an element and append it to `parent`
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> DomResult<NodeId> {
        let element = self.create_element(tag);
        self.append_child(parent, element)
    }
}
