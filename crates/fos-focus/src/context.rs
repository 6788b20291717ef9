//! Shared focus state
//!
//! One `FocusContext` per document. Clones share the same stack and scroll
//! lock; every trap for that document must be built from the same context.

use std::rc::Rc;

use crate::scroll_lock::ScrollLock;
use crate::stack::FocusTrapStack;

/// Handles to the document-wide trap stack and scroll lock
#[derive(Debug, Clone, Default)]
pub struct FocusContext {
    stack: Rc<FocusTrapStack>,
    scroll_lock: Rc<ScrollLock>,
}

impl FocusContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stack(&self) -> &FocusTrapStack {
        &self.stack
    }

    pub fn scroll_lock(&self) -> &ScrollLock {
        &self.scroll_lock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let context = FocusContext::new();
        let clone = context.clone();

        let mut doc = fos_dom::Document::default();
        clone.scroll_lock().disable(&mut doc);
        assert_eq!(context.scroll_lock().count(), 1);
        assert!(context.stack().is_empty());

        let separate = FocusContext::new();
        assert_eq!(separate.scroll_lock().count(), 0);
    }
}
