//! fOS Focus
//!
//! Focus containment and keyboard navigation for the fOS DOM.
//!
//! Features:
//! - Tabbable / focusable classification
//! - Tab-order candidate discovery
//! - Nested focus traps (LIFO stack with pause/resume)
//! - Arrow-key navigation between sibling items
//! - Reference-counted body scroll lock
//!
//! # Example
//! ```rust,ignore
//! use fos_focus::{FocusContext, FocusTrap, FocusTrapOptions};
//!
//! let context = FocusContext::new();
//! let trap = FocusTrap::with_container(context.clone(), dialog, FocusTrapOptions::new());
//! trap.activate(&mut document)?;
//! // ...
//! trap.deactivate(&mut document)?;
//! document.run_until_idle();
//! ```

pub mod tabbable;
pub mod candidates;
pub mod visibility;
pub mod apply;
pub mod stack;
pub mod trap;
pub mod arrow_nav;
pub mod scroll_lock;
mod context;

pub use tabbable::{TabIndex, is_focusable, is_tabbable, tab_index};
pub use candidates::{get_tabbable_candidates, get_tabbable_edges};
pub use visibility::{find_visible, is_element_in_dom, is_element_visible, is_hidden};
pub use apply::{focus, focus_first};
pub use stack::{FocusTrapHandle, FocusTrapStack};
pub use trap::{FocusTarget, FocusTrap, FocusTrapOptions, FOCUS_TRAP_ATTRIBUTE};
pub use arrow_nav::{ArrowNavigation, ArrowNavigationOptions, Orientation, ReadingDirection, ARROW_NAVIGATION_ATTRIBUTE};
pub use scroll_lock::ScrollLock;
pub use context::FocusContext;

use fos_dom::Document;

/// Focus handling error
#[derive(Debug, thiserror::Error)]
pub enum FocusError {
    #[error("{operation} requires a document with a browsing context")]
    NoBrowsingContext { operation: &'static str },

    #[error("invalid item selector: {0}")]
    InvalidSelector(#[from] fos_dom::DomError),

    #[error("arrow navigation needs at least one item selector")]
    EmptySelectorList,
}

/// Gate for operations that only make sense in a live window.
///
/// Debug builds surface misuse as an error; release builds log and skip.
pub(crate) fn ensure_browsing_context(doc: &Document, operation: &'static str) -> Result<bool, FocusError> {
    if doc.has_browsing_context() {
        return Ok(true);
    }
    if cfg!(debug_assertions) {
        return Err(FocusError::NoBrowsingContext { operation });
    }
    tracing::warn!(operation, "ignored call on a document without a browsing context");
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browsing_context_gate() {
        let live = Document::new("about:blank");
        assert!(ensure_browsing_context(&live, "test").unwrap());

        let server = Document::without_browsing_context("about:blank");
        let err = ensure_browsing_context(&server, "FocusTrap::activate").unwrap_err();
        assert_eq!(err.to_string(), "FocusTrap::activate requires a document with a browsing context");
    }
}
