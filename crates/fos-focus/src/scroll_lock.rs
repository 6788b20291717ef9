//! Body scroll lock
//!
//! Reference counted: the first `disable` locks the body, the matching last
//! `enable` restores it. Overlays that nest simply pair their calls.

use std::cell::RefCell;
use std::fmt;

use fos_dom::{Document, Platform};

type Cleanup = Box<dyn FnOnce(&mut Document)>;

#[derive(Default)]
struct ScrollLockState {
    count: usize,
    cleanup: Option<Cleanup>,
}

/// Reference-counted `overflow: hidden` on `<body>`
#[derive(Default)]
pub struct ScrollLock {
    state: RefCell<ScrollLockState>,
}

/// Inline body properties touched by the lock
const SAVED_PROPERTIES: &[&str] = &["overflow", "padding-right", "position", "top", "left", "right"];

impl ScrollLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a lock; the first one applies it to the body
    pub fn disable(&self, doc: &mut Document) {
        let first = {
            let mut state = self.state.borrow_mut();
            state.count += 1;
            state.count == 1
        };
        if first {
            let cleanup = lock_body(doc);
            self.state.borrow_mut().cleanup = Some(cleanup);
        }
    }

    /// Release a lock; the last one restores the body. No-op at zero.
    pub fn enable(&self, doc: &mut Document) {
        let cleanup = {
            let mut state = self.state.borrow_mut();
            if state.count == 0 {
                return;
            }
            state.count -= 1;
            if state.count > 0 {
                return;
            }
            state.cleanup.take()
        };
        if let Some(cleanup) = cleanup {
            cleanup(doc);
            tracing::debug!("body scroll restored");
        }
    }

    /// Drop every lock and restore the body now
    pub fn clear_all(&self, doc: &mut Document) {
        let cleanup = {
            let mut state = self.state.borrow_mut();
            state.count = 0;
            state.cleanup.take()
        };
        if let Some(cleanup) = cleanup {
            cleanup(doc);
        }
    }

    pub fn count(&self) -> usize {
        self.state.borrow().count
    }

    pub fn is_locked(&self) -> bool {
        self.count() > 0
    }
}

impl fmt::Debug for ScrollLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollLock").field("count", &self.count()).finish()
    }
}

fn lock_body(doc: &mut Document) -> Cleanup {
    let body = doc.body();
    let saved: Vec<(&'static str, Option<String>)> = SAVED_PROPERTIES.iter()
        .map(|&property| (property, doc.style(body, property).map(str::to_string)))
        .collect();

    // Measure before hiding overflow, which removes the scrollbar
    let scrollbar_width = doc.viewport().inner_width - doc.document_client_width();
    let (scroll_x, scroll_y) = (doc.viewport().scroll_x, doc.viewport().scroll_y);
    let ios_like = doc.viewport().platform == Platform::IosLike;

    doc.set_style(body, "overflow", "hidden");
    if scrollbar_width > 0.0 {
        let existing = doc.style(body, "padding-right").map_or(0.0, parse_px);
        doc.set_style(body, "padding-right", &format!("{}px", existing + scrollbar_width));
    }
    if ios_like {
        doc.set_style(body, "position", "fixed");
        doc.set_style(body, "top", &format!("-{scroll_y}px"));
        doc.set_style(body, "left", &format!("-{scroll_x}px"));
        doc.set_style(body, "right", "0px");
    }
    tracing::debug!(scrollbar_width, ios_like, "body scroll locked");

    Box::new(move |doc: &mut Document| {
        let body = doc.body();
        for (property, value) in saved {
            match value {
                Some(value) => {
                    doc.set_style(body, property, &value);
                }
                None => {
                    doc.remove_style(body, property);
                }
            }
        }
        if ios_like {
            doc.scroll_to(scroll_x, scroll_y);
        }
    })
}

/// Leading number of a CSS length, 0 if there is none
fn parse_px(value: &str) -> f64 {
    value.trim().trim_end_matches("px").trim().parse().unwrap_or(0.0)
}
