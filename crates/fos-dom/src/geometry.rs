//! Geometry APIs
//!
//! DOMRect, getClientRects, offset dimensions and the viewport.

use crate::{Document, NodeId, Overflow};

/// DOMRect - rectangle geometry
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DOMRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DOMRect {
    /// Create empty rect
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with dimensions
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Zero-area rect
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 && self.height <= 0.0
    }
}

/// DOMRectList - collection of rects
#[derive(Debug, Clone, Default)]
pub struct DOMRectList {
    rects: Vec<DOMRect>,
}

impl DOMRectList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn length(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn item(&self, index: usize) -> Option<&DOMRect> {
        self.rects.get(index)
    }

    pub fn push(&mut self, rect: DOMRect) {
        self.rects.push(rect);
    }
}

/// Input platform, as far as scroll handling cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    #[default]
    Desktop,
    /// Touch platform with rubber-band scrolling that ignores `overflow: hidden`
    IosLike,
}

/// Window viewport
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub inner_width: f64,
    pub inner_height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
    /// Width of a classic (space-taking) vertical scrollbar
    pub scrollbar_width: f64,
    pub platform: Platform,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            inner_width: 1024.0,
            inner_height: 768.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            scrollbar_width: 15.0,
            platform: Platform::Desktop,
        }
    }
}

impl Document {
    /// Set an element's border box (as computed by layout)
    pub fn set_layout_rect(&mut self, id: NodeId, rect: DOMRect) -> bool {
        match self.tree.element_mut(id) {
            Some(elem) => {
                elem.rect = rect;
                true
            }
            None => false,
        }
    }

    /// Border box if the element is rendered
    pub fn layout_rect(&self, id: NodeId) -> Option<DOMRect> {
        if !self.is_rendered(id) {
            return None;
        }
        self.tree.element(id).map(|e| e.rect)
    }

    /// offsetWidth (0 when not rendered)
    pub fn offset_width(&self, id: NodeId) -> f64 {
        self.layout_rect(id).map_or(0.0, |r| r.width)
    }

    /// offsetHeight (0 when not rendered)
    pub fn offset_height(&self, id: NodeId) -> f64 {
        self.layout_rect(id).map_or(0.0, |r| r.height)
    }

    /// getClientRects - empty for unrendered or zero-area elements
    pub fn client_rects(&self, id: NodeId) -> DOMRectList {
        let mut list = DOMRectList::new();
        if let Some(rect) = self.layout_rect(id).filter(|r| !r.is_empty()) {
            list.push(rect);
        }
        list
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// clientWidth of the document element: the viewport minus the scrollbar,
    /// which disappears while the body clips its overflow
    pub fn document_client_width(&self) -> f64 {
        let scroll_hidden = self.computed_style(self.body())
            .is_some_and(|s| matches!(s.overflow_y, Overflow::Hidden | Overflow::Clip));
        if scroll_hidden {
            self.viewport.inner_width
        } else {
            (self.viewport.inner_width - self.viewport.scrollbar_width).max(0.0)
        }
    }

    /// Scroll the window
    pub fn scroll_to(&mut self, x: f64, y: f64) {
        self.viewport.scroll_x = x.max(0.0);
        self.viewport.scroll_y = y.max(0.0);
    }
}
