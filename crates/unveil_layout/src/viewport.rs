//! Viewport sources
//!
//! Exactly one [`ViewportSource`] is active per page. It answers where the
//! viewport currently is and whether an element has crossed its trigger
//! line. With native intersection the document pushes crossings to us; with
//! a smooth-scroll proxy the scroll offset comes from the proxy's updates
//! and crossings are recomputed on every one of them.

use unveil_platform::{Document, NodeId, Rect};

/// Fraction of the viewport height at which elements trigger ("top 80%")
pub const DEFAULT_THRESHOLD: f32 = 0.8;

/// Y coordinate of the trigger line, relative to the viewport top
pub fn threshold_line(viewport_height: f32, threshold: f32) -> f32 {
    viewport_height * threshold
}

/// Where the scroll position comes from
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewportSource {
    /// Native document scrolling with push-delivered intersection records
    NativeIntersection,
    /// Smooth-scroll proxy; the document itself does not scroll
    SmoothScrollProxy { scroll_y: f32 },
}

impl ViewportSource {
    pub fn is_smooth(&self) -> bool {
        matches!(self, ViewportSource::SmoothScrollProxy { .. })
    }

    pub fn scroll_y(&self, doc: &dyn Document) -> f32 {
        match *self {
            ViewportSource::NativeIntersection => doc.scroll_y(),
            ViewportSource::SmoothScrollProxy { scroll_y } => scroll_y,
        }
    }

    /// Record a scroll update from the proxy; native sources read the document
    pub fn set_scroll(&mut self, y: f32) {
        if let ViewportSource::SmoothScrollProxy { scroll_y } = self {
            *scroll_y = y;
        }
    }

    /// Element rect relative to the viewport
    pub fn viewport_rect(&self, doc: &dyn Document, node: NodeId) -> Option<Rect> {
        let scroll_y = self.scroll_y(doc);
        doc.document_rect(node).map(|r| r.to_viewport(scroll_y))
    }

    /// Top edge at or above the trigger line
    pub fn is_within_threshold(&self, doc: &dyn Document, node: NodeId, threshold: f32) -> bool {
        let line = threshold_line(doc.viewport().height, threshold);
        self.viewport_rect(doc, node)
            .is_some_and(|rect| rect.top() <= line)
    }

    /// Any part of the element is on screen
    pub fn intersects_viewport(&self, doc: &dyn Document, node: NodeId) -> bool {
        let height = doc.viewport().height;
        self.viewport_rect(doc, node)
            .is_some_and(|rect| rect.top() < height && rect.bottom() > 0.0)
    }
}
