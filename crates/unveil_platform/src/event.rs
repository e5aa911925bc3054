//! Page events
//!
//! Everything the animation core reacts to arrives as a [`PageEvent`]. The
//! host (a browser binding, the headless simulator, or a test) translates
//! native callbacks into these values and feeds them in order.

use crate::document::{IntersectionRecord, NodeId};

/// Events delivered to the animation core
#[derive(Clone, Debug, PartialEq)]
pub enum PageEvent {
    /// Scroll position changed (smooth-scroll update or native scroll)
    Scroll {
        /// Current vertical scroll offset
        y: f32,
    },
    /// Viewport was resized
    Resize {
        /// New width in CSS pixels
        width: f32,
        /// New height in CSS pixels
        height: f32,
    },
    /// Animation frame tick
    Frame {
        /// Monotonic timestamp in milliseconds
        timestamp_ms: f64,
    },
    /// Pointer input over an element
    Pointer(PointerEvent),
    /// An element was clicked
    Click {
        node: NodeId,
    },
    /// Intersection change pushed by the native observer
    Intersection(IntersectionRecord),
    /// Page is being torn down
    Unload,
}

/// Pointer events targeted at a specific element
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// Pointer entered the element
    Entered { node: NodeId },
    /// Pointer moved within the element (viewport coordinates)
    Moved { node: NodeId, x: f32, y: f32 },
    /// Pointer left the element
    Left { node: NodeId },
}

impl PointerEvent {
    /// The element the event targets
    pub fn node(&self) -> NodeId {
        match *self {
            PointerEvent::Entered { node }
            | PointerEvent::Moved { node, .. }
            | PointerEvent::Left { node } => node,
        }
    }
}
