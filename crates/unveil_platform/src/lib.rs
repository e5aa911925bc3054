//! Unveil Platform Abstraction Layer
//!
//! Platform-agnostic traits and types shared by every Unveil crate.
//!
//! # Architecture
//!
//! - [`Document`] - selector queries, attributes, styles, geometry,
//!   intersection observation and window-level queries
//! - [`PageEvent`] - the typed event stream the core reacts to
//! - [`SmoothScrollBackend`] / [`SmoothScroll`] - the smooth-scroll engine seam
//! - [`Rect`], [`Point`], [`Size`] - document-space geometry
//!
//! # Platform Implementations
//!
//! - `unveil_platform_headless` - in-memory document for simulation and tests
//!
//! # Example
//!
//! ```ignore
//! use unveil_platform::prelude::*;
//!
//! fn hero_top(doc: &dyn Document) -> Option<f32> {
//!     let hero = doc.query(".hero")?;
//!     doc.bounding_rect(hero).map(|r| r.top())
//! }
//! ```

mod document;
mod error;
mod event;
mod geometry;
mod smooth_scroll;

// Re-export all public types
pub use document::{
    Document, Fragment, IntersectionRecord, NodeId, ObserverOptions, SharedDocument,
};
pub use error::{PlatformError, Result};
pub use event::{PageEvent, PointerEvent};
pub use geometry::{Point, Rect, Size};
pub use smooth_scroll::{
    DeviceScrollConfig, GestureDirection, ScrollTarget, ScrollToOptions, SmoothScroll,
    SmoothScrollBackend, SmoothScrollConfig,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::document::{
        Document, Fragment, IntersectionRecord, NodeId, ObserverOptions, SharedDocument,
    };
    pub use crate::error::{PlatformError, Result};
    pub use crate::event::{PageEvent, PointerEvent};
    pub use crate::geometry::{Point, Rect, Size};
    pub use crate::smooth_scroll::{
        ScrollTarget, ScrollToOptions, SmoothScroll, SmoothScrollBackend, SmoothScrollConfig,
    };
}
