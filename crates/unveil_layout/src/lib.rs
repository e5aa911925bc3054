//! Unveil Layout Layer
//!
//! Decides *when* things animate based on where they are on the page.
//!
//! # Modules
//!
//! - [`viewport`] - trigger thresholds and the active viewport source
//! - [`trigger`] - one-shot reveal registry and trigger policy
//! - [`scroll`] - smooth-scroll setup with native fallback
//! - [`parallax`] - scroll-linked translation
//! - [`interactive`] - magnetic, tilt and hover effects
//!
//! # Example
//!
//! ```ignore
//! use unveil_layout::prelude::*;
//!
//! let scroll = ScrollCoordinator::init(doc.clone(), &mut backend, &config, false);
//! let mut triggers = TriggerRegistry::new(doc.clone(), engine.clone());
//! if let Some(element) = AnimatableElement::new(doc.borrow().query_all(".fade-in")) {
//!     triggers.register(element, &ctx, scroll.source())?;
//! }
//! triggers.evaluate(scroll.source());
//! ```

pub mod interactive;
pub mod parallax;
pub mod scroll;
pub mod trigger;
pub mod viewport;

pub use interactive::{Effect, HoverScale, HoverState, InteractionEffects};
pub use parallax::{scroll_progress, ParallaxItem, ParallaxLayer};
pub use scroll::{
    restore_native_scrolling, ScrollCoordinator, ScrollEvent, ScrollFallback, ScrollState,
    FAILED_CLASS, INITIALIZED_CLASS, SCROLL_CONTAINER_SELECTOR,
};
pub use trigger::{AnimatableElement, ElementKey, RevealAction, TriggerRegistry};
pub use viewport::{threshold_line, ViewportSource, DEFAULT_THRESHOLD};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::interactive::{Effect, HoverScale, InteractionEffects};
    pub use crate::parallax::ParallaxLayer;
    pub use crate::scroll::ScrollCoordinator;
    pub use crate::trigger::{AnimatableElement, TriggerRegistry};
    pub use crate::viewport::{ViewportSource, DEFAULT_THRESHOLD};
}
