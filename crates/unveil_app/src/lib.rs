//! Unveil Page Animator
//!
//! Wires a page for scroll-driven and pointer-driven animation and keeps it
//! running for the lifetime of the page.
//!
//! # Example
//!
//! ```ignore
//! use unveil_app::prelude::*;
//!
//! fn start(document: SharedDocument, engine: SharedEngine, backend: Box<dyn SmoothScrollBackend>) -> Result<PageAnimator> {
//!     let config = UnveilConfig::load_from_dir(Path::new("."))?;
//!     let mut animator = PageAnimator::new(config, document, engine, backend);
//!     let report = animator.init()?;
//!     for err in &report.errors {
//!         eprintln!("not wired: {}", err);
//!     }
//!     Ok(animator)
//! }
//! ```

mod animator;
mod config;
mod error;
mod scan;

#[cfg(test)]
mod tests;

pub use animator::{
    AnimatorState, InitReport, NavLink, PageAnimator, LOW_PERFORMANCE_CLASS, MOBILE_CLASS,
    REDUCED_MOTION_CLASS,
};
pub use config::{UnveilConfig, CONFIG_FILE};
pub use error::{Result, UnveilError};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::animator::{InitReport, PageAnimator};
    pub use crate::config::UnveilConfig;
    pub use crate::error::{Result, UnveilError};

    pub use unveil_animation::{AnimationProfile, AnimationSettings, SharedEngine, TweenEngine};
    pub use unveil_platform::{
        Document, PageEvent, PointerEvent, SharedDocument, SmoothScrollBackend,
    };
}
