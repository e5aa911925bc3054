//! Unveil Headless Platform
//!
//! In-memory implementations of the Unveil collaborator traits, used by the
//! `unveil` simulator and by integration tests.
//!
//! - [`MemoryDocument`] - node tree, selector engine, intersection observer
//! - [`RecordingEngine`] - records tweens and simulates their playback
//! - [`HeadlessSmoothScrollBackend`] - smooth-scroll proxy with a failure switch
//! - [`PageFixture`] - TOML page descriptions

pub mod document;
pub mod engine;
pub mod fixture;
pub mod selector;
pub mod smooth_scroll;

pub use document::{MemoryDocument, NodeKey, NodeSpec};
pub use engine::{RecordingEngine, TweenRecord};
pub use fixture::{FixtureError, PageFixture};
pub use selector::{SelectorError, SelectorList, SelectorTarget};
pub use smooth_scroll::{
    HeadlessSmoothScroll, HeadlessSmoothScrollBackend, SharedScrollLog, SmoothScrollLog,
};
