//! Unveil Animation Model
//!
//! Everything about *what* plays and *how fast*: presets, easing ids,
//! stagger scheduling, counters, text splitting and adaptive playback.
//! Tweens are executed by an external engine behind [`TweenEngine`].
//!
//! # Features
//!
//! - **Preset Catalog**: fade, slides, scale, stagger, text-reveal, counter, parallax
//! - **Parameter Maps**: ordered key/value overrides, override wins per key
//! - **Adaptive Playback**: full / reduced / near-static from fps and motion preference
//! - **Device Tuning**: shorter timings and halved parallax on handheld devices
//! - **AnimationContext**: explicit per-page state, no globals

pub mod context;
pub mod counter;
pub mod device;
pub mod easing;
pub mod engine;
pub mod error;
pub mod params;
pub mod playback;
pub mod presets;
pub mod settings;
pub mod stagger;
pub mod text_split;

pub use context::AnimationContext;
pub use counter::{Counter, CounterDisplay};
pub use device::{DeviceClass, DeviceProfile, SMARTPHONE_BREAKPOINT, TABLET_BREAKPOINT};
pub use easing::Easing;
pub use engine::{SharedEngine, Tween, TweenCallback, TweenEngine, TweenFrame, TweenId, TweenOptions};
pub use error::{AnimationError, Result};
pub use params::{ParamMap, ParamValue};
pub use playback::{
    FpsSampler, PlaybackController, PlaybackEvent, PlaybackMode, PlaybackState, HIGH_FPS, LOW_FPS,
};
pub use presets::{Motion, PresetCatalog, PresetDefinition, PresetKind, Timing};
pub use settings::{AnimationProfile, AnimationSettings};
pub use stagger::Stagger;
pub use text_split::SplitMode;
