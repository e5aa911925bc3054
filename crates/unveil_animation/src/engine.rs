//! Tween engine seam
//!
//! The core never interpolates for rendering. It describes tweens and hands
//! them to a [`TweenEngine`], which owns timing and drives the callbacks.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;
use unveil_platform::NodeId;

use crate::easing::Easing;
use crate::params::ParamMap;
use crate::presets::Motion;
use crate::stagger::Stagger;

/// Handle to a tween issued to the engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(u64);

impl TweenId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn to_raw(self) -> u64 {
        self.0
    }
}

/// Shared, single-threaded handle to the engine
pub type SharedEngine = Rc<RefCell<dyn TweenEngine>>;

/// Progress report passed to tween callbacks
#[derive(Clone, Debug, PartialEq)]
pub struct TweenFrame {
    /// Index of the target within the tween's target list
    pub target_index: usize,
    /// Eased progress in `[0, 1]` (may overshoot for elastic curves)
    pub progress: f32,
    /// Interpolated values for this target
    pub values: ParamMap,
}

pub type TweenCallback = Box<dyn FnMut(&TweenFrame)>;

/// Timing and callbacks of a tween
#[derive(Default)]
pub struct TweenOptions {
    /// Duration in seconds; `None` uses the engine default
    pub duration: Option<f32>,
    /// `None` uses the engine default
    pub ease: Option<Easing>,
    pub delay: f32,
    /// Per-target start increment in seconds
    pub stagger: Option<f32>,
    pub on_start: Option<TweenCallback>,
    pub on_update: Option<TweenCallback>,
    pub on_complete: Option<TweenCallback>,
}

impl TweenOptions {
    /// Per-target start offsets
    pub fn schedule(&self) -> Stagger {
        Stagger::new(self.delay, self.stagger)
    }
}

impl fmt::Debug for TweenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenOptions")
            .field("duration", &self.duration)
            .field("ease", &self.ease)
            .field("delay", &self.delay)
            .field("stagger", &self.stagger)
            .field("on_start", &self.on_start.is_some())
            .field("on_update", &self.on_update.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// One tween request
#[derive(Debug, Default)]
pub struct Tween {
    pub targets: SmallVec<[NodeId; 4]>,
    /// Start state; `None` tweens from the current state
    pub from: Option<ParamMap>,
    pub to: ParamMap,
    pub options: TweenOptions,
}

impl Tween {
    pub fn to(targets: impl IntoIterator<Item = NodeId>, to: ParamMap) -> Self {
        Self {
            targets: targets.into_iter().collect(),
            from: None,
            to,
            options: TweenOptions::default(),
        }
    }

    pub fn from_to(
        targets: impl IntoIterator<Item = NodeId>,
        from: ParamMap,
        to: ParamMap,
    ) -> Self {
        Self {
            from: Some(from),
            ..Self::to(targets, to)
        }
    }

    /// Tween for a resolved preset motion
    pub fn from_motion(targets: impl IntoIterator<Item = NodeId>, motion: &Motion) -> Self {
        Self {
            targets: targets.into_iter().collect(),
            from: motion.from.clone(),
            to: motion.to.clone(),
            options: TweenOptions {
                duration: Some(motion.timing.duration),
                ease: Some(motion.timing.ease),
                delay: motion.timing.delay,
                stagger: motion.timing.stagger,
                ..TweenOptions::default()
            },
        }
    }

    pub fn duration(mut self, seconds: f32) -> Self {
        self.options.duration = Some(seconds);
        self
    }

    pub fn ease(mut self, ease: Easing) -> Self {
        self.options.ease = Some(ease);
        self
    }

    pub fn delay(mut self, seconds: f32) -> Self {
        self.options.delay = seconds;
        self
    }

    pub fn stagger(mut self, seconds: f32) -> Self {
        self.options.stagger = Some(seconds);
        self
    }

    pub fn on_start(mut self, callback: impl FnMut(&TweenFrame) + 'static) -> Self {
        self.options.on_start = Some(Box::new(callback));
        self
    }

    pub fn on_update(mut self, callback: impl FnMut(&TweenFrame) + 'static) -> Self {
        self.options.on_update = Some(Box::new(callback));
        self
    }

    pub fn on_complete(mut self, callback: impl FnMut(&TweenFrame) + 'static) -> Self {
        self.options.on_complete = Some(Box::new(callback));
        self
    }

    /// Start offset of the target at `index`, in seconds
    pub fn start_for(&self, index: usize) -> f32 {
        self.options.schedule().start_for(index)
    }
}

/// The external tweening engine
pub trait TweenEngine {
    /// Schedule a tween
    fn play(&mut self, tween: Tween) -> TweenId;

    /// Apply values immediately, without a tween
    fn set(&mut self, targets: &[NodeId], values: &ParamMap);

    /// Global playback speed multiplier
    fn time_scale(&self) -> f32;

    fn set_time_scale(&mut self, scale: f32);

    /// Defaults applied to tweens that do not set their own
    fn set_defaults(&mut self, duration: f32, ease: Easing);

    /// Cancel every running and pending tween
    fn kill_all(&mut self);
}
