//! Adaptive playback
//!
//! Scales global playback speed from measured frame rate and the declared
//! reduced-motion preference.
//!
//! # State Machine
//!
//! ```text
//! Full ──fps < 30──▶ Reduced ──fps > 50──▶ Full
//!   │                   │
//!   └──reduced motion───┴──────────────▶ NearStatic (terminal)
//! ```
//!
//! Samples in `30..=50` never cause a transition, so the mode holds steady
//! while the frame rate hovers in the middle band.

use tracing::{debug, info, warn};

use crate::engine::TweenEngine;

/// Frame rate below which playback is reduced
pub const LOW_FPS: u32 = 30;
/// Frame rate above which full playback is restored
pub const HIGH_FPS: u32 = 50;
/// Length of one sampling window in milliseconds
pub const SAMPLE_WINDOW_MS: f64 = 1000.0;

/// Global playback mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlaybackMode {
    #[default]
    Full,
    Reduced,
    /// Reduced-motion preference; held for the whole session
    NearStatic,
}

/// Inputs to the playback state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// A completed frame-rate sample
    FpsSample(u32),
    /// The user prefers reduced motion
    ReducedMotion,
}

impl PlaybackMode {
    /// Engine time scale for this mode
    pub fn time_scale(&self) -> f32 {
        match self {
            PlaybackMode::Full => 1.0,
            PlaybackMode::Reduced => 0.8,
            PlaybackMode::NearStatic => 0.01,
        }
    }

    pub fn is_low_performance(&self) -> bool {
        matches!(self, PlaybackMode::Reduced)
    }

    /// Handle an event and return the new mode, or None if no transition
    pub fn on_event(&self, event: PlaybackEvent) -> Option<Self> {
        match (self, event) {
            // NearStatic is terminal
            (PlaybackMode::NearStatic, _) => None,
            (_, PlaybackEvent::ReducedMotion) => Some(PlaybackMode::NearStatic),

            (PlaybackMode::Full, PlaybackEvent::FpsSample(fps)) if fps < LOW_FPS => {
                Some(PlaybackMode::Reduced)
            }
            (PlaybackMode::Reduced, PlaybackEvent::FpsSample(fps)) if fps > HIGH_FPS => {
                Some(PlaybackMode::Full)
            }
            _ => None,
        }
    }
}

/// Counts frames and reports a rounded fps once per sampling window
#[derive(Clone, Copy, Debug, Default)]
pub struct FpsSampler {
    window_start: Option<f64>,
    frames: u32,
}

impl FpsSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame; returns the fps when a window closes
    ///
    /// The first frame opens the window and is not counted.
    pub fn frame(&mut self, timestamp_ms: f64) -> Option<u32> {
        let Some(start) = self.window_start else {
            self.window_start = Some(timestamp_ms);
            return None;
        };

        self.frames += 1;
        let elapsed = timestamp_ms - start;
        if elapsed < SAMPLE_WINDOW_MS {
            return None;
        }

        let fps = (self.frames as f64 * 1000.0 / elapsed).round() as u32;
        self.frames = 0;
        self.window_start = Some(timestamp_ms);
        Some(fps)
    }
}

/// Observable playback state
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackState {
    pub mode: PlaybackMode,
    /// Last measured frame rate
    pub fps: Option<u32>,
    pub time_scale: f32,
    pub low_performance: bool,
    pub reduced_motion: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            mode: PlaybackMode::Full,
            fps: None,
            time_scale: 1.0,
            low_performance: false,
            reduced_motion: false,
        }
    }
}

/// Owns the playback state and pushes time-scale changes to the engine
#[derive(Clone, Debug, Default)]
pub struct PlaybackController {
    state: PlaybackState,
    sampler: FpsSampler,
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn mode(&self) -> PlaybackMode {
        self.state.mode
    }

    /// Enter near-static playback for the rest of the session
    pub fn apply_reduced_motion(&mut self, engine: &mut dyn TweenEngine) -> Option<PlaybackMode> {
        self.state.reduced_motion = true;
        let mode = self.transition(PlaybackEvent::ReducedMotion, engine);
        if mode.is_some() {
            info!("Reduced motion preferred, playback near-static");
        }
        mode
    }

    /// Feed one animation frame
    pub fn on_frame(
        &mut self,
        timestamp_ms: f64,
        engine: &mut dyn TweenEngine,
    ) -> Option<PlaybackMode> {
        if self.state.reduced_motion {
            return None;
        }
        let fps = self.sampler.frame(timestamp_ms)?;
        self.record_fps(fps, engine)
    }

    /// Feed a completed fps sample
    pub fn record_fps(&mut self, fps: u32, engine: &mut dyn TweenEngine) -> Option<PlaybackMode> {
        if self.state.reduced_motion {
            return None;
        }
        self.state.fps = Some(fps);
        debug!("FPS sample: {}", fps);
        let mode = self.transition(PlaybackEvent::FpsSample(fps), engine)?;
        match mode {
            PlaybackMode::Reduced => warn!("Low FPS detected ({}), reducing animations", fps),
            _ => info!("FPS recovered ({}), restoring animations", fps),
        }
        Some(mode)
    }

    fn transition(
        &mut self,
        event: PlaybackEvent,
        engine: &mut dyn TweenEngine,
    ) -> Option<PlaybackMode> {
        let next = self.state.mode.on_event(event)?;
        self.state.mode = next;
        self.state.time_scale = next.time_scale();
        self.state.low_performance = next.is_low_performance();
        engine.set_time_scale(self.state.time_scale);
        Some(next)
    }
}
