//! Animation context
//!
//! The per-page bundle of animation state, passed explicitly to everything
//! that issues tweens. One context per page load; nothing is global.

use crate::device::DeviceProfile;
use crate::engine::TweenEngine;
use crate::error::Result;
use crate::params::ParamMap;
use crate::playback::PlaybackController;
use crate::presets::{Motion, PresetCatalog};
use crate::settings::AnimationSettings;

/// Settings, catalog, playback and device state for one page
#[derive(Clone, Debug)]
pub struct AnimationContext {
    settings: AnimationSettings,
    catalog: PresetCatalog,
    playback: PlaybackController,
    device: DeviceProfile,
}

impl AnimationContext {
    /// Build the context; handheld devices get their tuned duration and ease
    pub fn new(settings: AnimationSettings, device: DeviceProfile) -> Self {
        let settings = match device.engine_defaults() {
            Some((duration, ease)) => AnimationSettings {
                duration,
                ease,
                ..settings
            },
            None => settings,
        };
        Self {
            catalog: PresetCatalog::new(&settings),
            settings,
            playback: PlaybackController::new(),
            device,
        }
    }

    pub fn settings(&self) -> &AnimationSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &PresetCatalog {
        &self.catalog
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut PlaybackController {
        &mut self.playback
    }

    pub fn device(&self) -> &DeviceProfile {
        &self.device
    }

    /// Resolve a named preset with overrides
    pub fn motion(&self, preset: &str, overrides: &ParamMap) -> Result<Motion> {
        self.catalog.motion(preset, overrides)
    }

    /// Push the (possibly device-tuned) settings as engine-wide defaults
    pub fn apply_engine_defaults(&self, engine: &mut dyn TweenEngine) {
        engine.set_defaults(self.settings.duration, self.settings.ease);
    }
}

impl Default for AnimationContext {
    fn default() -> Self {
        Self::new(AnimationSettings::default(), DeviceProfile::default())
    }
}
