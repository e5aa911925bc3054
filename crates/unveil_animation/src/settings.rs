//! Shared animation settings
//!
//! One settings record supplies the default duration, ease and stagger
//! interval for every preset that does not set its own.

use serde::{Deserialize, Serialize};

use crate::easing::Easing;

/// Global animation defaults
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// Default duration in seconds
    pub duration: f32,
    /// Default ease curve
    pub ease: Easing,
    /// Default per-element stagger interval in seconds
    pub stagger: f32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            duration: 1.2,
            ease: Easing::Power3Out,
            stagger: 0.1,
        }
    }
}

/// Which page-wiring profile to run
///
/// `Full` drives smooth scrolling, text reveals, counters and parallax.
/// `Simple` is the lightweight path: native scrolling only, plain fades and
/// hover scaling, with its own timing defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationProfile {
    #[default]
    Full,
    Simple,
}

impl AnimationProfile {
    pub fn name(&self) -> &'static str {
        match self {
            AnimationProfile::Full => "full",
            AnimationProfile::Simple => "simple",
        }
    }

    /// Whether this profile attempts smooth scrolling at all
    pub fn uses_smooth_scroll(&self) -> bool {
        matches!(self, AnimationProfile::Full)
    }
}
