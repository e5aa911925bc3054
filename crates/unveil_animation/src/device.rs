//! Device classification
//!
//! User-agent and viewport-width based classification used to tune timing
//! on handheld devices and to pick the smooth-scroll per-device settings.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::easing::Easing;

const MOBILE_PATTERN: &str = r"(?i)Android|webOS|iPhone|iPad|iPod|BlackBerry|IEMobile|Opera Mini";
const TABLET_PATTERN: &str = r"(?i)iPad|Android|Silk|Kindle|Mobile";

/// Viewport width at or below which a device counts as a smartphone
pub const SMARTPHONE_BREAKPOINT: f32 = 767.0;
/// Viewport width at or below which a device counts as a tablet
pub const TABLET_BREAKPOINT: f32 = 1024.0;
/// Minimum width for a tablet user agent to be treated as a tablet
const TABLET_MIN_WIDTH: f32 = 768.0;

fn matches(cell: &'static OnceLock<Option<Regex>>, pattern: &str, haystack: &str) -> bool {
    cell.get_or_init(|| Regex::new(pattern).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(haystack))
}

fn is_mobile_agent(user_agent: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    matches(&RE, MOBILE_PATTERN, user_agent)
}

fn is_tablet_agent(user_agent: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    matches(&RE, TABLET_PATTERN, user_agent)
}

/// Width-based device class
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeviceClass {
    Smartphone,
    Tablet,
    #[default]
    Desktop,
}

impl DeviceClass {
    pub fn from_width(width: f32) -> Self {
        if width <= SMARTPHONE_BREAKPOINT {
            DeviceClass::Smartphone
        } else if width <= TABLET_BREAKPOINT {
            DeviceClass::Tablet
        } else {
            DeviceClass::Desktop
        }
    }
}

/// Everything known about the device at initialization
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeviceProfile {
    /// User agent looks like a handheld device
    pub is_mobile: bool,
    /// User agent looks like a tablet and the viewport is wide enough
    pub is_tablet: bool,
    pub class: DeviceClass,
}

impl DeviceProfile {
    pub fn detect(user_agent: &str, viewport_width: f32) -> Self {
        let profile = Self {
            is_mobile: is_mobile_agent(user_agent),
            is_tablet: is_tablet_agent(user_agent) && viewport_width > TABLET_MIN_WIDTH,
            class: DeviceClass::from_width(viewport_width),
        };
        debug!(
            "Device profile: mobile={} tablet={} class={:?}",
            profile.is_mobile, profile.is_tablet, profile.class
        );
        profile
    }

    /// Engine-wide defaults for this device, if they differ from the settings
    pub fn engine_defaults(&self) -> Option<(f32, Easing)> {
        self.is_mobile.then_some((0.6, Easing::Power2Out))
    }

    /// Multiplier applied to parallax speeds
    pub fn parallax_factor(&self) -> f32 {
        if self.is_mobile {
            0.5
        } else {
            1.0
        }
    }
}
