//! Smooth-scroll seam
//!
//! A smooth-scroll engine replaces native scrolling with an interpolated
//! proxy. It is created over a container node and reports its own scroll
//! position; the core falls back to native scrolling when creation fails.

use serde::{Deserialize, Serialize};

use crate::document::NodeId;
use crate::error::PlatformError;

/// Per-device smooth-scroll override
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceScrollConfig {
    pub smooth: bool,
    /// Widest viewport, in pixels, this override applies to
    pub breakpoint: f32,
}

/// Gesture axis for the scroll proxy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureDirection {
    #[default]
    Vertical,
    Horizontal,
}

/// Configuration handed to the smooth-scroll backend
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothScrollConfig {
    /// Attempt smooth scrolling at all
    pub smooth: bool,
    /// Interpolation factor per frame (0.0-1.0, lower = smoother)
    pub lerp: f32,
    /// Wheel delta multiplier
    pub multiplier: f32,
    pub touch_multiplier: f32,
    pub firefox_multiplier: f32,
    pub gesture_direction: GestureDirection,
    pub smartphone: DeviceScrollConfig,
    pub tablet: DeviceScrollConfig,
}

impl Default for SmoothScrollConfig {
    fn default() -> Self {
        Self {
            smooth: true,
            lerp: 0.1,
            multiplier: 1.0,
            touch_multiplier: 2.0,
            firefox_multiplier: 100.0,
            gesture_direction: GestureDirection::Vertical,
            smartphone: DeviceScrollConfig {
                smooth: false,
                breakpoint: 767.0,
            },
            tablet: DeviceScrollConfig {
                smooth: true,
                breakpoint: 1024.0,
            },
        }
    }
}

impl SmoothScrollConfig {
    /// Create config with smooth scrolling disabled
    pub fn disabled() -> Self {
        Self {
            smooth: false,
            ..Default::default()
        }
    }

    /// Whether smoothing applies at a viewport width
    pub fn smooth_for_width(&self, width: f32) -> bool {
        if width <= self.smartphone.breakpoint {
            self.smartphone.smooth
        } else if width <= self.tablet.breakpoint {
            self.tablet.smooth
        } else {
            self.smooth
        }
    }
}

/// Where `scroll_to` should land
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScrollTarget {
    Node(NodeId),
    Offset(f32),
}

/// Options for a programmatic scroll
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollToOptions {
    /// Pixels added to the target position
    pub offset: f32,
    pub duration_ms: u32,
    /// Cubic bezier control points (x1, y1, x2, y2)
    pub easing: [f32; 4],
}

impl Default for ScrollToOptions {
    fn default() -> Self {
        Self {
            offset: 0.0,
            duration_ms: 1000,
            easing: [0.25, 0.0, 0.35, 1.0],
        }
    }
}

/// A live smooth-scroll instance
pub trait SmoothScroll {
    /// Current proxy scroll position
    fn scroll_y(&self) -> f32;

    fn scroll_to(&mut self, target: ScrollTarget, options: &ScrollToOptions);

    /// Recompute content bounds after a layout change
    fn update(&mut self);

    /// Tear down and restore native scrolling
    fn destroy(&mut self);
}

/// Factory for smooth-scroll instances
pub trait SmoothScrollBackend {
    /// Create an instance over `container`
    fn create(
        &mut self,
        container: NodeId,
        config: &SmoothScrollConfig,
    ) -> Result<Box<dyn SmoothScroll>, PlatformError>;
}
