//! Stagger scheduling
//!
//! Per-target start offsets for a group sharing one tween. Targets start in
//! registration order, each `interval` seconds after the previous one.

/// Start offsets for a staggered tween
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Stagger {
    /// Delay before the first target starts (seconds)
    pub base_delay: f32,
    /// Delay between consecutive targets (seconds)
    pub interval: f32,
}

impl Stagger {
    pub fn new(base_delay: f32, interval: Option<f32>) -> Self {
        Self {
            base_delay,
            interval: interval.unwrap_or(0.0),
        }
    }

    /// Start offset of the target at `index`
    pub fn start_for(&self, index: usize) -> f32 {
        self.base_delay + self.interval * index as f32
    }

    /// Offset at which the last of `count` targets starts
    pub fn last_start(&self, count: usize) -> f32 {
        self.start_for(count.saturating_sub(1))
    }
}
