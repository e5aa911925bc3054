//! Easing curves
//!
//! Ease identifiers follow the tween engine's naming (`power3.out`,
//! `elastic.out(1, 0.3)`, `none`, ...). The curves themselves are only
//! evaluated by headless simulation; a real engine receives the identifier.

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnimationError;

/// Easing function identifier
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Easing {
    /// No easing (`none`)
    Linear,
    /// Cubic ease-in (`power2.in`)
    Power2In,
    /// Cubic ease-out (`power2.out`)
    Power2Out,
    /// Quartic ease-in (`power3.in`)
    Power3In,
    /// Quartic ease-out (`power3.out`)
    Power3Out,
    /// Elastic overshoot settling at the end (`elastic.out(amplitude, period)`)
    ElasticOut { amplitude: f32, period: f32 },
    /// CSS-style cubic bezier with control points (x1, y1, x2, y2)
    CubicBezier(f32, f32, f32, f32),
}

impl Easing {
    /// `elastic.out(1, 0.3)`, the spring-back used by magnetic buttons
    pub const ELASTIC_OUT: Easing = Easing::ElasticOut {
        amplitude: 1.0,
        period: 0.3,
    };

    /// Evaluate the curve at `t` in `[0, 1]`
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Easing::Linear => t,
            Easing::Power2In => t * t * t,
            Easing::Power2Out => 1.0 - (1.0 - t).powi(3),
            Easing::Power3In => t * t * t * t,
            Easing::Power3Out => 1.0 - (1.0 - t).powi(4),
            Easing::ElasticOut { amplitude, period } => {
                if t == 0.0 || t == 1.0 {
                    return t;
                }
                let amplitude = amplitude.max(1.0);
                let shift = period / (2.0 * PI) * (1.0 / amplitude).asin();
                amplitude * 2f32.powf(-10.0 * t) * ((t - shift) * (2.0 * PI) / period).sin() + 1.0
            }
            Easing::CubicBezier(x1, y1, x2, y2) => {
                let param = solve_bezier_param(x1, x2, t);
                bezier_axis(y1, y2, param)
            }
        }
    }
}

impl Default for Easing {
    fn default() -> Self {
        Easing::Power3Out
    }
}

fn bezier_axis(p1: f32, p2: f32, t: f32) -> f32 {
    let inv = 1.0 - t;
    3.0 * inv * inv * t * p1 + 3.0 * inv * t * t * p2 + t * t * t
}

/// Find the curve parameter whose x coordinate is `x` (bisection)
fn solve_bezier_param(x1: f32, x2: f32, x: f32) -> f32 {
    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    for _ in 0..32 {
        let mid = (lo + hi) / 2.0;
        if bezier_axis(x1, x2, mid) < x {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    (lo + hi) / 2.0
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => f.write_str("none"),
            Easing::Power2In => f.write_str("power2.in"),
            Easing::Power2Out => f.write_str("power2.out"),
            Easing::Power3In => f.write_str("power3.in"),
            Easing::Power3Out => f.write_str("power3.out"),
            Easing::ElasticOut { amplitude, period } => {
                write!(f, "elastic.out({}, {})", amplitude, period)
            }
            Easing::CubicBezier(x1, y1, x2, y2) => {
                write!(f, "cubic-bezier({}, {}, {}, {})", x1, y1, x2, y2)
            }
        }
    }
}

/// Parse the comma-separated numbers inside `name(...)`
fn parse_args(s: &str, name: &str) -> Option<Vec<f32>> {
    let inner = s.strip_prefix(name)?.strip_prefix('(')?.strip_suffix(')')?;
    inner
        .split(',')
        .map(|part| part.trim().parse::<f32>().ok())
        .collect()
}

impl FromStr for Easing {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "none" | "linear" => return Ok(Easing::Linear),
            "power2.in" => return Ok(Easing::Power2In),
            "power2.out" | "power2" => return Ok(Easing::Power2Out),
            "power3.in" => return Ok(Easing::Power3In),
            "power3.out" | "power3" => return Ok(Easing::Power3Out),
            "elastic.out" | "elastic" => return Ok(Easing::ELASTIC_OUT),
            _ => {}
        }

        if let Some(args) = parse_args(s, "elastic.out") {
            return match args.as_slice() {
                [amplitude] => Ok(Easing::ElasticOut {
                    amplitude: *amplitude,
                    period: 0.3,
                }),
                [amplitude, period] => Ok(Easing::ElasticOut {
                    amplitude: *amplitude,
                    period: *period,
                }),
                _ => Err(AnimationError::InvalidEasing(s.to_string())),
            };
        }

        if let Some(args) = parse_args(s, "cubic-bezier") {
            if let [x1, y1, x2, y2] = args.as_slice() {
                return Ok(Easing::CubicBezier(*x1, *y1, *x2, *y2));
            }
        }

        Err(AnimationError::InvalidEasing(s.to_string()))
    }
}

impl TryFrom<String> for Easing {
    type Error = AnimationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Easing> for String {
    fn from(easing: Easing) -> Self {
        easing.to_string()
    }
}
