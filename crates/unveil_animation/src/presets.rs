//! Preset catalog
//!
//! Named, immutable parameter sets built once from the shared
//! [`AnimationSettings`]. A preset resolves, together with per-call
//! overrides, into a [`Motion`]: the from/to states and timing handed to the
//! tween engine.
//!
//! # Example
//!
//! ```rust
//! use unveil_animation::{AnimationSettings, ParamMap, PresetCatalog};
//!
//! let catalog = PresetCatalog::new(&AnimationSettings::default());
//! let motion = catalog
//!     .motion("fade", &ParamMap::new().with("y", 30.0))
//!     .unwrap();
//! assert_eq!(motion.from.unwrap().number("y"), Some(30.0));
//! assert!(catalog.resolve("fade-up").is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::params::{ParamMap, ParamValue};
use crate::settings::AnimationSettings;

/// The supported preset kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PresetKind {
    Fade,
    SlideLeft,
    SlideRight,
    Scale,
    Stagger,
    TextReveal,
    Counter,
    Parallax,
}

impl PresetKind {
    pub const ALL: [PresetKind; 8] = [
        PresetKind::Fade,
        PresetKind::SlideLeft,
        PresetKind::SlideRight,
        PresetKind::Scale,
        PresetKind::Stagger,
        PresetKind::TextReveal,
        PresetKind::Counter,
        PresetKind::Parallax,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PresetKind::Fade => "fade",
            PresetKind::SlideLeft => "slide-left",
            PresetKind::SlideRight => "slide-right",
            PresetKind::Scale => "scale",
            PresetKind::Stagger => "stagger",
            PresetKind::TextReveal => "text-reveal",
            PresetKind::Counter => "counter",
            PresetKind::Parallax => "parallax",
        }
    }

    /// Continuous presets follow scroll position instead of firing once
    pub fn is_continuous(&self) -> bool {
        matches!(self, PresetKind::Parallax)
    }
}

impl fmt::Display for PresetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PresetKind {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self> {
        PresetKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| AnimationError::UnknownPreset(s.to_string()))
    }
}

/// Timing handed to the tween engine
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timing {
    /// Duration in seconds
    pub duration: f32,
    pub ease: Easing,
    /// Delay before start in seconds
    pub delay: f32,
    /// Per-target delay increment in seconds
    pub stagger: Option<f32>,
}

/// A fully resolved animation: what to tween from, to, and how
#[derive(Clone, Debug, PartialEq)]
pub struct Motion {
    pub kind: PresetKind,
    /// Start state, `None` to tween from the current state
    pub from: Option<ParamMap>,
    pub to: ParamMap,
    pub timing: Timing,
    /// Merged defaults and overrides, including control keys
    pub params: ParamMap,
}

/// Immutable catalog entry
#[derive(Clone, Debug, PartialEq)]
pub struct PresetDefinition {
    kind: PresetKind,
    defaults: ParamMap,
}

impl PresetDefinition {
    pub fn kind(&self) -> PresetKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn defaults(&self) -> &ParamMap {
        &self.defaults
    }

    /// Merge overrides into the defaults and build the motion
    pub fn resolve(&self, overrides: &ParamMap) -> Result<Motion> {
        let params = self.defaults.merged(overrides);
        let timing = timing_from(&params)?;

        let (from, to) = match self.kind {
            PresetKind::Fade
            | PresetKind::SlideLeft
            | PresetKind::SlideRight
            | PresetKind::Scale
            | PresetKind::Stagger => {
                let (from, to) = entry_states(&params);
                (Some(from), to)
            }
            PresetKind::TextReveal => (
                Some(ParamMap::new().with("y", ParamValue::Percent(100.0))),
                ParamMap::new().with("y", ParamValue::Percent(0.0)),
            ),
            PresetKind::Counter => {
                let target = required_number(&params, "target")?;
                (
                    Some(ParamMap::new().with("value", 0.0)),
                    ParamMap::new().with("value", target),
                )
            }
            PresetKind::Parallax => {
                let speed = required_number(&params, "speed")?;
                (None, ParamMap::new().with("yPercent", -50.0 * speed))
            }
        };

        Ok(Motion {
            kind: self.kind,
            from,
            to,
            timing,
            params,
        })
    }
}

fn required_number(params: &ParamMap, key: &str) -> Result<f32> {
    params
        .number(key)
        .ok_or_else(|| AnimationError::InvalidParameter {
            key: key.to_string(),
            reason: "expected a number".to_string(),
        })
}

fn timing_from(params: &ParamMap) -> Result<Timing> {
    let duration = required_number(params, "duration")?;
    if duration < 0.0 {
        return Err(AnimationError::InvalidParameter {
            key: "duration".to_string(),
            reason: format!("must not be negative, got {}", duration),
        });
    }
    let ease = match params.get("ease") {
        Some(ParamValue::Text(id)) => id.parse()?,
        Some(other) => return Err(AnimationError::InvalidEasing(other.to_string())),
        None => Easing::default(),
    };
    Ok(Timing {
        duration,
        ease,
        delay: params.number("delay").unwrap_or(0.0),
        stagger: params.number("stagger"),
    })
}

/// Opacity fade plus whichever offsets are present, collapsing to rest
fn entry_states(params: &ParamMap) -> (ParamMap, ParamMap) {
    let mut from = ParamMap::new().with("opacity", 0.0);
    let mut to = ParamMap::new().with("opacity", 1.0);
    for key in ["x", "y"] {
        if let Some(offset) = params.get(key) {
            from.insert(key, offset.clone());
            to.insert(key, 0.0);
        }
    }
    if let Some(scale) = params.get("scale") {
        from.insert("scale", scale.clone());
        to.insert("scale", 1.0);
    }
    (from, to)
}

/// The immutable preset catalog
#[derive(Clone, Debug)]
pub struct PresetCatalog {
    definitions: Vec<PresetDefinition>,
}

impl PresetCatalog {
    /// Build the catalog from the shared settings
    pub fn new(settings: &AnimationSettings) -> Self {
        let base = ParamMap::new()
            .with("duration", settings.duration)
            .with("ease", settings.ease.to_string());

        let definitions = PresetKind::ALL
            .into_iter()
            .map(|kind| {
                let defaults = match kind {
                    PresetKind::Fade => base.clone().with("y", 50.0),
                    PresetKind::SlideLeft => base.clone().with("x", -100.0),
                    PresetKind::SlideRight => base.clone().with("x", 100.0),
                    PresetKind::Scale => base.clone().with("scale", 0.8),
                    PresetKind::Stagger => base
                        .clone()
                        .with("y", 50.0)
                        .with("stagger", settings.stagger),
                    PresetKind::TextReveal => ParamMap::new()
                        .with("duration", 1.5)
                        .with("ease", Easing::Power3Out.to_string())
                        .with("stagger", 0.05),
                    PresetKind::Counter => ParamMap::new()
                        .with("duration", 2.0)
                        .with("ease", Easing::Power2Out.to_string())
                        .with("target", 0.0)
                        .with("suffix", ParamValue::Text(String::new())),
                    PresetKind::Parallax => ParamMap::new()
                        .with("duration", settings.duration)
                        .with("ease", Easing::Linear.to_string())
                        .with("speed", 0.5),
                };
                PresetDefinition { kind, defaults }
            })
            .collect();

        Self { definitions }
    }

    /// Look a preset up by name
    pub fn resolve(&self, name: &str) -> Result<&PresetDefinition> {
        let kind: PresetKind = name.parse()?;
        Ok(self.definition(kind))
    }

    /// Definition for a known kind
    pub fn definition(&self, kind: PresetKind) -> &PresetDefinition {
        // Every kind is inserted by `new`
        self.definitions
            .iter()
            .find(|d| d.kind == kind)
            .unwrap_or(&self.definitions[0])
    }

    /// Resolve a preset by name and build its motion
    pub fn motion(&self, name: &str, overrides: &ParamMap) -> Result<Motion> {
        self.resolve(name)?.resolve(overrides)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PresetDefinition> {
        self.definitions.iter()
    }
}

impl Default for PresetCatalog {
    fn default() -> Self {
        Self::new(&AnimationSettings::default())
    }
}
