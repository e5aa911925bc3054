//! Page animator configuration
//!
//! Loaded from `unveil.toml`. Every table and key is optional:
//!
//! ```toml
//! profile = "full"
//! threshold = 0.8
//!
//! [animation]
//! duration = 1.2
//! ease = "power3.out"
//! stagger = 0.1
//!
//! [smooth_scroll]
//! lerp = 0.1
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use unveil_animation::{AnimationProfile, AnimationSettings};
use unveil_layout::DEFAULT_THRESHOLD;
use unveil_platform::SmoothScrollConfig;

use crate::error::{Result, UnveilError};

/// Name of the configuration file looked up by [`UnveilConfig::load_from_dir`]
pub const CONFIG_FILE: &str = "unveil.toml";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnveilConfig {
    /// Which page wiring to run
    pub profile: AnimationProfile,
    /// Default trigger line as a fraction of the viewport height
    pub threshold: f32,
    #[serde(rename = "animation")]
    pub settings: AnimationSettings,
    pub smooth_scroll: SmoothScrollConfig,
}

impl Default for UnveilConfig {
    fn default() -> Self {
        Self {
            profile: AnimationProfile::Full,
            threshold: DEFAULT_THRESHOLD,
            settings: AnimationSettings::default(),
            smooth_scroll: SmoothScrollConfig::default(),
        }
    }
}

impl UnveilConfig {
    /// Parse a TOML document
    pub fn parse(source: &str) -> Result<Self> {
        let config: UnveilConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `unveil.toml` from `path`, or defaults when the file is absent
    pub fn load_from_dir(path: &Path) -> Result<Self> {
        let config_path = path.join(CONFIG_FILE);
        if !config_path.exists() {
            debug!("No {} in {}, using defaults", CONFIG_FILE, path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&config_path)?;
        Self::parse(&content)
    }

    fn validate(&self) -> Result<()> {
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(UnveilError::InvalidConfig(format!(
                "threshold must be in (0, 1], got {}",
                self.threshold
            )));
        }
        if self.settings.duration < 0.0 {
            return Err(UnveilError::InvalidConfig(format!(
                "animation.duration must not be negative, got {}",
                self.settings.duration
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unveil_animation::Easing;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(UnveilConfig::parse("").unwrap(), UnveilConfig::default());
    }

    #[test]
    fn test_partial_tables() {
        let config = UnveilConfig::parse(
            r#"
profile = "simple"
threshold = 0.85

[animation]
ease = "power2.out"

[smooth_scroll]
lerp = 0.2
"#,
        )
        .unwrap();
        assert_eq!(config.profile, AnimationProfile::Simple);
        assert_eq!(config.threshold, 0.85);
        assert_eq!(config.settings.ease, Easing::Power2Out);
        assert_eq!(config.settings.duration, 1.2);
        assert_eq!(config.smooth_scroll.lerp, 0.2);
        assert!(config.smooth_scroll.smooth);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            UnveilConfig::parse("threshold = 1.5"),
            Err(UnveilError::InvalidConfig(_))
        ));
        assert!(matches!(
            UnveilConfig::parse("[animation]\nease = \"bounce\""),
            Err(UnveilError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = std::env::temp_dir().join("unveil-config-missing");
        let config = UnveilConfig::load_from_dir(&dir).unwrap();
        assert_eq!(config, UnveilConfig::default());
    }
}
