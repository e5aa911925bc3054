//! TOML page fixtures
//!
//! ```toml
//! user_agent = "Mozilla/5.0 (iPhone; ...)"
//! reduced_motion = false
//! smooth_scroll_fails = false
//!
//! [viewport]
//! width = 1280
//! height = 800
//!
//! [[body]]
//! tag = "main"
//! attributes = { "data-scroll-container" = "" }
//! top = 0
//! height = 3000
//!
//! [[body.children]]
//! tag = "h2"
//! text = "Solutions"
//! top = 1200
//! height = 60
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unveil_platform::Size;

use crate::document::{MemoryDocument, NodeSpec};

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Failed to read fixture: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse fixture: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageFixture {
    pub viewport: Size,
    pub user_agent: Option<String>,
    pub reduced_motion: bool,
    /// Make the headless smooth-scroll backend refuse to start
    pub smooth_scroll_fails: bool,
    pub body: Vec<NodeSpec>,
}

impl Default for PageFixture {
    fn default() -> Self {
        Self {
            viewport: Size::new(1280.0, 800.0),
            user_agent: None,
            reduced_motion: false,
            smooth_scroll_fails: false,
            body: Vec::new(),
        }
    }
}

impl PageFixture {
    pub fn parse(source: &str) -> Result<Self, FixtureError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    /// Build a document holding the fixture's body
    pub fn build_document(&self) -> MemoryDocument {
        let mut doc = MemoryDocument::new(self.viewport).with_reduced_motion(self.reduced_motion);
        if let Some(user_agent) = &self.user_agent {
            doc = doc.with_user_agent(user_agent);
        }
        for spec in &self.body {
            doc.append_to_body(spec);
        }
        doc
    }
}
