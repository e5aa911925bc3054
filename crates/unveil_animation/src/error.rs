//! Animation error types

use thiserror::Error;

/// Errors raised while resolving animation parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// A caller named a preset that is not in the catalog
    #[error("Unknown preset: '{0}'")]
    UnknownPreset(String),

    /// An ease identifier could not be parsed
    #[error("Invalid easing: '{0}'")]
    InvalidEasing(String),

    /// A parameter has the wrong type or an out-of-range value
    #[error("Invalid parameter '{key}': {reason}")]
    InvalidParameter { key: String, reason: String },
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
