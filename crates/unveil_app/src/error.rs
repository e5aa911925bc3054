//! Error types for unveil_app

use thiserror::Error;
use unveil_animation::AnimationError;
use unveil_platform::PlatformError;

/// Errors surfaced by the page animator
#[derive(Error, Debug)]
pub enum UnveilError {
    /// A preset could not be resolved or its parameters are invalid
    #[error(transparent)]
    Animation(#[from] AnimationError),

    /// A platform collaborator failed
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// Failed to read a configuration file
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML for [`UnveilConfig`](crate::UnveilConfig)
    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration parsed but holds an out-of-range value
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// [`PageAnimator::init`](crate::PageAnimator::init) was called twice
    #[error("Page animator is already initialized")]
    AlreadyInitialized,

    /// The page was already unloaded
    #[error("Page animator is unloaded")]
    Unloaded,
}

/// Result type for unveil_app operations
pub type Result<T> = std::result::Result<T, UnveilError>;
