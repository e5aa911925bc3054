//! Platform error types

use thiserror::Error;

/// Platform-related errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlatformError {
    /// A collaborator failed to initialize
    #[error("Platform initialization failed: {0}")]
    InitFailed(String),

    /// A required element is not present in the document
    #[error("Element not found: {0}")]
    MissingElement(String),

    /// Capability not available in this environment
    #[error("Platform not available: {0}")]
    Unavailable(String),

    /// Generic platform error
    #[error("Platform error: {0}")]
    Other(String),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
