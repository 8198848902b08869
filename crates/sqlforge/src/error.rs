//! Error types for sqlforge

use thiserror::Error;

/// Result type alias for statement-building operations
pub type BuildResult<T> = Result<T, BuildError>;

/// Error types for statement building
#[derive(Debug, Error)]
pub enum BuildError {
    /// Factory configuration error (e.g. missing driver name)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid argument to a builder operation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A structured argument had the wrong shape
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),
}

impl BuildError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a type mismatch error
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::TypeMismatch(message.into())
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Check if this is an invalid argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Check if this is a type mismatch error
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch(_))
    }
}
