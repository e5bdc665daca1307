//! Error types for trajmap.
//!
//! A single error enum covers parameter validation, numeric domain checks,
//! coordinate shape problems and backend failures.

use thiserror::Error;

/// The main error type for trajmap operations.
#[derive(Error, Debug)]
pub enum TrajmapError {
    /// Invalid parameter combination (bad level counts, unknown modes, bad config)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Mathematically undefined transform input
    #[error("Domain error: {message}")]
    Domain { message: String },

    /// Coordinate or data arrays whose lengths/shapes do not line up
    #[error("Shape mismatch: {message}")]
    Shape { message: String },

    /// Invalid parameter errors
    #[error("Invalid parameter: {param} - {message}")]
    InvalidParameter { param: String, message: String },

    /// Rendering backend failures
    #[error("Render error: {message}")]
    Render { message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TrajmapError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        TrajmapError::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn domain(message: impl Into<String>) -> Self {
        TrajmapError::Domain {
            message: message.into(),
        }
    }

    pub(crate) fn shape(message: impl Into<String>) -> Self {
        TrajmapError::Shape {
            message: message.into(),
        }
    }
}

/// Convenience type alias for Results with TrajmapError
pub type Result<T> = std::result::Result<T, TrajmapError>;
