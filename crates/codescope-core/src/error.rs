//! Error types for Codescope.

use thiserror::Error;

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Codescope error types.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rejected caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Bad search pattern
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Ignore rules could not be compiled
    #[error("Invalid ignore rules: {0}")]
    Ignore(#[from] ::ignore::Error),

    /// A path segment is needed both as a file and as a directory
    #[error("File tree conflict at '{path}': segment is both a file and a directory")]
    TreeConflict { path: String },

    /// The inference server failed or could not be reached
    #[error("Upstream error: {message}")]
    Upstream {
        message: String,
        status: Option<u16>,
    },

    /// Uploaded archive could not be unpacked
    #[error("Archive error: {0}")]
    Archive(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Build an upstream error without an HTTP status (connection failures).
    pub fn upstream(message: impl Into<String>) -> Self {
        Error::Upstream {
            message: message.into(),
            status: None,
        }
    }
}
