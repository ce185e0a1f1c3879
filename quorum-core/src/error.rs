//! Error types for Quorum

use thiserror::Error;

/// Result type alias for Quorum operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Quorum operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A reviewer invocation failed (transport, auth, rate limit, timeout)
    #[error("reviewer '{model}' failed: {message}")]
    Reviewer {
        /// Model identifier of the failed reviewer
        model: String,
        /// Human-readable error description
        message: String,
    },

    /// A reviewer response could not be decoded into a score record
    #[error("score parse error: {0}")]
    Parse(String),

    /// Git operation error
    #[error("Git error: {0}")]
    Git(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<git2::Error> for Error {
    fn from(err: git2::Error) -> Self {
        Error::Git(err.message().to_string())
    }
}
