//! Error types for reviewer backend calls

use thiserror::Error;

/// Result type for reviewer backend calls
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when calling the LLM proxy
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP transport error
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the proxy
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        message: String,
    },

    /// Authentication failure
    #[error("authentication error: {0}")]
    Auth(String),

    /// Rate limited by the provider
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Response contained no completion text
    #[error("response contained no completion text")]
    EmptyResponse,
}
