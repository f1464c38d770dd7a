//! Error types for MLB Stats API access.

use thiserror::Error;

/// Errors that can occur when talking to the Stats API.
#[derive(Debug, Error)]
pub enum StatsApiError {
    /// Connection or transport failure.
    #[error("network error requesting {url}: {message}")]
    Network { url: String, message: String },

    /// The per-request client timeout elapsed.
    #[error("request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    /// Upstream answered with a non-success status.
    #[error("Stats API returned {status} for {url}")]
    Status { status: u16, url: String },

    /// The body was not valid JSON.
    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },

    /// The JSON did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Convenience alias for Stats API results.
pub type Result<T> = std::result::Result<T, StatsApiError>;
