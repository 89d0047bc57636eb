//! LLM error types.

use thiserror::Error;

/// Errors from an LLM completion call.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport error (connect, timeout, body read). The request URL
    /// is stripped before wrapping.
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// The API returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The API rejected the credentials (401/403).
    #[error("authentication failed for {provider}")]
    AuthFailed { provider: String },

    /// The API returned a 429 Too Many Requests response.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// The response body did not have the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// The client cannot be built from the given configuration.
    #[error("LLM client not configured: {0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.without_url())
    }
}
