//! Feed error types.

use thiserror::Error;

/// Errors that can occur when talking to the datapoint feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP transport error (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status code.
    #[error("{request} -> {status}: {body}")]
    Api {
        /// Method, goal, and target of the failed call.
        request: String,
        status: u16,
        body: String,
    },

    /// A create reused an idempotency token the remote has already seen.
    #[error("duplicate request {requestid}: {body}")]
    DuplicateRequest { requestid: String, body: String },

    /// The API answered 429 Too Many Requests.
    #[error("{request} rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        request: String,
        retry_after_secs: u64,
    },

    /// Failed to parse an API response.
    #[error("parse error: {0}")]
    Parse(String),
}

impl FeedError {
    /// Whether this is the benign duplicate-create rejection.
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateRequest { .. })
    }
}
