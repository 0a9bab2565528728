//! Errors produced while talking to the catalog service.

use thiserror::Error;

/// Outcome of a failed logical request.
///
/// `RateLimited` and `Timeout` are retryable causes; they only surface to
/// callers wrapped in `ExhaustedRetries` once the retry budget is spent.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Rate limited by the catalog service (HTTP 429)")]
    RateLimited,

    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Terminal on the first occurrence; `status` is absent for transport errors
    #[error("Request failed: {message}")]
    NonRetryable { status: Option<u16>, message: String },

    #[error("Response body is not valid JSON: {0}")]
    MalformedBody(String),

    #[error("Gave up after {attempts} attempts: {last}")]
    ExhaustedRetries { attempts: u32, last: Box<FetchError> },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::RateLimited | FetchError::Timeout(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::RateLimited => Some(429),
            FetchError::NonRetryable { status, .. } => *status,
            FetchError::ExhaustedRetries { last, .. } => last.status(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
