//! Adapter errors

use pathfinder_core::GenerationError;

/// Chat-completions adapter failures
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Client could not be built
    #[error("client setup failed: {0}")]
    Setup(String),

    /// Transport failure before a status was received
    #[error("request failed: {0}")]
    Request(String),

    /// Request exceeded the configured timeout
    #[error("request timed out")]
    Timeout,

    /// Credentials rejected
    #[error("authentication failed (check the API key variable)")]
    AuthFailed,

    /// Provider throttled the request
    #[error("rate limited")]
    RateLimited,

    /// Non-success status
    #[error("HTTP {status}: {body}")]
    Status {
        /// Status code
        status: u16,
        /// Leading part of the response body
        body: String,
    },

    /// Body did not match the expected shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Completion had no content
    #[error("empty completion")]
    EmptyCompletion,
}

impl LlmError {
    /// Transport errors worth retrying later
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::RateLimited => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(err.to_string())
        }
    }
}

impl From<LlmError> for GenerationError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Timeout => GenerationError::Timeout,
            LlmError::EmptyCompletion => GenerationError::EmptyResponse,
            LlmError::InvalidResponse(reason) => GenerationError::Malformed(reason),
            other => GenerationError::Service(other.to_string()),
        }
    }
}
