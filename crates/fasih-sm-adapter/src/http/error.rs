/*
[INPUT]:  Error sources (HTTP transport, backend envelopes, serialization, file IO)
[OUTPUT]: Structured error types with retry and failure-origin hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
[UPDATE]: 2026-10-12 Split backend-reported failures from transport faults
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the FASIH-SM backend adapter
#[derive(Error, Debug)]
pub enum FasihError {
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered but reported a failure (`success: false` or non-2xx)
    #[error("API error (code {code}): {message}")]
    Api { code: i32, message: String },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Local file IO failed while storing a download
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection timeout
    #[error("Connection timeout after {duration}s")]
    Timeout { duration: u64 },
}

impl FasihError {
    /// Check if the error is a transient transport fault worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FasihError::Http(_) | FasihError::Timeout { .. } | FasihError::InvalidResponse(_)
        )
    }

    /// Check if the backend completed the round-trip and reported a negative result
    pub fn is_backend_failure(&self) -> bool {
        matches!(self, FasihError::Api { .. })
    }

    /// Backend message for reported failures, display text otherwise
    pub fn user_message(&self) -> String {
        match self {
            FasihError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        FasihError::Api {
            code: status.as_u16() as i32,
            message: message.into(),
        }
    }
}

/// Result type alias for FASIH-SM adapter operations
pub type Result<T> = std::result::Result<T, FasihError>;
