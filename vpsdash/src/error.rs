//! Error types for control requests.

use thiserror::Error;

/// Failure of an outbound request/response call (start/cancel/poll/info).
///
/// Always recoverable: callers revert optimistic state or log and carry on.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ControlError {
    /// Network trouble or a 5xx; worth retrying later.
    pub fn is_transient(&self) -> bool {
        match self {
            ControlError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ControlError::Status { status, .. } => matches!(status, 408 | 429 | 500..=599),
            ControlError::Url(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ControlError>;
