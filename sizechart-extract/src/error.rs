//! Error types for the extraction client.

use std::time::Duration;

use sizechart_core::{ExtractionError, ExtractionErrorKind};
use thiserror::Error;

/// Result type for extraction client operations.
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

/// Errors raised while talking to the OCR/vision service.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The configured base URL cannot be used.
    #[error("invalid OCR service URL: {0}")]
    InvalidUrl(String),

    /// HTTP layer failed (connection, TLS, body read).
    #[error("OCR request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The request exceeded the configured time limit.
    #[error("OCR request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The service answered with a non-success status.
    #[error("OCR service returned {status}: {detail}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// `detail` field of the error body, or the status reason.
        detail: String,
    },

    /// The response body could not be understood.
    #[error("unreadable OCR response: {0}")]
    Parse(String),
}

impl ExtractError {
    /// Whether the service is busy or slow rather than broken.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => matches!(status, 408 | 503 | 504),
            Self::InvalidUrl(_) | Self::Parse(_) => false,
        }
    }
}

impl From<serde_json::Error> for ExtractError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<ExtractError> for ExtractionError {
    fn from(e: ExtractError) -> Self {
        let kind = match &e {
            ExtractError::Timeout(_) => ExtractionErrorKind::Timeout,
            ExtractError::Http(inner) if inner.is_timeout() => ExtractionErrorKind::Timeout,
            ExtractError::Http(_) | ExtractError::InvalidUrl(_) => ExtractionErrorKind::Transport,
            ExtractError::Status { .. } => ExtractionErrorKind::Service,
            ExtractError::Parse(_) => ExtractionErrorKind::InvalidResponse,
        };
        Self::new(kind, e.to_string())
    }
}
