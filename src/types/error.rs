//! Error types for Turnstile

use hyper::StatusCode;

use super::ChangeRef;

/// Main error type for intake operations
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    /// Bad or missing input. Never reaches an external system.
    #[error("{0}")]
    Validation(String),

    /// Attached logo exceeds the encoded size cap.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Client exceeded its request quota for the current window.
    #[error("Rate limit exceeded, try again in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Operator-caused misconfiguration (e.g. missing GitHub credential).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Upstream record read failed. Carries the upstream status and raw
    /// body so the caller can diagnose bad credentials, missing files, etc.
    #[error("Upstream fetch failed: {0}")]
    Fetch(String),

    /// Record change-request creation failed. Nothing was created.
    #[error("Submission failed: {0}")]
    Submission(String),

    /// Logo submission failed after the record pull request was already
    /// created. The record reference is carried so callers can recover the
    /// partially completed change.
    #[error("Logo submission failed after record pull request was created ({}): {message}", .record.pull_request_url)]
    AssetSubmission { record: ChangeRef, message: String },

    /// Anything uncaught.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntakeError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Fetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Submission(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::AssetSubmission { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<std::io::Error> for IntakeError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for IntakeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation(format!("Invalid JSON: {}", err))
    }
}

impl From<hyper::Error> for IntakeError {
    fn from(err: hyper::Error) -> Self {
        Self::Internal(format!("HTTP error: {}", err))
    }
}

/// Result type alias for intake operations
pub type Result<T> = std::result::Result<T, IntakeError>;
