//! Error types for the rankbridge pipeline
//!
//! Three failure families propagate untouched to the request boundary:
//! remote-call failures (status + body from either backend), contract
//! violations (a backend response missing an expected key or shape), and
//! malformed-input errors (a training blob that does not align with the
//! score records produced for it). Nothing is retried at this layer.

use thiserror::Error;

/// Main error type for the rankbridge pipeline
#[derive(Error, Debug)]
pub enum RankError {
    /// Non-success HTTP status from a backend call
    #[error("Remote call failed with status {status}: {body}")]
    RemoteCall { status: u16, body: String },

    /// Backend response missing an expected key or of the wrong shape
    #[error("Backend contract violation: {0}")]
    ContractViolation(String),

    /// Training blob data rows do not align with the score records
    #[error("Training blob misaligned: {data_lines} data lines vs {score_records} score records")]
    BlobMisaligned {
        data_lines: usize,
        score_records: usize,
    },

    /// A required query parameter was absent
    #[error("Missing required parameter '{0}'")]
    MissingParam(&'static str),

    /// A query parameter could not be interpreted
    #[error("Invalid value for parameter '{name}': {value}")]
    InvalidParam { name: &'static str, value: String },

    /// Scorer configuration errors
    #[error("Scorer configuration error: {0}")]
    ScorerConfig(String),

    /// HTTP client errors (connect failures, timeouts)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors (answer file persistence)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, RankError>;

impl RankError {
    /// HTTP status the boundary should answer with for this error
    pub fn status_code(&self) -> u16 {
        match self {
            RankError::RemoteCall { status, .. } => *status,
            RankError::MissingParam(_) | RankError::InvalidParam { .. } => 400,
            _ => 500,
        }
    }
}
