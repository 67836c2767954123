use thiserror::Error;

/// salesboard error types
#[derive(Error, Debug)]
pub enum SalesboardError {
    /// Transport-level failure talking to the task service
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Task service answered with a non-success status
    #[error("service returned {status} for {url}")]
    Status { status: u16, url: String },

    /// Failed to parse JSON or a date field
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Task spec rejected before submission
    #[error("invalid task: {0}")]
    Validation(String),
}

impl From<serde_json::Error> for SalesboardError {
    fn from(e: serde_json::Error) -> Self {
        SalesboardError::Parse(e.to_string())
    }
}

/// Result type alias for salesboard
pub type Result<T> = std::result::Result<T, SalesboardError>;
