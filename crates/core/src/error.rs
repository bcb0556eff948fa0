//! Error types for the condo explorer pipeline.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the condo explorer pipeline.
///
/// Malformed individual fields never surface here; the normalizer absorbs
/// them. Only whole-run failures do.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The listing source could not be read.
    #[error("Source unavailable ({source_id}): {reason}")]
    SourceUnavailable { source_id: String, reason: String },

    /// Data error (invalid or missing data).
    #[error("Data error: {0}")]
    Data(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a source-unavailable error.
    pub fn source_unavailable(source_id: impl Into<String>, reason: impl ToString) -> Self {
        Error::SourceUnavailable {
            source_id: source_id.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create a database error.
    pub fn database(msg: impl Into<String>) -> Self {
        Error::Database(msg.into())
    }

    /// Whether this error means the source could not be loaded at all.
    pub fn is_source_unavailable(&self) -> bool {
        matches!(self, Error::SourceUnavailable { .. })
    }
}
