//! Error types for mongorun

use thiserror::Error;

/// Errors that terminate one interpreter run. Every variant surfaces as a
/// single `Error: ...` diagnostic line and exit code 1.
#[derive(Error, Debug)]
pub enum MongorunError {
    #[error("query must start with db.<collection>.")]
    MissingReceiver,

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("{0}")]
    Parse(String),

    #[error("failed to parse: {span} - {message}")]
    Literal { span: String, message: String },

    #[error("{0}")]
    Driver(#[from] mongodb::error::Error),

    #[error("failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for interpreter operations
pub type Result<T> = std::result::Result<T, MongorunError>;
