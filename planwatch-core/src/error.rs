//! Error types for planwatch

use thiserror::Error;

/// Result type alias for planwatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for planwatch operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Document or change-log parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Page fetch error, carried into the failed snapshot
    #[error("Fetch error: {0}")]
    Fetch(String),
}
