//! Error types for the energy advisor

use thiserror::Error;

/// Result type alias for advisor operations
pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {

    // =============================
    // Core Engine Errors
    // =============================

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Insufficient historical data: {0} valid records, at least 2 required")]
    InsufficientData(usize),

    #[error("Conversation protocol error: {0}")]
    ProtocolError(String),

    #[error("Dataset error: {0}")]
    DatasetError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
