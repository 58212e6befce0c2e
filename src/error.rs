//! Error types for carecast

use thiserror::Error;

/// Errors that can occur at the engine's input/output boundary.
///
/// The forecasting core itself always produces a result; these errors only
/// arise while parsing event logs, validating records, or encoding reports.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to parse event log: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Invalid event record: {0}")]
    InvalidRecord(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
