use serde::Serialize;
use thiserror::Error;

/// Why a single candidate record was refused by a reconciliation pass.
/// Never fails a pass; it travels in `RejectedCandidate`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },
}

#[derive(Error, Debug)]
pub enum EventError {
    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source '{source_name}' failed: {message}")]
    Source { source_name: String, message: String },

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, EventError>;
