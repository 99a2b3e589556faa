//! Error types for odesa-core

use thiserror::Error;

/// Result type for input validation
pub type InputResult<T> = std::result::Result<T, InputError>;

/// Result type returned by layer implementations
pub type LayerResult<T> = std::result::Result<T, LayerError>;

/// Caller-contract violations detected before any layer is touched
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    /// Event record with wrong arity or out-of-range fields
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// Label below -1
    #[error("Invalid label: {0} (expected -1 or a class index >= 0)")]
    InvalidLabel(i64),
}

/// Errors raised by hidden layers and output classifiers
#[derive(Debug, Error)]
pub enum LayerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Layer error: {0}")]
    Other(String),
}
