//! Model errors

use odesa_core::{InputError, LayerError};
use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised by the model
#[derive(Debug, Error)]
pub enum ModelError {
    /// No output classifier attached
    #[error("Output layer not attached: call add_output_layer before using the model")]
    MissingOutputLayer,

    /// Malformed event or label
    #[error(transparent)]
    Input(#[from] InputError),

    /// Error raised by a hidden layer or the classifier, passed through as is
    #[error(transparent)]
    Layer(#[from] LayerError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Configuration file could not be read or written
    #[error("Configuration I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
