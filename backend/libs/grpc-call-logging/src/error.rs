//! Error types for call logging

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CallLoggingError>;

#[derive(Debug, Error)]
pub enum CallLoggingError {
    /// A builder option was given an unusable value
    #[error("invalid option value: {0}")]
    InvalidOptionValue(String),

    /// No call span was attached (the logging layer is not installed)
    #[error("no call span in request")]
    NoSpanInContext,

    /// A configured field could not be computed for this call
    #[error("failed computing log field {field}: {reason}")]
    FieldUnavailable { field: &'static str, reason: String },

    /// Environment configuration could not be parsed
    #[error("invalid call logging configuration: {0}")]
    Config(#[from] envy::Error),
}
