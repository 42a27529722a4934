//! Error types for sqlfluent

use thiserror::Error;

/// Result type alias for sqlfluent operations
pub type QbResult<T> = Result<T, QbError>;

/// Error types for query building
///
/// Malformed builder input never produces an error: invalid limits or empty
/// ORDER BY text silently disable their clause. Errors are reserved for reads
/// that cannot be answered.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QbError {
    /// A named parameter was read (or referenced by a placeholder) but never bound
    #[error("Parameter not found: {0}")]
    ParamNotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl QbError {
    /// Create a parameter-not-found error
    pub fn param_not_found(name: impl Into<String>) -> Self {
        Self::ParamNotFound(name.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is a parameter-not-found error
    pub fn is_param_not_found(&self) -> bool {
        matches!(self, Self::ParamNotFound(_))
    }
}
