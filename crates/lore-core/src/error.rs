//! Error types for the core data model.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while building or evaluating core data.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Two triggers in one definition share a name.
    #[error("duplicate trigger name: {0}")]
    DuplicateTrigger(String),

    /// The divisor of a `div` operation was zero.
    #[error("division by zero")]
    DivisionByZero,

    /// An arithmetic result is not a finite number.
    #[error("numeric overflow")]
    NumericOverflow,

    /// The definition document could not be parsed.
    #[error("invalid definition: {0}")]
    InvalidDefinition(#[from] serde_json::Error),
}
