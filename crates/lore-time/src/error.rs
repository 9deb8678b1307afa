//! Error types for the time engine.

use thiserror::Error;

/// Result type for time operations.
pub type TimeResult<T> = Result<T, TimeError>;

/// Errors produced by time arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    /// The text is not a `[+-]<int><unit>` offset.
    #[error("invalid time offset: {0}")]
    InvalidOffset(String),

    /// Applying an offset would leave the representable calendar.
    #[error("time offset out of range: {0}")]
    OutOfRange(String),
}
