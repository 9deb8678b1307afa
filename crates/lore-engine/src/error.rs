//! Error types for the lore engine.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised by engine construction, persistence, and the engine's own
/// machinery. Evaluator failures inside macros never surface here; they are
/// rendered as text in place of the macro.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The definition document is malformed or inconsistent.
    #[error("{0}")]
    Definition(#[from] lore_core::CoreError),

    /// A time adjustment could not be applied.
    #[error("{0}")]
    Time(#[from] lore_time::TimeError),

    /// A pattern failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Reading or writing a snapshot file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// A snapshot could not be encoded or decoded.
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// A scope kind other than `world` or `user` was requested.
    #[error("unknown scope kind: {0}")]
    UnknownScopeKind(String),
}
