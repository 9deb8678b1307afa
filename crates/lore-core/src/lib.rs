//! Core types for lorebook: values, scoped variables, logic, and triggers.
//!
//! This crate holds the pure parts of the lore engine. Nothing here resolves
//! macros; callers in `lore-engine` resolve names and values first and then
//! hand plain text to the store and the logic evaluator.

/// Quote-aware argument splitting.
pub mod args;
/// The lorebook definition document.
pub mod definition;
/// Error types used throughout the crate.
pub mod error;
/// Boolean condition evaluation.
pub mod logic;
/// Scoped variable storage.
pub mod store;
/// Trigger rules, notes, and output buckets.
pub mod trigger;
/// Tagged values and numeric coercion.
pub mod value;

/// Re-export the argument splitter.
pub use args::split_args;
/// Re-export definition types.
pub use definition::{LorebookDefinition, NoteRecord, TriggerRecord, UserState};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export store types.
pub use store::{Scope, VariableStore, WORLD_SCOPE, split_scoped};
/// Re-export trigger model types.
pub use trigger::{LoreResult, Note, Position, Trigger, TriggerKind};
/// Re-export value types.
pub use value::{ArithOp, Number, Value, arithmetic};
