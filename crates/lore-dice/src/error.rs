//! Error types for dice and random evaluation.

use thiserror::Error;

/// Result type for dice operations.
pub type DiceResult<T> = Result<T, DiceError>;

/// Errors produced by malformed dice notation or random arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    /// The notation has no `d` separating count and faces.
    #[error("dice notation needs a 'd': {0}")]
    MissingD(String),

    /// The dice count is not a positive integer.
    #[error("dice count must be a positive integer: {0}")]
    InvalidCount(String),

    /// The face count is not a positive integer.
    #[error("dice faces must be a positive integer: {0}")]
    InvalidFaces(String),

    /// The suffix after the faces is not a known modifier.
    #[error("unknown dice modifier: {0}")]
    InvalidModifier(String),

    /// A modifier's value is not a positive integer.
    #[error("modifier value must be a positive integer: {0}")]
    InvalidModifierValue(String),

    /// A reroll threshold lies outside `1..=faces`.
    #[error("reroll threshold {threshold} must be between 1 and {faces}")]
    ThresholdOutOfRange {
        /// The requested threshold.
        threshold: u32,
        /// Faces on the die.
        faces: u32,
    },

    /// More dice kept than rolled.
    #[error("cannot keep {keep} of {count} dice")]
    KeepExceedsCount {
        /// Dice to keep.
        keep: u32,
        /// Dice rolled.
        count: u32,
    },

    /// The dice count exceeds the per-expression limit.
    #[error("too many dice: {0}")]
    TooManyDice(u32),

    /// A combination has an empty term, as in `1d6++2`.
    #[error("empty term in dice expression: {0}")]
    EmptyTerm(String),

    /// A combination term is neither dice nor an integer.
    #[error("invalid constant in dice expression: {0}")]
    InvalidConstant(String),

    /// A combination total does not fit in 64 bits.
    #[error("dice total overflows")]
    Overflow,

    /// `random` was called without anything to choose from.
    #[error("nothing to choose from")]
    NoOptions,
}
