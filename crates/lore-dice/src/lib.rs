//! Dice notation and randomness for lorebook macros.
//!
//! Parses `[N]d<F>[suffix]` terms and `+`/`-` combinations, rolls them against
//! a caller-owned [`rand::rngs::StdRng`], and implements the `random(...)`
//! macro function on top.

pub mod error;
pub mod notation;
pub mod random;
pub mod roll;

pub use error::{DiceError, DiceResult};
pub use notation::{DiceExpr, DiceSpec, MAX_DICE, Modifier, Term};
pub use random::evaluate_random;
pub use roll::{DiceRoll, MAX_EXPLOSIONS};
