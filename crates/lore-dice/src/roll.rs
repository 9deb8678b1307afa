//! Rolling parsed dice expressions.

use std::fmt;

use rand::Rng;
use rand::rngs::StdRng;

use crate::error::{DiceError, DiceResult};
use crate::notation::{DiceExpr, DiceSpec, Modifier, Term};

/// Upper bound on extra rolls a single exploding die may add.
pub const MAX_EXPLOSIONS: u32 = 100;

/// The result of rolling a dice expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiceRoll {
    /// The values that counted towards the total, in roll order. For a
    /// combination these are the signed per-term totals.
    pub counted: Vec<i64>,
    /// Rolls that were discarded (the other die of an advantage pair, dice
    /// dropped by keep rules, rerolled originals).
    pub dropped: Vec<i64>,
    /// The final total.
    pub total: i64,
}

impl DiceRoll {
    fn from_counted(counted: Vec<i64>, dropped: Vec<i64>) -> Self {
        let total = counted.iter().sum();
        Self {
            counted,
            dropped,
            total,
        }
    }

    // Constant terms can push a combination past i64.
    fn from_terms(counted: Vec<i64>) -> DiceResult<Self> {
        let total = counted
            .iter()
            .try_fold(0i64, |acc, v| acc.checked_add(*v))
            .ok_or(DiceError::Overflow)?;
        Ok(Self {
            counted,
            dropped: Vec::new(),
            total,
        })
    }
}

impl fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.counted.iter().map(|v| v.to_string()).collect();
        write!(f, "[{}]", values.join(", "))?;
        if !self.dropped.is_empty() {
            let dropped: Vec<String> = self.dropped.iter().map(|v| v.to_string()).collect();
            write!(f, " (dropped {})", dropped.join(", "))?;
        }
        write!(f, " = {}", self.total)
    }
}

fn die(rng: &mut StdRng, faces: u32) -> i64 {
    i64::from(rng.random_range(1..=faces))
}

impl DiceSpec {
    /// Roll this term using the given RNG.
    pub fn roll(&self, rng: &mut StdRng) -> DiceRoll {
        let faces = self.faces;
        let mut counted = Vec::with_capacity(self.count as usize);
        let mut dropped = Vec::new();

        match self.modifier {
            Modifier::None => {
                counted.extend((0..self.count).map(|_| die(rng, faces)));
            }
            Modifier::Advantage | Modifier::Disadvantage => {
                for _ in 0..self.count {
                    let (a, b) = (die(rng, faces), die(rng, faces));
                    let (keep, drop) = if (self.modifier == Modifier::Advantage) == (a >= b) {
                        (a, b)
                    } else {
                        (b, a)
                    };
                    counted.push(keep);
                    dropped.push(drop);
                }
            }
            Modifier::Cap(bound) => {
                counted.extend((0..self.count).map(|_| die(rng, faces).min(i64::from(bound))));
            }
            Modifier::Floor(bound) => {
                counted.extend((0..self.count).map(|_| die(rng, faces).max(i64::from(bound))));
            }
            Modifier::Explode(threshold) => {
                let threshold = i64::from(threshold);
                for _ in 0..self.count {
                    let mut roll = die(rng, faces);
                    let mut sum = roll;
                    let mut extra = 0;
                    while roll >= threshold && extra < MAX_EXPLOSIONS {
                        roll = die(rng, faces);
                        sum += roll;
                        extra += 1;
                    }
                    counted.push(sum);
                }
            }
            Modifier::Reroll(threshold) => {
                for _ in 0..self.count {
                    let roll = die(rng, faces);
                    if roll <= i64::from(threshold) {
                        dropped.push(roll);
                        counted.push(die(rng, faces));
                    } else {
                        counted.push(roll);
                    }
                }
            }
            Modifier::KeepHighest(keep) | Modifier::KeepLowest(keep) => {
                let mut rolls: Vec<i64> = (0..self.count).map(|_| die(rng, faces)).collect();
                if matches!(self.modifier, Modifier::KeepHighest(_)) {
                    rolls.sort_unstable_by(|a, b| b.cmp(a));
                } else {
                    rolls.sort_unstable();
                }
                let rest = rolls.split_off(keep as usize);
                counted = rolls;
                dropped = rest;
            }
        }

        let roll = DiceRoll::from_counted(counted, dropped);
        tracing::debug!(
            dice = %self,
            rolls = ?roll.counted,
            dropped = ?roll.dropped,
            total = roll.total,
            "rolled dice"
        );
        roll
    }
}

impl DiceExpr {
    /// Roll the whole expression using the given RNG.
    ///
    /// Fails with [`DiceError::Overflow`] when a combination's total does
    /// not fit in an `i64`.
    pub fn roll(&self, rng: &mut StdRng) -> DiceResult<DiceRoll> {
        match self {
            Self::Single(spec) => Ok(spec.roll(rng)),
            Self::Combination(terms) => {
                let counted = terms
                    .iter()
                    .map(|term| match term {
                        Term::Constant(n) => *n,
                        Term::Dice { negated, spec } => {
                            let total = spec.roll(rng).total;
                            if *negated { -total } else { total }
                        }
                    })
                    .collect();
                DiceRoll::from_terms(counted)
            }
        }
    }
}
