//! Dice notation parsing.
//!
//! Grammar: `[N]d<F>[suffix]`, where `N` defaults to 1 and the suffix is one
//! of `adv`, `dis`, `u<B>`, `b<B>`, `r<T>`, `t<T>`, `k<K>`, `l<K>`. Terms can
//! be combined with `+` and `-` together with integer constants, as in
//! `2d6+1d4-2`. Combination terms are never themselves combinations.

use std::fmt;
use std::str::FromStr;

use crate::error::{DiceError, DiceResult};

/// Upper bound on dice rolled by a single term.
pub const MAX_DICE: u32 = 1000;

/// How the individual rolls of a term are adjusted or selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// Plain sum.
    None,
    /// Roll each die twice, keep the higher.
    Advantage,
    /// Roll each die twice, keep the lower.
    Disadvantage,
    /// Cap each roll at the value (`u`).
    Cap(u32),
    /// Floor each roll at the value (`b`).
    Floor(u32),
    /// A roll at or above the threshold adds another roll, repeatedly (`r`).
    Explode(u32),
    /// A roll at or below the threshold is rerolled once (`t`).
    Reroll(u32),
    /// Keep the highest rolls (`k`).
    KeepHighest(u32),
    /// Keep the lowest rolls (`l`).
    KeepLowest(u32),
}

/// A single dice term such as `4d6k3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceSpec {
    /// Number of dice.
    pub count: u32,
    /// Faces per die.
    pub faces: u32,
    /// Roll adjustment.
    pub modifier: Modifier,
}

impl DiceSpec {
    /// Create a plain `NdF` term.
    pub fn new(count: u32, faces: u32) -> Self {
        Self {
            count,
            faces,
            modifier: Modifier::None,
        }
    }

    fn validate(self) -> DiceResult<Self> {
        if self.count > MAX_DICE {
            return Err(DiceError::TooManyDice(self.count));
        }
        match self.modifier {
            Modifier::Explode(t) | Modifier::Reroll(t) if t > self.faces => {
                Err(DiceError::ThresholdOutOfRange {
                    threshold: t,
                    faces: self.faces,
                })
            }
            Modifier::KeepHighest(k) | Modifier::KeepLowest(k) if k > self.count => {
                Err(DiceError::KeepExceedsCount {
                    keep: k,
                    count: self.count,
                })
            }
            _ => Ok(self),
        }
    }
}

impl FromStr for DiceSpec {
    type Err = DiceError;

    fn from_str(s: &str) -> DiceResult<Self> {
        let s = s.trim().to_lowercase();
        let (count_str, rest) = s
            .split_once('d')
            .ok_or_else(|| DiceError::MissingD(s.clone()))?;

        let count = if count_str.is_empty() {
            1
        } else {
            positive(count_str).ok_or_else(|| DiceError::InvalidCount(count_str.to_string()))?
        };

        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let (faces_str, suffix) = rest.split_at(digits);
        let faces = positive(faces_str).ok_or_else(|| DiceError::InvalidFaces(rest.to_string()))?;

        let modifier = parse_modifier(suffix)?;
        DiceSpec {
            count,
            faces,
            modifier,
        }
        .validate()
    }
}

fn parse_modifier(suffix: &str) -> DiceResult<Modifier> {
    match suffix {
        "" => return Ok(Modifier::None),
        "adv" => return Ok(Modifier::Advantage),
        "dis" => return Ok(Modifier::Disadvantage),
        _ => {}
    }

    let mut chars = suffix.chars();
    let Some(tag) = chars.next() else {
        return Ok(Modifier::None);
    };
    let value_str = chars.as_str();
    let constructor: fn(u32) -> Modifier = match tag {
        'u' => Modifier::Cap,
        'b' => Modifier::Floor,
        'r' => Modifier::Explode,
        't' => Modifier::Reroll,
        'k' => Modifier::KeepHighest,
        'l' => Modifier::KeepLowest,
        _ => return Err(DiceError::InvalidModifier(suffix.to_string())),
    };
    let value =
        positive(value_str).ok_or_else(|| DiceError::InvalidModifierValue(suffix.to_string()))?;
    Ok(constructor(value))
}

fn positive(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u32>().ok().filter(|n| *n > 0)
}

impl fmt::Display for DiceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.faces)?;
        match self.modifier {
            Modifier::None => Ok(()),
            Modifier::Advantage => write!(f, "adv"),
            Modifier::Disadvantage => write!(f, "dis"),
            Modifier::Cap(v) => write!(f, "u{v}"),
            Modifier::Floor(v) => write!(f, "b{v}"),
            Modifier::Explode(v) => write!(f, "r{v}"),
            Modifier::Reroll(v) => write!(f, "t{v}"),
            Modifier::KeepHighest(v) => write!(f, "k{v}"),
            Modifier::KeepLowest(v) => write!(f, "l{v}"),
        }
    }
}

/// One signed term of a combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    /// An integer constant, sign included.
    Constant(i64),
    /// A dice term; `negated` subtracts its total.
    Dice {
        /// Whether the term was written with a leading `-`.
        negated: bool,
        /// The dice to roll.
        spec: DiceSpec,
    },
}

/// A parsed dice expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiceExpr {
    /// A single unsigned term.
    Single(DiceSpec),
    /// Signed terms summed together.
    Combination(Vec<Term>),
}

impl FromStr for DiceExpr {
    type Err = DiceError;

    fn from_str(s: &str) -> DiceResult<Self> {
        let s = s.trim();
        if !s.contains(['+', '-']) {
            return s.parse().map(Self::Single);
        }

        let mut terms = Vec::new();
        for (negated, body) in signed_terms(s) {
            let body = body.trim();
            if body.is_empty() {
                return Err(DiceError::EmptyTerm(s.to_string()));
            }
            if body.contains(['d', 'D']) {
                terms.push(Term::Dice {
                    negated,
                    spec: body.parse()?,
                });
            } else {
                let n: i64 = body
                    .parse()
                    .map_err(|_| DiceError::InvalidConstant(body.to_string()))?;
                terms.push(Term::Constant(if negated { -n } else { n }));
            }
        }
        Ok(Self::Combination(terms))
    }
}

/// Split `s` at every `+`/`-`, pairing each piece with whether it was negated.
/// A leading sign applies to the first piece.
fn signed_terms(s: &str) -> Vec<(bool, &str)> {
    let mut terms = Vec::new();
    let mut negated = false;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if c == '+' || c == '-' {
            if i > 0 {
                terms.push((negated, &s[start..i]));
            }
            negated = c == '-';
            start = i + 1;
        }
    }
    terms.push((negated, &s[start..]));
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_terms() {
        assert_eq!("3d6".parse::<DiceSpec>().unwrap(), DiceSpec::new(3, 6));
        assert_eq!("d20".parse::<DiceSpec>().unwrap(), DiceSpec::new(1, 20));
        assert_eq!("2D8".parse::<DiceSpec>().unwrap(), DiceSpec::new(2, 8));
    }

    #[test]
    fn modifiers() {
        let cases = [
            ("2d20adv", Modifier::Advantage),
            ("2d20dis", Modifier::Disadvantage),
            ("1d6u3", Modifier::Cap(3)),
            ("3d6b2", Modifier::Floor(2)),
            ("1d6r6", Modifier::Explode(6)),
            ("1d6t2", Modifier::Reroll(2)),
            ("4d6k3", Modifier::KeepHighest(3)),
            ("4d6l1", Modifier::KeepLowest(1)),
        ];
        for (text, modifier) in cases {
            assert_eq!(text.parse::<DiceSpec>().unwrap().modifier, modifier, "{text}");
        }
    }

    #[test]
    fn display() {
        assert_eq!("d6".parse::<DiceSpec>().unwrap().to_string(), "1d6");
        assert_eq!("4d6k3".parse::<DiceSpec>().unwrap().to_string(), "4d6k3");
        assert_eq!("2d20adv".parse::<DiceSpec>().unwrap().to_string(), "2d20adv");
    }

    #[test]
    fn invalid_terms() {
        assert!(matches!("6".parse::<DiceSpec>(), Err(DiceError::MissingD(_))));
        assert!(matches!("0d6".parse::<DiceSpec>(), Err(DiceError::InvalidCount(_))));
        assert!(matches!("xd6".parse::<DiceSpec>(), Err(DiceError::InvalidCount(_))));
        assert!(matches!("2d0".parse::<DiceSpec>(), Err(DiceError::InvalidFaces(_))));
        assert!(matches!("2d".parse::<DiceSpec>(), Err(DiceError::InvalidFaces(_))));
        assert!(matches!("2d6x3".parse::<DiceSpec>(), Err(DiceError::InvalidModifier(_))));
        assert!(matches!("2d6k".parse::<DiceSpec>(), Err(DiceError::InvalidModifierValue(_))));
        assert!(matches!("2d6u0".parse::<DiceSpec>(), Err(DiceError::InvalidModifierValue(_))));
        assert!(matches!(
            "1d6r7".parse::<DiceSpec>(),
            Err(DiceError::ThresholdOutOfRange { threshold: 7, faces: 6 })
        ));
        assert!(matches!(
            "2d6k3".parse::<DiceSpec>(),
            Err(DiceError::KeepExceedsCount { keep: 3, count: 2 })
        ));
        assert!(matches!("5000d6".parse::<DiceSpec>(), Err(DiceError::TooManyDice(5000))));
    }

    #[test]
    fn combinations() {
        let expr: DiceExpr = "2d6+1d4-2".parse().unwrap();
        assert_eq!(
            expr,
            DiceExpr::Combination(vec![
                Term::Dice { negated: false, spec: DiceSpec::new(2, 6) },
                Term::Dice { negated: false, spec: DiceSpec::new(1, 4) },
                Term::Constant(-2),
            ])
        );

        let expr: DiceExpr = "-1d4+3".parse().unwrap();
        assert_eq!(
            expr,
            DiceExpr::Combination(vec![
                Term::Dice { negated: true, spec: DiceSpec::new(1, 4) },
                Term::Constant(3),
            ])
        );
    }

    #[test]
    fn combination_terms_keep_modifiers() {
        let expr: DiceExpr = "4d6k3+2d20adv".parse().unwrap();
        let DiceExpr::Combination(terms) = expr else {
            panic!("expected a combination");
        };
        assert!(matches!(
            terms[1],
            Term::Dice { spec: DiceSpec { modifier: Modifier::Advantage, .. }, .. }
        ));
    }

    #[test]
    fn invalid_combinations() {
        assert!(matches!("1d6++2".parse::<DiceExpr>(), Err(DiceError::EmptyTerm(_))));
        assert!(matches!("1d6+".parse::<DiceExpr>(), Err(DiceError::EmptyTerm(_))));
        assert!(matches!("1d6+x".parse::<DiceExpr>(), Err(DiceError::InvalidConstant(_))));
    }
}
