//! The `random(...)` macro function.

use rand::Rng;
use rand::rngs::StdRng;

use crate::error::{DiceError, DiceResult};
use crate::notation::DiceExpr;

/// Evaluate `random(args)`.
///
/// - two integer arguments: a uniform integer in their inclusive range, in
///   either order
/// - one argument containing `d`: the total of that dice expression
/// - one other argument: the argument itself
/// - anything else: a uniform choice among the trimmed arguments
pub fn evaluate_random(args: &[String], rng: &mut StdRng) -> DiceResult<String> {
    match args {
        [] => Err(DiceError::NoOptions),
        [single] => {
            let single = single.trim();
            if single.contains(['d', 'D']) {
                let expr: DiceExpr = single.parse()?;
                Ok(expr.roll(rng)?.total.to_string())
            } else {
                Ok(single.to_string())
            }
        }
        [a, b] => match (integer(a), integer(b)) {
            (Some(a), Some(b)) => {
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                Ok(rng.random_range(lo..=hi).to_string())
            }
            _ => Ok(choose(args, rng)),
        },
        options => Ok(choose(options, rng)),
    }
}

fn choose(options: &[String], rng: &mut StdRng) -> String {
    let pick = rng.random_range(0..options.len());
    options[pick].trim().to_string()
}

fn integer(s: &str) -> Option<i64> {
    s.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn numeric_range_either_order() {
        let mut rng = rng();
        for _ in 0..100 {
            let n: i64 = evaluate_random(&args(&["10", "1"]), &mut rng).unwrap().parse().unwrap();
            assert!((1..=10).contains(&n));
            let n: i64 = evaluate_random(&args(&["-3", " 3 "]), &mut rng).unwrap().parse().unwrap();
            assert!((-3..=3).contains(&n));
        }
    }

    #[test]
    fn degenerate_range() {
        assert_eq!(evaluate_random(&args(&["5", "5"]), &mut rng()).unwrap(), "5");
    }

    #[test]
    fn single_dice_argument() {
        let mut rng = rng();
        for _ in 0..100 {
            let n: i64 = evaluate_random(&args(&["2d6"]), &mut rng).unwrap().parse().unwrap();
            assert!((2..=12).contains(&n));
        }
    }

    #[test]
    fn single_plain_argument_is_verbatim() {
        assert_eq!(evaluate_random(&args(&["axe"]), &mut rng()).unwrap(), "axe");
        assert_eq!(evaluate_random(&args(&["7"]), &mut rng()).unwrap(), "7");
    }

    #[test]
    fn bad_dice_is_error() {
        assert!(evaluate_random(&args(&["0d6"]), &mut rng()).is_err());
        // Any `d` routes through the dice parser.
        assert!(evaluate_random(&args(&["dragon"]), &mut rng()).is_err());
        assert_eq!(
            evaluate_random(&args(&["9223372036854775807+1d6"]), &mut rng()),
            Err(DiceError::Overflow)
        );
    }

    #[test]
    fn choice_among_options() {
        let options = args(&[" red", "green ", "blue"]);
        let mut rng = rng();
        for _ in 0..50 {
            let pick = evaluate_random(&options, &mut rng).unwrap();
            assert!(["red", "green", "blue"].contains(&pick.as_str()));
        }
        let pick = evaluate_random(&args(&["1", "x"]), &mut rng).unwrap();
        assert!(pick == "1" || pick == "x");
    }

    #[test]
    fn no_arguments() {
        assert_eq!(evaluate_random(&[], &mut rng()), Err(DiceError::NoOptions));
    }
}
