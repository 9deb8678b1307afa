//! Boolean condition evaluation.
//!
//! Conditions are evaluated textually in a single pass, without building an
//! expression tree. The checks run in a fixed order:
//!
//! 1. literals: `true`/`1` and `false`/`0`/empty
//! 2. a leading `!` negates the rest of the condition
//! 3. `&&`, then `||`, split on every occurrence
//! 4. the comparison operators `== != < > <= >=`, in that order, split on the
//!    first occurrence
//! 5. any other non-empty text is truthy
//!
//! There is no precedence beyond that order: `!a && b` negates `a && b`.

use std::cmp::Ordering;

use crate::value::Value;

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
}

impl Comparison {
    /// Operators in the order they are tried.
    pub const ALL: [Comparison; 6] = [
        Comparison::Eq,
        Comparison::Ne,
        Comparison::Lt,
        Comparison::Gt,
        Comparison::Le,
        Comparison::Ge,
    ];

    /// The operator's source text.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
        }
    }

    /// Find the first occurrence of this operator in `text`.
    ///
    /// A bare `<` or `>` directly followed by `=` belongs to `<=`/`>=` and is
    /// skipped.
    fn find_in(self, text: &str) -> Option<usize> {
        let symbol = self.symbol();
        let single = matches!(self, Self::Lt | Self::Gt);
        text.match_indices(symbol)
            .map(|(i, _)| i)
            .find(|&i| !single || !text[i + 1..].starts_with('='))
    }

    /// Compare two already-trimmed operands.
    ///
    /// Both sides are coerced first; when both are numbers the comparison is
    /// numeric, otherwise it is textual.
    pub fn apply(self, lhs: &str, rhs: &str) -> bool {
        let ordering = match (Value::coerce(lhs).as_number(), Value::coerce(rhs).as_number()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => Some(lhs.cmp(rhs)),
        };
        let Some(ordering) = ordering else {
            return false;
        };
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::Ne => ordering != Ordering::Equal,
            Self::Lt => ordering == Ordering::Less,
            Self::Gt => ordering == Ordering::Greater,
            Self::Le => ordering != Ordering::Greater,
            Self::Ge => ordering != Ordering::Less,
        }
    }
}

/// Evaluate a condition to a boolean.
pub fn evaluate(condition: &str) -> bool {
    let condition = condition.trim();
    if condition.is_empty() {
        return false;
    }

    if condition.eq_ignore_ascii_case("true") || condition == "1" {
        return true;
    }
    if condition.eq_ignore_ascii_case("false") || condition == "0" {
        return false;
    }

    if let Some(rest) = condition.strip_prefix('!') {
        return !evaluate(rest);
    }

    if condition.contains("&&") {
        return condition
            .split("&&")
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .all(evaluate);
    }

    if condition.contains("||") {
        return condition
            .split("||")
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .any(evaluate);
    }

    for op in Comparison::ALL {
        if let Some(i) = op.find_in(condition) {
            let lhs = condition[..i].trim();
            let rhs = condition[i + op.symbol().len()..].trim();
            return op.apply(lhs, rhs);
        }
    }

    true
}

/// Render a boolean the way logic macros return it.
pub fn render(b: bool) -> &'static str {
    if b { "true" } else { "false" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals() {
        assert!(evaluate("true"));
        assert!(evaluate("TRUE"));
        assert!(evaluate("1"));
        assert!(!evaluate("false"));
        assert!(!evaluate("0"));
        assert!(!evaluate(""));
        assert!(!evaluate("   "));
    }

    #[test]
    fn non_empty_text_is_truthy() {
        assert!(evaluate("anything"));
    }

    #[test]
    fn negation() {
        assert!(evaluate("!false"));
        assert!(!evaluate("! true"));
        assert!(evaluate("!!1"));
    }

    #[test]
    fn conjunction_and_disjunction() {
        assert!(evaluate("true && 1"));
        assert!(!evaluate("true && 0"));
        assert!(evaluate("false || yes"));
        assert!(!evaluate("0 || false"));
        assert!(evaluate("1 && 2 > 1"));
    }

    #[test]
    fn negation_binds_loosely() {
        // `!` applies to the whole `true && false`.
        assert!(evaluate("!true && false"));
    }

    #[test]
    fn numeric_comparison() {
        assert!(evaluate("10>9"));
        assert!(evaluate("2 < 10"));
        assert!(evaluate("5 == 5.0"));
        assert!(evaluate("3 != 4"));
        assert!(evaluate("5<=5"));
        assert!(evaluate("6>=5"));
        assert!(!evaluate("4>=5"));
    }

    #[test]
    fn textual_comparison_fallback() {
        assert!(evaluate("abc == abc"));
        assert!(!evaluate("abc == abd"));
        // Textually "10" < "9".
        assert!(evaluate("10 < 9x"));
    }

    #[test]
    fn splits_on_first_operator() {
        // `==` is tried first, so this compares "a" with "b == c".
        assert!(!evaluate("a == b == c"));
        assert!(evaluate("a == a"));
        assert!(!evaluate("a == a == a"));
    }

    #[test]
    fn render_bool() {
        assert_eq!(render(true), "true");
        assert_eq!(render(false), "false");
    }
}
