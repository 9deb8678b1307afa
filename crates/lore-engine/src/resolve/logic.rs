//! `logic::` functions.

use lore_core::logic::{evaluate, render};

use super::{INVALID_ARGUMENTS, LogicOp, MacroResolver};

impl MacroResolver {
    /// Every argument is resolved before any is evaluated.
    pub(super) fn logic_call(&mut self, op: LogicOp, args: &[String]) -> String {
        if args.is_empty() {
            return INVALID_ARGUMENTS.to_string();
        }
        let args: Vec<String> = args.iter().map(|a| self.resolve(a)).collect();

        match op {
            LogicOp::If => match args.as_slice() {
                [condition, then, rest @ ..] => {
                    if evaluate(condition) {
                        then.clone()
                    } else {
                        rest.first().cloned().unwrap_or_default()
                    }
                }
                _ => "if needs a condition and a value".to_string(),
            },
            LogicOp::And => render(args.iter().all(|a| evaluate(a))).to_string(),
            LogicOp::Or => render(args.iter().any(|a| evaluate(a))).to_string(),
            LogicOp::Not => match args.as_slice() {
                [condition] => render(!evaluate(condition)).to_string(),
                _ => "not takes exactly one argument".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::resolver;

    #[test]
    fn if_branches() {
        let mut r = resolver();
        assert_eq!(r.resolve("{logic::if(true, yes, no)}"), "yes");
        assert_eq!(r.resolve("{logic::if(0, yes, no)}"), "no");
        assert_eq!(r.resolve("<{logic::if(false, yes)}>"), "<>");
        assert_eq!(r.resolve("{logic::if(true)}"), "if needs a condition and a value");
    }

    #[test]
    fn if_with_variables() {
        let mut r = resolver();
        r.resolve("{var::set(hp, 3)}");
        let text = "{logic::if({var::get(hp)} <= 5, weak, strong)}";
        assert_eq!(r.resolve(text), "weak");
        r.resolve("{var::set(hp, 30)}");
        assert_eq!(r.resolve(text), "strong");
    }

    #[test]
    fn and_or_not() {
        let mut r = resolver();
        assert_eq!(r.resolve("{logic::and(1, true, x)}"), "true");
        assert_eq!(r.resolve("{logic::and(1, 0)}"), "false");
        assert_eq!(r.resolve("{logic::or(0, false, 2 > 1)}"), "true");
        assert_eq!(r.resolve("{logic::or(0, false)}"), "false");
        assert_eq!(r.resolve("{logic::not(0)}"), "true");
        assert_eq!(r.resolve("{logic::not(a == a)}"), "false");
        assert_eq!(r.resolve("{logic::not(1, 2)}"), "not takes exactly one argument");
        assert_eq!(r.resolve("{logic::and}"), "invalid arguments");
    }

    #[test]
    fn quoted_branches_keep_commas() {
        let mut r = resolver();
        assert_eq!(r.resolve(r#"{logic::if(1, "a, b", c)}"#), "a, b");
    }
}
