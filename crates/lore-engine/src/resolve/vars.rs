//! `var::` functions.

use lore_core::{Number, Value, WORLD_SCOPE, arithmetic, split_scoped};

use super::{INVALID_ARGUMENTS, MacroResolver, VarOp};

impl MacroResolver {
    /// Names, scopes, and values are resolved before use, so a variable can
    /// be addressed through another macro. Bare names live in `world`.
    pub(super) fn var_call(&mut self, op: VarOp, args: &[String]) -> String {
        match (op, args) {
            (VarOp::Set, [target, value, ..]) => {
                let (scope, name) = self.target(target);
                let value = self.resolve(value);
                self.store.set(name, &scope, Value::from(value.as_str()));
                value
            }
            (VarOp::Get, [target]) => self.read(target),
            (VarOp::Del, [target]) => {
                let (scope, name) = self.target(target);
                self.store.remove(&name, &scope);
                String::new()
            }
            (VarOp::Arith(op), [lhs, rhs]) => {
                let lhs = self.operand(lhs);
                let rhs = self.operand(rhs);
                match arithmetic(op, &lhs, &rhs) {
                    Ok(value) => value.to_string(),
                    Err(e) => e.to_string(),
                }
            }
            _ => INVALID_ARGUMENTS.to_string(),
        }
    }

    fn target(&mut self, target: &str) -> (String, String) {
        let (scope, name) = split_scoped(target, WORLD_SCOPE);
        (self.resolve(scope), self.resolve(name))
    }

    /// A stored value, itself resolved. Missing variables read as "".
    fn read(&mut self, target: &str) -> String {
        let (scope, name) = self.target(target);
        let stored = self
            .store
            .get(&name, &scope)
            .map(Value::to_string)
            .unwrap_or_default();
        self.resolve(&stored)
    }

    /// An arithmetic operand: a numeric literal, else the variable it names,
    /// else the bare name as text.
    fn operand(&mut self, arg: &str) -> Value {
        if let Some(n) = Number::parse(arg) {
            return n.into();
        }
        let stored = self.read(arg);
        match Number::parse(&stored) {
            Some(n) => n.into(),
            None if !stored.is_empty() => Value::Text(stored),
            None => Value::from(split_scoped(arg, WORLD_SCOPE).1),
        }
    }
}
