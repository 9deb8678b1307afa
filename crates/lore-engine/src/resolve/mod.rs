//! Macro resolution.
//!
//! Text is rewritten in three phases (see [`Phase`]). Each phase re-scans the
//! whole text until nothing changes or [`MAX_RECURSION_DEPTH`] passes have
//! run. The macro pattern excludes braces and parentheses inside the argument
//! list, so nested macros resolve innermost first across passes rather than
//! through balanced-bracket parsing.

pub mod dispatch;
mod logic;
mod vars;

use std::ops::Range;

use rand::Rng;
use rand::rngs::StdRng;
use regex::{Captures, Regex};

use lore_core::trigger::clamp_probability;
use lore_core::{VariableStore, split_args};
use lore_dice::{DiceError, evaluate_random};
use lore_time::WorldClock;

use crate::config::Identity;
use crate::error::{EngineError, EngineResult};

pub use dispatch::{Call, DispatchTable, LogicOp, Phase, VarOp};

/// Cap on fixpoint passes per phase, on nested resolution, and on action
/// chaining between rules.
pub const MAX_RECURSION_DEPTH: usize = 25;

/// `{namespace::function}` or `{namespace::function(args)}`.
const MACRO_PATTERN: &str = r"\{([a-zA-Z0-9_]+)::([a-zA-Z0-9_]+)(?:\(([^(){}]*)\))?\}";

/// One macro occurrence found in a scan.
#[derive(Debug)]
struct Occurrence<'t> {
    span: Range<usize>,
    text: &'t str,
    namespace: &'t str,
    function: &'t str,
    args: Option<&'t str>,
}

impl<'t> Occurrence<'t> {
    fn from_captures(caps: &Captures<'t>) -> Option<Self> {
        let whole = caps.get(0)?;
        Some(Self {
            span: whole.range(),
            text: whole.as_str(),
            namespace: caps.get(1)?.as_str(),
            function: caps.get(2)?.as_str(),
            args: caps.get(3).map(|m| m.as_str()),
        })
    }
}

/// Rewrites `{namespace::function(args)}` macros in text.
///
/// Owns every piece of state a macro can read or change: the variable store,
/// the world clock, the RNG, and the speaker identity.
#[derive(Debug)]
pub struct MacroResolver {
    pattern: Regex,
    table: DispatchTable,
    store: VariableStore,
    clock: WorldClock,
    rng: StdRng,
    identity: Identity,
    depth: usize,
    // Set once nesting hits the cap; stops every enclosing pass until the
    // top-level call returns.
    saturated: bool,
}

impl MacroResolver {
    /// Create a resolver with the standard dispatch table.
    pub fn new(
        store: VariableStore,
        clock: WorldClock,
        rng: StdRng,
        identity: Identity,
    ) -> EngineResult<Self> {
        Ok(Self {
            pattern: Regex::new(MACRO_PATTERN)?,
            table: DispatchTable::standard(),
            store,
            clock,
            rng,
            identity,
            depth: 0,
            saturated: false,
        })
    }

    /// Replace the dispatch table.
    pub fn with_table(mut self, table: DispatchTable) -> Self {
        self.table = table;
        self
    }

    /// Resolve every macro in `text`.
    ///
    /// Unknown names and failing calls are left verbatim. Text without
    /// macros comes back unchanged. Once nesting reaches
    /// [`MAX_RECURSION_DEPTH`] the rest of the call returns what it has
    /// rewritten so far.
    pub fn resolve(&mut self, text: &str) -> String {
        if !text.contains('{') {
            return text.to_string();
        }
        if self.depth == 0 {
            self.saturated = false;
        }
        if self.saturated {
            return text.to_string();
        }
        if self.depth >= MAX_RECURSION_DEPTH {
            tracing::warn!(depth = self.depth, text, "nested resolution depth cap hit");
            self.saturated = true;
            return text.to_string();
        }

        self.depth += 1;
        let mut text = text.to_string();
        for phase in Phase::ORDER {
            if self.saturated {
                break;
            }
            text = self.run_phase(phase, text);
        }
        self.depth -= 1;
        text
    }

    fn run_phase(&mut self, phase: Phase, mut text: String) -> String {
        for _ in 0..MAX_RECURSION_DEPTH {
            let next = self.rewrite(phase, &text);
            if next == text || self.saturated {
                return next;
            }
            text = next;
        }
        tracing::warn!(?phase, "phase did not settle within the depth cap");
        text
    }

    /// One left-to-right pass replacing each occurrence known in `phase`.
    fn rewrite(&mut self, phase: Phase, text: &str) -> String {
        let occurrences: Vec<Occurrence<'_>> = self
            .pattern
            .captures_iter(text)
            .filter_map(|caps| Occurrence::from_captures(&caps))
            .collect();
        if occurrences.is_empty() {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for occurrence in occurrences {
            out.push_str(&text[last..occurrence.span.start]);
            out.push_str(&self.expand(phase, &occurrence));
            last = occurrence.span.end;
        }
        out.push_str(&text[last..]);
        out
    }

    fn expand(&mut self, phase: Phase, occurrence: &Occurrence<'_>) -> String {
        if self.saturated {
            return occurrence.text.to_string();
        }
        let Some(call) = self
            .table
            .lookup(phase, occurrence.namespace, occurrence.function)
        else {
            return occurrence.text.to_string();
        };
        let args = occurrence.args.map(split_args).unwrap_or_default();

        match self.call(call, &args) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(occurrence = occurrence.text, error = %e, "macro left unresolved");
                occurrence.text.to_string()
            }
        }
    }

    fn call(&mut self, call: Call, args: &[String]) -> EngineResult<String> {
        match call {
            Call::Sender => Ok(self.identity.sender_id.clone()),
            Call::SenderName => Ok(self.identity.sender_name.clone()),
            Call::Time => self.clock.evaluate(args).map_err(EngineError::from),
            Call::Random => Ok(match evaluate_random(args, &mut self.rng) {
                Ok(value) => value,
                Err(DiceError::NoOptions) => INVALID_ARGUMENTS.to_string(),
                Err(e) => format!("invalid dice: {e}"),
            }),
            Call::Var(op) => Ok(self.var_call(op, args)),
            Call::Logic(op) => Ok(self.logic_call(op, args)),
        }
    }

    /// Draw against a probability in `[0, 1]`.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.rng.random_bool(clamp_probability(probability))
    }

    /// The variable store.
    pub fn store(&self) -> &VariableStore {
        &self.store
    }

    /// The variable store, mutably.
    pub fn store_mut(&mut self) -> &mut VariableStore {
        &mut self.store
    }

    /// The world clock.
    pub fn clock(&self) -> &WorldClock {
        &self.clock
    }

    /// The world clock, mutably.
    pub fn clock_mut(&mut self) -> &mut WorldClock {
        &mut self.clock
    }

    /// The current speaker.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Switch speaker. Derived scopes are addressed through the new sender.
    pub fn set_identity(&mut self, identity: Identity) {
        self.store.set_owner(identity.sender_id.clone());
        self.identity = identity;
    }

    /// Swap in a new store and clock, keeping the RNG stream and identity.
    pub fn replace_state(&mut self, mut store: VariableStore, clock: WorldClock) {
        store.set_owner(self.identity.sender_id.clone());
        self.store = store;
        self.clock = clock;
    }
}

/// Rendered in place of a call whose arguments do not fit the function.
pub(crate) const INVALID_ARGUMENTS: &str = "invalid arguments";

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;
    use lore_core::{Scope, Value, WORLD_SCOPE};
    use rand::SeedableRng;

    pub(crate) fn resolver_with(world: Scope, named: Vec<(String, Scope)>) -> MacroResolver {
        let start = NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(7, 8, 0)
            .unwrap();
        MacroResolver::new(
            VariableStore::with_scopes("alice", world, named),
            WorldClock::new(start, start),
            StdRng::seed_from_u64(1),
            Identity::new("alice", "Alice", "s1"),
        )
        .unwrap()
    }

    pub(crate) fn resolver() -> MacroResolver {
        resolver_with(Scope::new(), Vec::new())
    }

    #[test]
    fn plain_text_is_identity() {
        let mut r = resolver();
        for text in ["", "hello", "a { b } c", "{not a macro}", "{a:b}"] {
            assert_eq!(r.resolve(text), text);
        }
    }

    #[test]
    fn unknown_calls_are_verbatim() {
        let mut r = resolver();
        assert_eq!(r.resolve("{foo::bar(1)} x"), "{foo::bar(1)} x");
        assert_eq!(r.resolve("{var::nope(a)}"), "{var::nope(a)}");
        assert_eq!(r.resolve("{buildin::sender(}"), "{buildin::sender(}");
    }

    #[test]
    fn sender_builtins() {
        let mut r = resolver();
        assert_eq!(r.resolve("{buildin::sender}/{buildin::sender_name}"), "alice/Alice");
        r.set_identity(Identity::new("bob", "Bob", "s1"));
        assert_eq!(r.resolve("{buildin::sender_name}"), "Bob");
        assert_eq!(r.store().owner(), "bob");
    }

    #[test]
    fn time_builtin() {
        let mut r = resolver();
        assert_eq!(r.resolve("{buildin::time}"), "2024-05-06 07:08");
        assert_eq!(r.resolve("{buildin::time(year)}"), "2024");
        assert_eq!(r.resolve("{buildin::time(+1D)}"), "2024-05-07 07:08");
        assert_eq!(r.resolve("{buildin::time(world_idle)}"), "1 day from now");
    }

    #[test]
    fn time_overflow_is_left_verbatim() {
        let mut r = resolver();
        let text = "{buildin::time(+9999999999999Y)}";
        assert_eq!(r.resolve(text), text);
    }

    #[test]
    fn random_builtin() {
        let mut r = resolver();
        for _ in 0..50 {
            let n: i64 = r.resolve("{buildin::random(1, 6)}").parse().unwrap();
            assert!((1..=6).contains(&n));
            let n: i64 = r.resolve("{buildin::random(3d6)}").parse().unwrap();
            assert!((3..=18).contains(&n));
        }
        assert_eq!(r.resolve("{buildin::random(solo)}"), "solo");
        assert!(r.resolve("{buildin::random(0d6)}").starts_with("invalid dice: "));
    }

    #[test]
    fn random_failures_render_in_place() {
        let mut r = resolver();
        assert_eq!(r.resolve("{buildin::random}"), INVALID_ARGUMENTS);
        assert_eq!(r.resolve("{buildin::random()}"), INVALID_ARGUMENTS);
        assert_eq!(
            r.resolve("{buildin::random(9223372036854775807+1d6)}"),
            "invalid dice: dice total overflows"
        );
    }

    #[test]
    fn custom_table_limits_known_calls() {
        let mut table = DispatchTable::new();
        table.register(Phase::Builtin, "buildin", "sender", Call::Sender);
        let mut r = resolver().with_table(table);
        assert_eq!(
            r.resolve("{buildin::sender} {var::set(x,1)}"),
            "alice {var::set(x,1)}"
        );
        assert!(r.store().world().is_empty());
    }

    #[test]
    fn set_then_get() {
        let mut r = resolver();
        assert_eq!(r.resolve("{var::set(x,5)}{var::get(x)}"), "55");
        assert_eq!(r.store().world().get("x"), Some(&Value::from("5")));
    }

    #[test]
    fn nested_macros_resolve_inside_out() {
        let mut r = resolver();
        r.resolve("{var::set(name,hp)}{var::set(hp,12)}");
        assert_eq!(r.resolve("{var::get({var::get(name)})}"), "12");
        assert_eq!(
            r.resolve("{logic::if({var::get(hp)} > 10, healthy, hurt)}"),
            "healthy"
        );
    }

    #[test]
    fn builtin_result_feeds_later_phases() {
        let mut r = resolver();
        r.resolve("{var::set({buildin::sender}_seen, yes)}");
        assert_eq!(r.store().world().get("alice_seen"), Some(&Value::from("yes")));
    }

    #[test]
    fn self_referential_variable_is_bounded() {
        let mut world = Scope::new();
        world.insert("loop".to_string(), Value::from("{var::get(loop)}"));
        let mut r = resolver_with(world, Vec::new());
        // Terminates; the innermost level is left as text.
        let out = r.resolve("{var::get(loop)}");
        assert_eq!(out, "{var::get(loop)}");
        assert_eq!(r.depth, 0);
    }

    #[test]
    fn growing_self_reference_is_bounded() {
        let mut world = Scope::new();
        world.insert("x".to_string(), Value::from("a{var::get(x)}"));
        let mut r = resolver_with(world, Vec::new());
        let out = r.resolve("{var::get(x)}");
        assert!(out.starts_with('a'));
        assert!(out.ends_with("{var::get(x)}"));
        assert!(out.len() < 4 * MAX_RECURSION_DEPTH);
        assert_eq!(r.depth, 0);
        // The next call starts with a fresh budget.
        assert_eq!(r.resolve("{var::set(y,1)}{var::get(y)}"), "11");
    }

    #[test]
    fn chance_extremes() {
        let mut r = resolver();
        for _ in 0..100 {
            assert!(!r.chance(0.0));
            assert!(r.chance(1.0));
        }
    }

    #[test]
    fn replace_state_keeps_owner() {
        let mut r = resolver();
        let clock = r.clock().clone();
        r.replace_state(VariableStore::new("someone"), clock);
        assert_eq!(r.store().owner(), "alice");
        assert!(r.store().scope(WORLD_SCOPE).is_some());
    }
}
