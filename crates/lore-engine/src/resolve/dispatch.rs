//! The table mapping `(phase, namespace, function)` to a built-in call.

use lore_core::ArithOp;

/// A resolution phase. Phases run in declaration order, each to a fixpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// Side-effect-free built-ins: sender identity, time, randomness.
    Builtin,
    /// Variable assignment.
    Assign,
    /// Everything else: variable reads and arithmetic, logic.
    General,
}

impl Phase {
    /// All phases in execution order.
    pub const ORDER: [Phase; 3] = [Phase::Builtin, Phase::Assign, Phase::General];
}

/// A variable operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarOp {
    /// `var::set(name, value)`.
    Set,
    /// `var::get(name)`.
    Get,
    /// `var::del(name)`.
    Del,
    /// `var::add|sub|mul|div(a, b)`.
    Arith(ArithOp),
}

/// A logic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    /// `logic::if(cond, then[, else])`.
    If,
    /// `logic::and(...)`.
    And,
    /// `logic::or(...)`.
    Or,
    /// `logic::not(cond)`.
    Not,
}

/// A built-in the resolver knows how to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    /// `buildin::sender`.
    Sender,
    /// `buildin::sender_name`.
    SenderName,
    /// `buildin::time(...)`.
    Time,
    /// `buildin::random(...)`.
    Random,
    /// A `var::` function.
    Var(VarOp),
    /// A `logic::` function.
    Logic(LogicOp),
}

#[derive(Debug, Clone)]
struct Entry {
    phase: Phase,
    namespace: &'static str,
    function: &'static str,
    call: Call,
}

/// Lookup table queried by the resolver for every macro occurrence.
///
/// A name absent from the table in the current phase leaves the occurrence
/// untouched for that phase.
#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    entries: Vec<Entry>,
}

impl DispatchTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard `buildin`, `var`, and `logic` namespaces.
    ///
    /// `var::set` is registered both in the assignment phase and in the
    /// general phase, so an assignment whose arguments only become complete
    /// in the general phase still runs.
    pub fn standard() -> Self {
        let mut table = Self::new();
        table
            .register(Phase::Builtin, "buildin", "sender", Call::Sender)
            .register(Phase::Builtin, "buildin", "sender_name", Call::SenderName)
            .register(Phase::Builtin, "buildin", "time", Call::Time)
            .register(Phase::Builtin, "buildin", "random", Call::Random)
            .register(Phase::Assign, "var", "set", Call::Var(VarOp::Set));

        let vars = [
            ("set", VarOp::Set),
            ("get", VarOp::Get),
            ("del", VarOp::Del),
            ("add", VarOp::Arith(ArithOp::Add)),
            ("sub", VarOp::Arith(ArithOp::Sub)),
            ("mul", VarOp::Arith(ArithOp::Mul)),
            ("div", VarOp::Arith(ArithOp::Div)),
        ];
        for (function, op) in vars {
            table.register(Phase::General, "var", function, Call::Var(op));
        }

        let logic = [
            ("if", LogicOp::If),
            ("and", LogicOp::And),
            ("or", LogicOp::Or),
            ("not", LogicOp::Not),
        ];
        for (function, op) in logic {
            table.register(Phase::General, "logic", function, Call::Logic(op));
        }
        table
    }

    /// Add or replace an entry.
    pub fn register(
        &mut self,
        phase: Phase,
        namespace: &'static str,
        function: &'static str,
        call: Call,
    ) -> &mut Self {
        self.entries
            .retain(|e| !(e.phase == phase && e.namespace == namespace && e.function == function));
        self.entries.push(Entry {
            phase,
            namespace,
            function,
            call,
        });
        self
    }

    /// Find the call registered for a name in a phase.
    pub fn lookup(&self, phase: Phase, namespace: &str, function: &str) -> Option<Call> {
        self.entries
            .iter()
            .find(|e| e.phase == phase && e.namespace == namespace && e.function == function)
            .map(|e| e.call)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
