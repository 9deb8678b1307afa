//! Trigger rules, author's notes, and the per-pass output buckets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a trigger decides whether the conversation matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// A regular expression searched in each message.
    Regex,
    /// A keyword list matched against each message.
    #[default]
    Keywords,
    /// Always matches; fires at most once per pass.
    Listener,
}

impl TriggerKind {
    /// Parse a kind name, falling back to [`TriggerKind::Keywords`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "regex" => Self::Regex,
            "listener" => Self::Listener,
            _ => Self::Keywords,
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regex => write!(f, "regex"),
            Self::Keywords => write!(f, "keywords"),
            Self::Listener => write!(f, "listener"),
        }
    }
}

/// Where in the prompt a piece of lore is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// Start of the system prompt.
    #[default]
    SysStart,
    /// Start of the user message.
    UserStart,
    /// End of the system prompt.
    SysEnd,
    /// End of the user message.
    UserEnd,
}

impl Position {
    /// Parse a position name, falling back to [`Position::SysStart`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "user_start" => Self::UserStart,
            "sys_end" => Self::SysEnd,
            "user_end" => Self::UserEnd,
            _ => Self::SysStart,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SysStart => write!(f, "sys_start"),
            Self::UserStart => write!(f, "user_start"),
            Self::SysEnd => write!(f, "sys_end"),
            Self::UserEnd => write!(f, "user_end"),
        }
    }
}

/// A lore rule. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    /// Unique name, used as the target of other triggers' actions.
    pub name: String,
    /// Match strategy.
    pub kind: TriggerKind,
    /// Regex source or keyword list, depending on `kind`.
    pub pattern: Option<String>,
    /// Condition resolved and evaluated before matching.
    pub conditional: Option<String>,
    /// Higher priorities are evaluated first.
    pub priority: i64,
    /// Stop evaluating later triggers once this one fires.
    pub block: bool,
    /// Enables `&`/`~` combinators in keyword entries.
    pub use_logic: bool,
    /// Output bucket for the content.
    pub position: Position,
    /// Chance of passing the probability gate, in `[0, 1]`.
    pub probability: f64,
    /// Templates resolving to names of triggers to chain into.
    pub actions: Vec<String>,
    /// Template appended to the output bucket when the trigger fires.
    pub content: String,
}

impl Trigger {
    /// Create a keyword trigger with default settings.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TriggerKind::Keywords,
            pattern: None,
            conditional: None,
            priority: 0,
            block: false,
            use_logic: true,
            position: Position::SysStart,
            probability: 1.0,
            actions: Vec::new(),
            content: content.into(),
        }
    }

    /// Set the match kind and pattern.
    pub fn matching(mut self, kind: TriggerKind, pattern: impl Into<String>) -> Self {
        self.kind = kind;
        self.pattern = Some(pattern.into());
        self
    }

    /// Make this a listener trigger.
    pub fn listener(mut self) -> Self {
        self.kind = TriggerKind::Listener;
        self
    }

    /// Set the conditional expression.
    pub fn with_condition(mut self, conditional: impl Into<String>) -> Self {
        self.conditional = Some(conditional.into());
        self
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    /// Set the block flag.
    pub fn blocking(mut self, block: bool) -> Self {
        self.block = block;
        self
    }

    /// Set keyword logic mode.
    pub fn with_logic(mut self, use_logic: bool) -> Self {
        self.use_logic = use_logic;
        self
    }

    /// Set the output position.
    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Set the probability (clamped to `[0, 1]`).
    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = clamp_probability(probability);
        self
    }

    /// Append an action.
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }
}

/// An author's note: content gated only by probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Template appended to the output bucket.
    pub content: String,
    /// Chance of being included, in `[0, 1]`.
    pub probability: f64,
    /// Output bucket.
    pub position: Position,
}

impl Note {
    /// Create a note that is always included.
    pub fn new(content: impl Into<String>, position: Position) -> Self {
        Self {
            content: content.into(),
            probability: 1.0,
            position,
        }
    }
}

/// Clamp a probability into `[0, 1]`. NaN counts as 0.
pub fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}

/// The lore produced by one evaluation pass, bucketed by prompt position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoreResult {
    /// Start of the system prompt.
    pub sys_start: Vec<String>,
    /// Start of the user message.
    pub user_start: Vec<String>,
    /// End of the system prompt.
    pub sys_end: Vec<String>,
    /// End of the user message.
    pub user_end: Vec<String>,
    /// Reserved. No evaluation path writes here.
    pub res_start: Vec<String>,
    /// Reserved. No evaluation path writes here.
    pub res_end: Vec<String>,
}

impl LoreResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append content to the bucket for `position`.
    pub fn push(&mut self, position: Position, content: String) {
        self.bucket_mut(position).push(content);
    }

    /// The bucket for `position`.
    pub fn bucket(&self, position: Position) -> &[String] {
        match position {
            Position::SysStart => &self.sys_start,
            Position::UserStart => &self.user_start,
            Position::SysEnd => &self.sys_end,
            Position::UserEnd => &self.user_end,
        }
    }

    fn bucket_mut(&mut self, position: Position) -> &mut Vec<String> {
        match position {
            Position::SysStart => &mut self.sys_start,
            Position::UserStart => &mut self.user_start,
            Position::SysEnd => &mut self.sys_end,
            Position::UserEnd => &mut self.user_end,
        }
    }

    /// Total number of entries across the four active buckets.
    pub fn len(&self) -> usize {
        self.sys_start.len() + self.user_start.len() + self.sys_end.len() + self.user_end.len()
    }

    /// Returns true if nothing was produced.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_and_position_fallbacks() {
        assert_eq!(TriggerKind::from_name("regex"), TriggerKind::Regex);
        assert_eq!(TriggerKind::from_name("listener"), TriggerKind::Listener);
        assert_eq!(TriggerKind::from_name("bogus"), TriggerKind::Keywords);
        assert_eq!(Position::from_name("user_end"), Position::UserEnd);
        assert_eq!(Position::from_name("middle"), Position::SysStart);
    }

    #[test]
    fn probability_is_clamped() {
        assert_eq!(Trigger::new("a", "").with_probability(1.5).probability, 1.0);
        assert_eq!(Trigger::new("a", "").with_probability(-0.2).probability, 0.0);
        assert_eq!(clamp_probability(f64::NAN), 0.0);
    }

    #[test]
    fn result_buckets() {
        let mut result = LoreResult::new();
        assert!(result.is_empty());
        result.push(Position::UserEnd, "tail".to_string());
        result.push(Position::SysStart, "head".to_string());
        assert_eq!(result.bucket(Position::UserEnd), ["tail".to_string()]);
        assert_eq!(result.sys_start, vec!["head".to_string()]);
        assert_eq!(result.len(), 2);
        assert!(result.res_start.is_empty());
    }

    #[test]
    fn display_names() {
        assert_eq!(Position::SysEnd.to_string(), "sys_end");
        assert_eq!(TriggerKind::Listener.to_string(), "listener");
    }
}
