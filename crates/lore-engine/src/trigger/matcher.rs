//! Per-rule message matchers, compiled once at engine construction.

use regex::Regex;

use lore_core::{Trigger, TriggerKind};

use super::keywords::KeywordMatcher;
use crate::window::ConversationWindow;

/// How a rule decides whether the conversation mentions it.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Listener rules: always match.
    Always,
    /// Regex or keyword rules without a pattern: never match.
    Never,
    /// A compiled regex, searched anywhere in a message.
    Regex(Regex),
    /// A keyword list.
    Keywords(KeywordMatcher),
    /// A pattern that failed to compile. The rule never matches.
    Invalid(String),
}

impl Matcher {
    /// Compile the matcher for a trigger. Compile failures are logged and
    /// produce [`Matcher::Invalid`].
    pub fn compile(trigger: &Trigger) -> Self {
        let pattern = match (trigger.kind, trigger.pattern.as_deref()) {
            (TriggerKind::Listener, _) => return Self::Always,
            (_, None) | (_, Some("")) => return Self::Never,
            (_, Some(pattern)) => pattern,
        };

        let compiled = match trigger.kind {
            TriggerKind::Regex => Regex::new(pattern).map(Self::Regex).map_err(|e| e.to_string()),
            _ => KeywordMatcher::new(pattern, trigger.use_logic)
                .map(Self::Keywords)
                .map_err(|e| e.to_string()),
        };
        compiled.unwrap_or_else(|error| {
            tracing::warn!(
                rule = %trigger.name,
                pattern,
                %error,
                "invalid match pattern, rule disabled"
            );
            Self::Invalid(error)
        })
    }

    /// Returns true if the matcher accepts `message`.
    pub fn is_match(&self, message: &str) -> bool {
        match self {
            Self::Always => true,
            Self::Never | Self::Invalid(_) => false,
            Self::Regex(re) => re.is_match(message),
            Self::Keywords(keywords) => keywords.is_match(message),
        }
    }

    /// Returns true if any message in the window matches. Listeners match
    /// even an empty window; other matchers need at least one message.
    pub fn matches_window(&self, window: &ConversationWindow) -> bool {
        match self {
            Self::Always => true,
            _ => window.iter().any(|message| self.is_match(message)),
        }
    }
}
