//! Trigger evaluation.
//!
//! Rules run in a fixed order: descending priority, ties in definition order.
//! A rule that passes its gate contributes its resolved content and runs its
//! actions; an action resolving to another rule's name processes that rule
//! with the gate skipped. A blocking rule that passed its gate ends the pass.

pub mod keywords;
pub mod matcher;

use std::collections::{HashMap, HashSet};

use lore_core::logic::evaluate;
use lore_core::{LoreResult, Note, Trigger, TriggerKind};

use crate::resolve::{MAX_RECURSION_DEPTH, MacroResolver};
use crate::window::ConversationWindow;

pub use keywords::KeywordMatcher;
pub use matcher::Matcher;

/// A trigger with its compiled matcher.
#[derive(Debug, Clone)]
pub struct Rule {
    /// The trigger definition.
    pub trigger: Trigger,
    /// Compiled from the trigger's kind and pattern.
    pub matcher: Matcher,
}

impl Rule {
    /// Compile a trigger.
    pub fn new(trigger: Trigger) -> Self {
        let matcher = Matcher::compile(&trigger);
        Self { trigger, matcher }
    }
}

/// Whether the top-level loop keeps going after a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// State that lives for a single pass.
#[derive(Debug, Default)]
struct Pass {
    fired_listeners: HashSet<String>,
    result: LoreResult,
}

/// The ordered rule set plus author's notes.
#[derive(Debug, Clone, Default)]
pub struct TriggerEngine {
    rules: Vec<Rule>,
    by_name: HashMap<String, usize>,
    notes: Vec<Note>,
}

impl TriggerEngine {
    /// Compile and order the triggers. Names are expected to be unique; a
    /// later duplicate shadows an earlier one as an action target.
    pub fn new(triggers: Vec<Trigger>, notes: Vec<Note>) -> Self {
        let mut rules: Vec<Rule> = triggers.into_iter().map(Rule::new).collect();
        // Stable: equal priorities keep definition order.
        rules.sort_by(|a, b| b.trigger.priority.cmp(&a.trigger.priority));
        let by_name = rules
            .iter()
            .enumerate()
            .map(|(i, rule)| (rule.trigger.name.clone(), i))
            .collect();
        Self {
            rules,
            by_name,
            notes,
        }
    }

    /// The rules in evaluation order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The author's notes.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Run one evaluation pass over the window.
    pub fn process(
        &self,
        window: &ConversationWindow,
        resolver: &mut MacroResolver,
    ) -> LoreResult {
        let mut pass = Pass::default();

        for index in 0..self.rules.len() {
            if self.process_rule(index, window, resolver, &mut pass, 1, false) == Flow::Stop {
                let rule = &self.rules[index].trigger.name;
                tracing::debug!(rule = %rule, "blocking rule ended the pass");
                break;
            }
        }

        for note in &self.notes {
            if resolver.chance(note.probability) {
                let content = resolver.resolve(&note.content);
                pass.result.push(note.position, content);
            }
        }
        pass.result
    }

    fn process_rule(
        &self,
        index: usize,
        window: &ConversationWindow,
        resolver: &mut MacroResolver,
        pass: &mut Pass,
        depth: usize,
        chained: bool,
    ) -> Flow {
        let rule = &self.rules[index];
        let trigger = &rule.trigger;
        if depth > MAX_RECURSION_DEPTH {
            tracing::warn!(rule = %trigger.name, depth, "action chain depth cap hit");
            return Flow::Continue;
        }

        let listener = trigger.kind == TriggerKind::Listener;
        if listener && pass.fired_listeners.contains(&trigger.name) {
            return Flow::Continue;
        }
        if !chained && !self.gate(rule, window, resolver) {
            return Flow::Continue;
        }
        if listener {
            pass.fired_listeners.insert(trigger.name.clone());
        }

        tracing::debug!(rule = %trigger.name, depth, chained, "rule fired");
        let content = resolver.resolve(&trigger.content);
        pass.result.push(trigger.position, content);

        for action in &trigger.actions {
            let target = resolver.resolve(action);
            if target == trigger.name {
                continue;
            }
            if let Some(&next) = self.by_name.get(&target) {
                tracing::debug!(from = %trigger.name, to = %target, depth, "chaining rule");
                self.process_rule(next, window, resolver, pass, depth + 1, true);
            }
        }

        if trigger.block {
            Flow::Stop
        } else {
            Flow::Continue
        }
    }

    /// Probability, then condition, then message match.
    fn gate(
        &self,
        rule: &Rule,
        window: &ConversationWindow,
        resolver: &mut MacroResolver,
    ) -> bool {
        let trigger = &rule.trigger;
        if !resolver.chance(trigger.probability) {
            return false;
        }
        if let Some(condition) = &trigger.conditional {
            let resolved = resolver.resolve(condition);
            if !evaluate(&resolved) {
                return false;
            }
        }
        rule.matcher.matches_window(window)
    }
}
