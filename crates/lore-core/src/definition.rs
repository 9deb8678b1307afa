//! The lorebook definition document.
//!
//! Produced by an external loader and consumed once at engine construction.
//! Every field is optional; missing values take the documented defaults.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::store::Scope;
use crate::trigger::{Note, Position, Trigger, TriggerKind, clamp_probability};

/// A complete lorebook definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LorebookDefinition {
    /// Initial variables of the `world` scope.
    pub world_state: Scope,
    /// Named template scopes copied into per-sender scopes on first use.
    pub user_state: Vec<UserState>,
    /// Trigger records, in definition order.
    pub trigger: Vec<TriggerRecord>,
    /// Author's note records.
    pub authors_note: Vec<NoteRecord>,
}

/// A named template scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserState {
    /// Scope name.
    pub name: String,
    /// Initial variables.
    pub variables: Scope,
}

/// A trigger as written in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerRecord {
    /// Trigger name; generated when missing or empty.
    pub name: Option<String>,
    /// `regex`, `keywords` or `listener`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Regex source or keyword list.
    #[serde(rename = "match")]
    pub pattern: Option<String>,
    /// Optional condition.
    pub conditional: Option<String>,
    /// Evaluation priority.
    pub priority: i64,
    /// Block flag.
    pub block: bool,
    /// Probability in `[0, 1]`.
    pub probability: f64,
    /// Keyword logic mode.
    pub use_logic: bool,
    /// Output position name.
    pub position: String,
    /// Content template.
    pub content: String,
    /// Action templates.
    pub actions: Vec<String>,
}

impl Default for TriggerRecord {
    fn default() -> Self {
        Self {
            name: None,
            kind: TriggerKind::Keywords.to_string(),
            pattern: None,
            conditional: None,
            priority: 0,
            block: false,
            probability: 1.0,
            use_logic: true,
            position: Position::SysStart.to_string(),
            content: String::new(),
            actions: Vec::new(),
        }
    }
}

impl From<TriggerRecord> for Trigger {
    fn from(record: TriggerRecord) -> Self {
        let name = record
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("trigger_{}", Uuid::new_v4().simple()));
        Self {
            name,
            kind: TriggerKind::from_name(&record.kind),
            pattern: record.pattern,
            conditional: record.conditional.filter(|c| !c.is_empty()),
            priority: record.priority,
            block: record.block,
            use_logic: record.use_logic,
            position: Position::from_name(&record.position),
            probability: clamp_probability(record.probability),
            actions: record.actions,
            content: record.content,
        }
    }
}

/// An author's note as written in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteRecord {
    /// Content template.
    pub content: String,
    /// Probability in `[0, 1]`.
    pub probability: f64,
    /// Output position name.
    pub position: String,
}

impl Default for NoteRecord {
    fn default() -> Self {
        Self {
            content: String::new(),
            probability: 1.0,
            position: Position::SysStart.to_string(),
        }
    }
}

impl From<NoteRecord> for Note {
    fn from(record: NoteRecord) -> Self {
        Self {
            content: record.content,
            probability: clamp_probability(record.probability),
            position: Position::from_name(&record.position),
        }
    }
}

impl LorebookDefinition {
    /// Parse a definition from JSON.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the triggers in definition order, rejecting duplicate names.
    pub fn triggers(&self) -> CoreResult<Vec<Trigger>> {
        let mut seen = HashSet::new();
        let mut triggers = Vec::with_capacity(self.trigger.len());
        for record in &self.trigger {
            let trigger = Trigger::from(record.clone());
            if !seen.insert(trigger.name.clone()) {
                return Err(CoreError::DuplicateTrigger(trigger.name));
            }
            triggers.push(trigger);
        }
        Ok(triggers)
    }

    /// Build the author's notes in definition order.
    pub fn notes(&self) -> Vec<Note> {
        self.authors_note.iter().cloned().map(Note::from).collect()
    }

    /// The named template scopes.
    pub fn template_scopes(&self) -> impl Iterator<Item = (String, Scope)> + '_ {
        self.user_state
            .iter()
            .map(|u| (u.name.clone(), u.variables.clone()))
    }
}
