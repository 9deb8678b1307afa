//! The host-facing lore engine.
//!
//! `LoreEngine` owns everything one conversation needs: the message window,
//! the compiled rules, the macro resolver with its store, clock and RNG, and
//! a snapshot store for persistence.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rand::SeedableRng;
use rand::rngs::StdRng;

use lore_core::{LoreResult, LorebookDefinition, Scope, Value, VariableStore};
use lore_time::{WorldClock, wall_clock};

use crate::config::{EngineConfig, Identity};
use crate::error::EngineResult;
use crate::persist::{JsonFileStore, ScopeKind, SnapshotStore};
use crate::resolve::MacroResolver;
use crate::trigger::TriggerEngine;
use crate::window::ConversationWindow;

/// Name of the `world` variable that seeds the clock.
pub const WORLD_TIME_VAR: &str = "world_time";

/// A lore engine for one conversation.
#[derive(Debug)]
pub struct LoreEngine {
    resolver: MacroResolver,
    triggers: TriggerEngine,
    window: ConversationWindow,
    snapshots: Box<dyn SnapshotStore>,
    config: EngineConfig,
}

impl LoreEngine {
    /// Build an engine from a definition.
    ///
    /// Fails on duplicate trigger names.
    pub fn new(definition: &LorebookDefinition, config: EngineConfig) -> EngineResult<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let identity = Identity::default();
        let (store, clock) = initial_state(definition, &identity);
        let resolver = MacroResolver::new(store, clock, rng, identity)?;
        let triggers = TriggerEngine::new(definition.triggers()?, definition.notes());

        tracing::debug!(
            rules = triggers.rules().len(),
            notes = triggers.notes().len(),
            scan_depth = config.scan_depth,
            "lore engine ready"
        );

        Ok(Self {
            resolver,
            triggers,
            window: ConversationWindow::new(config.scan_depth),
            snapshots: Box::new(JsonFileStore::new(config.state_dir.clone())),
            config,
        })
    }

    /// Build an engine from a JSON definition document.
    pub fn from_json(json: &str, config: EngineConfig) -> EngineResult<Self> {
        let definition = LorebookDefinition::from_json(json)?;
        Self::new(&definition, config)
    }

    /// Use a different snapshot store.
    pub fn with_snapshot_store(mut self, store: impl SnapshotStore + 'static) -> Self {
        self.snapshots = Box::new(store);
        self
    }

    /// The configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Push a message into the window. Blank messages are ignored.
    pub fn ingest(&mut self, message: &str) {
        self.window.push(message);
    }

    /// Run one trigger pass over the window at the current wall-clock time.
    pub fn process_turn(&mut self) -> LoreResult {
        self.process_turn_at(wall_clock())
    }

    /// Run one trigger pass, recording `now` as the time of real activity.
    pub fn process_turn_at(&mut self, now: NaiveDateTime) -> LoreResult {
        self.resolver.clock_mut().mark_real_activity(now);
        self.triggers.process(&self.window, &mut self.resolver)
    }

    /// Resolve macros in arbitrary text against this engine's state.
    pub fn resolve(&mut self, text: &str) -> String {
        self.resolver.resolve(text)
    }

    /// Switch the speaker and session.
    pub fn set_identity(&mut self, identity: Identity) {
        self.resolver.set_identity(identity);
    }

    /// The current speaker and session.
    pub fn identity(&self) -> &Identity {
        self.resolver.identity()
    }

    /// A scope by storage key (`world` or `<sender>:<scope>`), without
    /// materializing anything.
    pub fn variables(&self, scope_key: &str) -> Option<&Scope> {
        self.resolver.store().scope(scope_key)
    }

    /// The current in-world time.
    pub fn current_time(&self) -> NaiveDateTime {
        self.resolver.clock().current()
    }

    /// The conversation window.
    pub fn window(&self) -> &ConversationWindow {
        &self.window
    }

    /// The compiled rules and notes.
    pub fn triggers(&self) -> &TriggerEngine {
        &self.triggers
    }

    /// Replace rules, notes, variables and clock from a definition.
    ///
    /// The RNG stream, identity and window are kept.
    pub fn reset(&mut self, definition: &LorebookDefinition) -> EngineResult<()> {
        let triggers = TriggerEngine::new(definition.triggers()?, definition.notes());
        let (store, clock) = initial_state(definition, self.resolver.identity());
        self.triggers = triggers;
        self.resolver.replace_state(store, clock);
        tracing::debug!(rules = self.triggers.rules().len(), "lore engine reset");
        Ok(())
    }

    /// Save one kind of scope for the current session and report the outcome.
    pub fn save(&self, kind: ScopeKind) -> String {
        match self.try_save(kind) {
            Ok(true) => format!("{kind} state saved"),
            Ok(false) => format!("{kind} state is empty, nothing saved"),
            Err(e) => {
                tracing::warn!(%kind, error = %e, "save failed");
                format!("save failed: {e}")
            }
        }
    }

    fn try_save(&self, kind: ScopeKind) -> EngineResult<bool> {
        let store = self.resolver.store();
        let snapshot = match kind {
            ScopeKind::World if store.world().is_empty() => return Ok(false),
            ScopeKind::World => serde_json::to_value(store.world())?,
            ScopeKind::User => {
                let derived = store.derived_scopes();
                if derived.is_empty() {
                    return Ok(false);
                }
                serde_json::to_value(derived)?
            }
        };
        self.snapshots
            .save(&self.identity().session, kind, &snapshot)?;
        Ok(true)
    }

    /// Load one kind of scope for the current session, replacing what is in
    /// memory, and report the outcome. A missing snapshot changes nothing.
    pub fn load(&mut self, kind: ScopeKind) -> String {
        match self.try_load(kind) {
            Ok(true) => format!("{kind} state loaded"),
            Ok(false) => format!(
                "no saved {kind} state for session {}",
                self.identity().session
            ),
            Err(e) => {
                tracing::warn!(%kind, error = %e, "load failed");
                format!("load failed: {e}")
            }
        }
    }

    fn try_load(&mut self, kind: ScopeKind) -> EngineResult<bool> {
        let Some(snapshot) = self.snapshots.load(&self.identity().session, kind)? else {
            return Ok(false);
        };
        let store = self.resolver.store_mut();
        match kind {
            ScopeKind::World => {
                let world: Scope = serde_json::from_value(snapshot)?;
                store.replace_world(world);
            }
            ScopeKind::User => {
                let derived: BTreeMap<String, Scope> = serde_json::from_value(snapshot)?;
                store.replace_derived(derived);
            }
        }
        Ok(true)
    }
}

/// A fresh store and clock for a definition. The clock starts at the stored
/// `world_time` when there is one.
fn initial_state(
    definition: &LorebookDefinition,
    identity: &Identity,
) -> (VariableStore, WorldClock) {
    let stored_time = match definition.world_state.get(WORLD_TIME_VAR) {
        Some(Value::Text(text)) => Some(text.as_str()),
        _ => None,
    };
    let clock = WorldClock::from_stored(stored_time, wall_clock());
    let store = VariableStore::with_scopes(
        identity.sender_id.clone(),
        definition.world_state.clone(),
        definition.template_scopes(),
    );
    (store, clock)
}
