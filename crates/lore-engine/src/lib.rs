//! Lorebook engine: macro resolution, trigger evaluation and persistence.
//!
//! A host pushes chat messages into a [`LoreEngine`] with
//! [`LoreEngine::ingest`], calls [`LoreEngine::process_turn`] once per turn,
//! and splices the returned [`lore_core::LoreResult`] buckets into its prompt.
//!
//! ```no_run
//! use lore_engine::{EngineConfig, LoreEngine};
//!
//! let doc = r#"{ "trigger": [ { "match": "hello", "content": "Bonjour" } ] }"#;
//! let mut engine = LoreEngine::from_json(doc, EngineConfig::default())?;
//! engine.ingest("hello there");
//! let lore = engine.process_turn();
//! assert_eq!(lore.sys_start, ["Bonjour"]);
//! # Ok::<(), lore_engine::EngineError>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod persist;
pub mod resolve;
pub mod trigger;
pub mod window;

pub use config::{DEFAULT_STATE_DIR, EngineConfig, Identity};
pub use engine::{LoreEngine, WORLD_TIME_VAR};
pub use error::{EngineError, EngineResult};
pub use persist::{JsonFileStore, ScopeKind, SnapshotStore, sanitize_session};
pub use resolve::{DispatchTable, MAX_RECURSION_DEPTH, MacroResolver, Phase};
pub use trigger::{Matcher, Rule, TriggerEngine};
pub use window::ConversationWindow;
