//! Engine configuration and the addressing identity.

use std::path::PathBuf;

/// Directory used for snapshots when none is configured.
pub const DEFAULT_STATE_DIR: &str = "data/lore_saves";

/// Configuration for a lore engine instance.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How many recent messages triggers are matched against.
    pub scan_depth: usize,
    /// RNG seed for reproducible probability gates, dice, and choices.
    /// `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Directory of the default JSON snapshot store.
    pub state_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scan_depth: 1,
            seed: None,
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
        }
    }
}

impl EngineConfig {
    /// Set the window size (at least 1).
    pub fn with_scan_depth(mut self, scan_depth: usize) -> Self {
        self.scan_depth = scan_depth.max(1);
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the snapshot directory.
    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = dir.into();
        self
    }
}

/// Who is speaking and in which session.
///
/// `sender_id` addresses per-sender scopes; `session` names snapshot files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Stable sender identifier.
    pub sender_id: String,
    /// Display name returned by `buildin::sender_name`.
    pub sender_name: String,
    /// Session key used for persistence.
    pub session: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self::new("bot", "bot", "default")
    }
}

impl Identity {
    /// Create an identity.
    pub fn new(
        sender_id: impl Into<String>,
        sender_name: impl Into<String>,
        session: impl Into<String>,
    ) -> Self {
        Self {
            sender_id: sender_id.into(),
            sender_name: sender_name.into(),
            session: session.into(),
        }
    }
}
