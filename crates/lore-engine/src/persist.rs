//! Snapshot persistence for variable scopes.
//!
//! Snapshots are whole documents: saving writes the full current state of a
//! scope kind and loading replaces it. Nothing is merged.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{EngineError, EngineResult};

/// Which part of the variable store a snapshot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// The global `world` scope.
    World,
    /// Every per-sender derived scope, keyed `<sender>:<scope>`.
    User,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::World => write!(f, "world"),
            Self::User => write!(f, "user"),
        }
    }
}

impl FromStr for ScopeKind {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        match s.trim() {
            "world" => Ok(Self::World),
            "user" => Ok(Self::User),
            other => Err(EngineError::UnknownScopeKind(other.to_string())),
        }
    }
}

/// Storage for snapshot documents, keyed by session and scope kind.
pub trait SnapshotStore: fmt::Debug {
    /// Write a snapshot, replacing any previous one.
    fn save(&self, session: &str, kind: ScopeKind, snapshot: &serde_json::Value)
    -> EngineResult<()>;

    /// Read a snapshot. `Ok(None)` means none was ever saved.
    fn load(&self, session: &str, kind: ScopeKind) -> EngineResult<Option<serde_json::Value>>;
}

/// Replace characters that are unsafe in file names with `_`.
pub fn sanitize_session(session: &str) -> String {
    session
        .chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '!' => '_',
            other => other,
        })
        .collect()
}

/// Pretty-printed JSON files in one directory:
/// `<session>_world_state.json` and `<session>_user_state.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Store files under `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory holding the snapshot files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file a snapshot is stored in.
    pub fn path(&self, session: &str, kind: ScopeKind) -> PathBuf {
        self.dir
            .join(format!("{}_{kind}_state.json", sanitize_session(session)))
    }
}

impl SnapshotStore for JsonFileStore {
    fn save(
        &self,
        session: &str,
        kind: ScopeKind,
        snapshot: &serde_json::Value,
    ) -> EngineResult<()> {
        fs::create_dir_all(&self.dir).map_err(|source| EngineError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path(session, kind);
        tracing::debug!(path = %path.display(), %kind, "saving snapshot");
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&path, json).map_err(|source| EngineError::Io { path, source })
    }

    fn load(&self, session: &str, kind: ScopeKind) -> EngineResult<Option<serde_json::Value>> {
        let path = self.path(session, kind);
        if !path.exists() {
            return Ok(None);
        }
        tracing::debug!(path = %path.display(), %kind, "loading snapshot");
        let content =
            fs::read_to_string(&path).map_err(|source| EngineError::Io { path, source })?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sanitizes_session_names() {
        assert_eq!(sanitize_session(r#"a/b\c:d*e?f"g<h>i|j!k"#), "a_b_c_d_e_f_g_h_i_j_k");
        assert_eq!(sanitize_session("group-42"), "group-42");
    }

    #[test]
    fn file_names() {
        let store = JsonFileStore::new("/saves");
        assert_eq!(
            store.path("qq:123", ScopeKind::World),
            PathBuf::from("/saves/qq_123_world_state.json")
        );
        assert_eq!(
            store.path("s", ScopeKind::User),
            PathBuf::from("/saves/s_user_state.json")
        );
    }

    #[test]
    fn scope_kind_names() {
        assert_eq!("world".parse::<ScopeKind>().unwrap(), ScopeKind::World);
        assert_eq!(" user ".parse::<ScopeKind>().unwrap(), ScopeKind::User);
        assert!(matches!(
            "both".parse::<ScopeKind>(),
            Err(EngineError::UnknownScopeKind(_))
        ));
        assert_eq!(ScopeKind::User.to_string(), "user");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested"));
        let snapshot = json!({ "gold": 10, "weather": "rain" });

        assert!(!store.dir().exists());
        store.save("s1", ScopeKind::World, &snapshot).unwrap();
        assert!(store.dir().is_dir());
        let loaded = store.load("s1", ScopeKind::World).unwrap();
        assert_eq!(loaded, Some(snapshot));
        assert_eq!(store.load("s1", ScopeKind::User).unwrap(), None);
        assert_eq!(store.load("other", ScopeKind::World).unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        fs::write(store.path("s", ScopeKind::World), "{ not json").unwrap();
        assert!(matches!(
            store.load("s", ScopeKind::World),
            Err(EngineError::Snapshot(_))
        ));
    }
}
