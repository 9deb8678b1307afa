//! Scoped variable storage.
//!
//! `world` is the one global scope. Every other scope name `S` is addressed
//! per sender as `<sender>:S`. A derived scope is materialized on first
//! reference by copying whatever is currently stored under the bare name `S`;
//! later writes to `S` do not reach an already-materialized copy.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use crate::value::Value;

/// Name of the global scope.
pub const WORLD_SCOPE: &str = "world";

/// The variables of one scope.
pub type Scope = HashMap<String, Value>;

static EMPTY_SCOPE: LazyLock<Scope> = LazyLock::new(Scope::new);

/// Split `scope.name` into its parts, falling back to `default_scope` for a
/// bare name. Only the first `.` separates.
pub fn split_scoped<'a>(var: &'a str, default_scope: &'a str) -> (&'a str, &'a str) {
    var.split_once('.').unwrap_or((default_scope, var))
}

/// Variable storage for one conversation.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    scopes: HashMap<String, Scope>,
    owner: String,
    // scope name -> resolved key, valid for the current owner and scope set
    key_cache: HashMap<String, String>,
}

impl VariableStore {
    /// Create an empty store owned by `owner`.
    pub fn new(owner: impl Into<String>) -> Self {
        let mut scopes = HashMap::new();
        scopes.insert(WORLD_SCOPE.to_string(), Scope::new());
        Self {
            scopes,
            owner: owner.into(),
            key_cache: HashMap::new(),
        }
    }

    /// Create a store from initial `world` variables and named template scopes.
    pub fn with_scopes(
        owner: impl Into<String>,
        world: Scope,
        named: impl IntoIterator<Item = (String, Scope)>,
    ) -> Self {
        let mut store = Self::new(owner);
        store.scopes.insert(WORLD_SCOPE.to_string(), world);
        store.scopes.extend(named);
        store
    }

    /// The sender whose derived scopes are addressed.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Switch the addressing sender. Invalidates cached scope keys.
    pub fn set_owner(&mut self, owner: impl Into<String>) {
        let owner = owner.into();
        if owner != self.owner {
            self.owner = owner;
            self.key_cache.clear();
        }
    }

    /// Resolve a scope name to its storage key, materializing it on first use.
    pub fn scope_key(&mut self, scope: &str) -> String {
        let key = match self.key_cache.get(scope) {
            Some(key) => key.clone(),
            None => {
                let key = if scope == WORLD_SCOPE {
                    WORLD_SCOPE.to_string()
                } else {
                    format!("{}:{scope}", self.owner)
                };
                self.key_cache.insert(scope.to_string(), key.clone());
                key
            }
        };

        if !self.scopes.contains_key(&key) {
            let initial = self.scopes.get(scope).cloned().unwrap_or_default();
            tracing::debug!(scope, key = %key, vars = initial.len(), "materialized scope");
            self.scopes.insert(key.clone(), initial);
        }
        key
    }

    /// Read a variable.
    pub fn get(&mut self, name: &str, scope: &str) -> Option<&Value> {
        let key = self.scope_key(scope);
        self.scopes.get(&key).and_then(|s| s.get(name))
    }

    /// Write a variable.
    pub fn set(&mut self, name: impl Into<String>, scope: &str, value: Value) {
        let key = self.scope_key(scope);
        self.scopes
            .entry(key)
            .or_default()
            .insert(name.into(), value);
    }

    /// Delete a variable, returning its previous value.
    pub fn remove(&mut self, name: &str, scope: &str) -> Option<Value> {
        let key = self.scope_key(scope);
        self.scopes.get_mut(&key).and_then(|s| s.remove(name))
    }

    /// Look at a scope by storage key without materializing anything.
    pub fn scope(&self, key: &str) -> Option<&Scope> {
        self.scopes.get(key)
    }

    /// The global scope.
    pub fn world(&self) -> &Scope {
        self.scopes
            .get(WORLD_SCOPE)
            .unwrap_or(&EMPTY_SCOPE)
    }

    /// Replace the global scope wholesale.
    pub fn replace_world(&mut self, world: Scope) {
        self.scopes.insert(WORLD_SCOPE.to_string(), world);
        self.key_cache.clear();
    }

    /// All materialized per-sender scopes, keyed `<sender>:<scope>`.
    pub fn derived_scopes(&self) -> BTreeMap<String, Scope> {
        self.scopes
            .iter()
            .filter(|(key, _)| is_derived_key(key))
            .map(|(key, scope)| (key.clone(), scope.clone()))
            .collect()
    }

    /// Replace the set of per-sender scopes wholesale.
    pub fn replace_derived(&mut self, derived: impl IntoIterator<Item = (String, Scope)>) {
        self.scopes.retain(|key, _| !is_derived_key(key));
        self.scopes.extend(derived);
        self.key_cache.clear();
    }
}

fn is_derived_key(key: &str) -> bool {
    key != WORLD_SCOPE && key.contains(':')
}


#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> VariableStore {
        let mut world = Scope::new();
        world.insert("gold".to_string(), Value::from("10"));
        let mut player = Scope::new();
        player.insert("hp".to_string(), Value::Integer(20));
        VariableStore::with_scopes("alice", world, [("player".to_string(), player)])
    }

    #[test]
    fn split_scoped_names() {
        assert_eq!(split_scoped("player.hp", "world"), ("player", "hp"));
        assert_eq!(split_scoped("hp", "world"), ("world", "hp"));
        assert_eq!(split_scoped("a.b.c", "world"), ("a", "b.c"));
    }

    #[test]
    fn world_is_global() {
        let mut s = store();
        assert_eq!(s.scope_key("world"), "world");
        assert_eq!(s.get("gold", "world"), Some(&Value::from("10")));
        assert_eq!(s.world().get("gold"), Some(&Value::from("10")));
    }

    #[test]
    fn world_view_of_bare_store() {
        let mut s = VariableStore::default();
        assert!(s.world().is_empty());
        s.set("gold", "world", Value::from("3"));
        assert_eq!(s.world().len(), 1);
    }

    #[test]
    fn derived_scope_copies_template() {
        let mut s = store();
        assert_eq!(s.scope_key("player"), "alice:player");
        assert_eq!(s.get("hp", "player"), Some(&Value::Integer(20)));

        s.set("hp", "player", Value::from("5"));
        assert_eq!(s.scope("player").unwrap()["hp"], Value::Integer(20));
        assert_eq!(s.scope("alice:player").unwrap()["hp"], Value::from("5"));
    }

    #[test]
    fn copy_happens_on_first_access_only() {
        let mut s = store();
        s.scopes
            .get_mut("player")
            .unwrap()
            .insert("level".to_string(), Value::Integer(1));
        assert_eq!(s.get("level", "player"), Some(&Value::Integer(1)));

        s.scopes
            .get_mut("player")
            .unwrap()
            .insert("level".to_string(), Value::Integer(2));
        assert_eq!(s.get("level", "player"), Some(&Value::Integer(1)));
    }

    #[test]
    fn owner_switch_addresses_new_scope() {
        let mut s = store();
        s.set("hp", "player", Value::from("1"));
        s.set_owner("bob");
        assert_eq!(s.scope_key("player"), "bob:player");
        assert_eq!(s.get("hp", "player"), Some(&Value::Integer(20)));
    }

    #[test]
    fn remove_variable() {
        let mut s = store();
        assert_eq!(s.remove("gold", "world"), Some(Value::from("10")));
        assert_eq!(s.get("gold", "world"), None);
        assert_eq!(s.remove("gold", "world"), None);
    }

    #[test]
    fn derived_scope_replacement() {
        let mut s = store();
        s.set("hp", "player", Value::from("3"));
        assert_eq!(s.derived_scopes().len(), 1);

        let mut restored = Scope::new();
        restored.insert("hp".to_string(), Value::from("99"));
        s.replace_derived([("alice:player".to_string(), restored)]);
        assert_eq!(s.get("hp", "player"), Some(&Value::from("99")));
        assert!(s.scope("player").is_some());
    }
}
