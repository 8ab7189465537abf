//! Session store.
//!
//! A [`SessionStore`] maps a [`SessionKey`] to a [`Session`], an attribute bag
//! shared between every event of the same sender in the same conversation.
//!
//! - [`get`](SessionStore::get) creates an empty bag on first access and
//!   returns the same instance afterwards.
//! - [`clear`](SessionStore::clear) forgets the bag; the next `get` starts
//!   from scratch.
//!
//! Nothing expires and nothing is persisted. The store is created once by the
//! runtime and handed to the dispatcher; clones share the same map.
//!
//! Each bag has its own lock. Handlers that read and then write a session
//! must do so inside a single [`Session::update`] call.

use std::collections::HashMap;
use std::sync::Arc;

use brass_core::SessionKey;
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute holding the conversation mode flag.
pub const MODE: &str = "mode";
/// Attribute holding the free-text note.
pub const NOTE: &str = "note";
/// Attribute holding the last update time (Unix seconds).
pub const UPDATED_AT: &str = "updated_at";
/// Attribute holding the todo list.
pub const TODOS: &str = "todos";

// =============================================================================
// Attributes
// =============================================================================

/// Open-ended attribute bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(Map<String, Value>);

impl Attributes {
    /// Returns `true` if no attribute is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of attributes set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a raw attribute.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns an attribute deserialized into `T`, or `None` when absent or of
    /// another shape.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.0
            .get(name)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Sets an attribute, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Removes an attribute.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    /// Iterates over attribute names and values.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// The conversation mode flag.
    pub fn mode(&self) -> Option<&str> {
        self.0.get(MODE).and_then(Value::as_str)
    }

    /// Sets the conversation mode flag.
    pub fn set_mode(&mut self, mode: impl Into<String>) {
        self.0.insert(MODE.to_string(), Value::String(mode.into()));
    }

    /// The free-text note.
    pub fn note(&self) -> Option<&str> {
        self.0.get(NOTE).and_then(Value::as_str)
    }

    /// Sets the free-text note.
    pub fn set_note(&mut self, note: impl Into<String>) {
        self.0.insert(NOTE.to_string(), Value::String(note.into()));
    }

    /// Last update time in Unix seconds.
    pub fn updated_at(&self) -> Option<i64> {
        self.0.get(UPDATED_AT).and_then(Value::as_i64)
    }

    /// Records an update time in Unix seconds.
    pub fn touch(&mut self, unix_secs: i64) {
        self.0.insert(UPDATED_AT.to_string(), Value::from(unix_secs));
    }

    /// The todo list; empty when unset or not a list of strings.
    pub fn todos(&self) -> Vec<String> {
        self.get_as(TODOS).unwrap_or_default()
    }

    /// Appends to the todo list and returns its new length.
    pub fn push_todo(&mut self, item: impl Into<String>) -> usize {
        let mut todos = self.todos();
        todos.push(item.into());
        let len = todos.len();
        self.0.insert(TODOS.to_string(), Value::from(todos));
        len
    }
}

// =============================================================================
// Session
// =============================================================================

/// Shared handle to one session's attribute bag.
#[derive(Debug, Clone, Default)]
pub struct Session {
    attributes: Arc<Mutex<Attributes>>,
}

impl Session {
    fn new() -> Self {
        Self::default()
    }

    /// Reads the bag under its lock.
    pub fn read<R>(&self, f: impl FnOnce(&Attributes) -> R) -> R {
        f(&self.attributes.lock())
    }

    /// Mutates the bag under its lock. The whole closure is atomic with
    /// respect to other users of the same session.
    pub fn update<R>(&self, f: impl FnOnce(&mut Attributes) -> R) -> R {
        f(&mut self.attributes.lock())
    }

    /// Returns a copy of the current attributes.
    pub fn snapshot(&self) -> Attributes {
        self.attributes.lock().clone()
    }

    /// Returns `true` if both handles refer to the same bag.
    pub fn ptr_eq(&self, other: &Session) -> bool {
        Arc::ptr_eq(&self.attributes, &other.attributes)
    }
}

// =============================================================================
// SessionStore
// =============================================================================

/// Process-wide session map. Cloning is cheap and shares the map.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionKey, Session>>>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session for `key`, creating an empty one on first access.
    pub fn get(&self, key: &SessionKey) -> Session {
        if let Some(session) = self.sessions.read().get(key) {
            return session.clone();
        }
        self.sessions
            .write()
            .entry(key.clone())
            .or_insert_with(Session::new)
            .clone()
    }

    /// Returns the session for `key` without creating it.
    pub fn peek(&self, key: &SessionKey) -> Option<Session> {
        self.sessions.read().get(key).cloned()
    }

    /// Removes the session for `key`. Returns whether one existed.
    pub fn clear(&self, key: &SessionKey) -> bool {
        self.sessions.write().remove(key).is_some()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Returns `true` if no session exists.
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brass_core::Source;

    fn key(user: &str, group: &str) -> SessionKey {
        SessionKey::derive(&Source::Group {
            group_id: group.into(),
            user_id: Some(user.into()),
        })
    }

    #[test]
    fn test_get_creates_empty_bag() {
        let store = SessionStore::new();
        let session = store.get(&key("U1", "G1"));
        assert!(session.snapshot().is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_returns_same_instance() {
        let store = SessionStore::new();
        let k = key("U1", "G1");
        let first = store.get(&k);
        first.update(|a| a.set_mode("stock"));

        let second = store.get(&k);
        assert!(first.ptr_eq(&second));
        assert_eq!(second.read(|a| a.mode().map(str::to_owned)), Some("stock".into()));
    }

    #[test]
    fn test_clear_then_get_is_fresh() {
        let store = SessionStore::new();
        let k = key("U1", "G1");
        let before = store.get(&k);
        before.update(|a| {
            a.set_note("remember the milk");
            a.touch(1_700_000_000);
        });

        assert!(store.clear(&k));
        let after = store.get(&k);
        assert!(!before.ptr_eq(&after));
        assert!(after.snapshot().is_empty());
        // The old handle keeps its own data.
        assert_eq!(before.read(|a| a.updated_at()), Some(1_700_000_000));
    }

    #[test]
    fn test_clear_absent_is_noop() {
        let store = SessionStore::new();
        assert!(!store.clear(&key("U1", "G1")));
        assert!(store.is_empty());
    }

    #[test]
    fn test_peek_does_not_create() {
        let store = SessionStore::new();
        assert!(store.peek(&key("U1", "G1")).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_keys_are_isolated() {
        let store = SessionStore::new();
        store.get(&key("U1", "G1")).update(|a| a.set_mode("weather"));
        let other = store.get(&key("U2", "G1"));
        assert_eq!(other.read(|a| a.mode().map(str::to_owned)), None);
    }

    #[test]
    fn test_clones_share_the_map() {
        let store = SessionStore::new();
        let clone = store.clone();
        let k = key("U1", "G1");
        assert!(store.get(&k).ptr_eq(&clone.get(&k)));
    }

    #[test]
    fn test_typed_attribute_roundtrip() {
        let mut attrs = Attributes::default();
        attrs.set("todos", serde_json::json!(["買咖啡", "繳電費"]));
        let todos: Vec<String> = attrs.get_as("todos").unwrap();
        assert_eq!(todos, vec!["買咖啡", "繳電費"]);
        assert!(attrs.get_as::<i64>("todos").is_none());
    }

    #[test]
    fn test_push_todo() {
        let mut attrs = Attributes::default();
        assert!(attrs.todos().is_empty());
        assert_eq!(attrs.push_todo("買咖啡"), 1);
        assert_eq!(attrs.push_todo("繳電費"), 2);
        assert_eq!(attrs.todos(), vec!["買咖啡", "繳電費"]);
    }

    #[test]
    fn test_concurrent_updates_are_serialized() {
        let store = SessionStore::new();
        let k = key("U1", "G1");
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let k = k.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        store.get(&k).update(|a| {
                            let n = a.get("count").and_then(Value::as_i64).unwrap_or(0);
                            a.set("count", n + 1);
                        });
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let count = store.get(&k).read(|a| a.get("count").and_then(Value::as_i64));
        assert_eq!(count, Some(800));
    }
}
