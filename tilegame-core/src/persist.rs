//! Snapshot persistence through a key-value store.

use std::collections::HashMap;

use crate::error::{PersistError, StoreError};
use crate::grid::Snapshot;

/// Key the game state is saved under.
pub const STATE_KEY: &str = "gameState";

/// String key-value storage backing the [`PersistenceAdapter`].
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-process store. Can be switched offline to simulate an unreachable
/// backend: every call then fails.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    offline: bool,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline {
            Err(StoreError::new("memory store is offline"))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check_online()?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_online()?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.check_online()?;
        self.entries.remove(key);
        Ok(())
    }
}

/// Saves and loads [`Snapshot`]s as JSON under a single key.
///
/// Performs no validation beyond deserialization; shape checks happen in
/// [`crate::GridState::restore`].
#[derive(Debug)]
pub struct PersistenceAdapter<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> PersistenceAdapter<S> {
    /// Adapter writing under [`STATE_KEY`].
    pub fn new(store: S) -> PersistenceAdapter<S> {
        PersistenceAdapter::with_key(store, STATE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> PersistenceAdapter<S> {
        PersistenceAdapter {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn save(&mut self, snapshot: &Snapshot) -> Result<(), PersistError> {
        let json = serde_json::to_string(snapshot)?;
        self.store.set(&self.key, &json)?;
        Ok(())
    }

    /// Load the saved snapshot. `Ok(None)` when nothing is stored.
    pub fn load(&self) -> Result<Option<Snapshot>, PersistError> {
        match self.store.get(&self.key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Whether an entry exists, treating an unreachable store as empty.
    pub fn has_saved(&self) -> bool {
        matches!(self.store.get(&self.key), Ok(Some(_)))
    }

    pub fn clear(&mut self) -> Result<(), PersistError> {
        self.store.remove(&self.key)?;
        Ok(())
    }
}
