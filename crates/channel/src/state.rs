//! Durable key-value storage for resumable session state.

use async_trait::async_trait;
use learnpulse_core::SessionState;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

/// Error type for state-store operations.
#[derive(Debug, thiserror::Error)]
pub enum StateStoreError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key for one `(learner, unit)` state slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
    /// Learner identifier
    pub learner: String,

    /// Learning-unit identifier
    pub unit: String,
}

impl StateKey {
    /// Create a key.
    pub fn new(learner: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            learner: learner.into(),
            unit: unit.into(),
        }
    }

    /// Filesystem-safe form of the key.
    fn slug(&self) -> String {
        let sanitize = |s: &str| {
            s.chars()
                .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
                .collect::<String>()
        };
        format!("{}__{}", sanitize(&self.learner), sanitize(&self.unit))
    }
}

impl std::fmt::Display for StateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.learner, self.unit)
    }
}

/// Durable key-value storage for session state.
///
/// Last write wins; concurrent writers do not corrupt each other beyond that.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Save state for a key (create or replace).
    async fn save(&self, key: &StateKey, state: &SessionState) -> Result<(), StateStoreError>;

    /// Load state for a key, `None` if nothing was saved.
    async fn load(&self, key: &StateKey) -> Result<Option<SessionState>, StateStoreError>;

    /// Remove state for a key. Removing a missing key is not an error.
    async fn delete(&self, key: &StateKey) -> Result<(), StateStoreError>;
}

/// File-based JSON state store, one file per key.
pub struct JsonStateStore {
    root: PathBuf,
}

impl JsonStateStore {
    /// Create the store, ensuring its directory exists.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self, StateStoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &StateKey) -> PathBuf {
        self.root.join(format!("{}.json", key.slug()))
    }
}

#[async_trait]
impl StateStore for JsonStateStore {
    async fn save(&self, key: &StateKey, state: &SessionState) -> Result<(), StateStoreError> {
        let json = serde_json::to_string_pretty(state)?;
        fs::write(self.path_for(key), json.as_bytes()).await?;
        Ok(())
    }

    async fn load(&self, key: &StateKey) -> Result<Option<SessionState>, StateStoreError> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &StateKey) -> Result<(), StateStoreError> {
        fs::remove_file(self.path_for(key)).await.or_else(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Ok(())
            } else {
                Err(e)
            }
        })?;
        Ok(())
    }
}

/// In-memory state store for tests and ephemeral hosts.
#[derive(Default)]
pub struct MemoryStateStore {
    slots: Mutex<HashMap<StateKey, SessionState>>,
}

impl MemoryStateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn save(&self, key: &StateKey, state: &SessionState) -> Result<(), StateStoreError> {
        self.slots.lock().await.insert(key.clone(), state.clone());
        Ok(())
    }

    async fn load(&self, key: &StateKey) -> Result<Option<SessionState>, StateStoreError> {
        Ok(self.slots.lock().await.get(key).cloned())
    }

    async fn delete(&self, key: &StateKey) -> Result<(), StateStoreError> {
        self.slots.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_round_trip_preserves_state() {
        let store = MemoryStateStore::new();
        let key = StateKey::new("learner-1", "unit-1");

        let mut state = SessionState::new();
        state.visit(4);
        state.complete("intro");

        store.save(&key, &state).await.unwrap();
        let loaded = store.load(&key).await.unwrap().unwrap();
        assert_eq!(loaded, state);
    }

    #[tokio::test]
    async fn json_round_trip_preserves_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStateStore::new(dir.path()).await.unwrap();
        let key = StateKey::new("learner-1", "unit/one");

        let mut state = SessionState::new();
        state.visit(2);
        state.complete("a");
        state.complete("b");

        store.save(&key, &state).await.unwrap();
        let loaded = store.load(&key).await.unwrap().unwrap();
        assert_eq!(loaded, state);
    }

    #[tokio::test]
    async fn missing_key_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStateStore::new(dir.path()).await.unwrap();
        let loaded = store.load(&StateKey::new("nobody", "nothing")).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn save_replaces_previous_state() {
        let store = MemoryStateStore::new();
        let key = StateKey::new("learner-1", "unit-1");

        let mut first = SessionState::new();
        first.visit(1);
        store.save(&key, &first).await.unwrap();

        let mut second = SessionState::new();
        second.visit(9);
        store.save(&key, &second).await.unwrap();

        let loaded = store.load(&key).await.unwrap().unwrap();
        assert_eq!(loaded.position, 9);
    }

    #[tokio::test]
    async fn delete_missing_key_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStateStore::new(dir.path()).await.unwrap();
        store.delete(&StateKey::new("nobody", "nothing")).await.unwrap();
    }
}
