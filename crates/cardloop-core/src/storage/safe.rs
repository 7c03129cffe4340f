//! Never-failing, namespaced storage facade.

use super::backend::KeyValueStore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

/// JSON storage over a [`KeyValueStore`] that never returns an error.
///
/// Reads that fail (backend error, missing key, corrupt JSON) yield the
/// caller's fallback; writes that fail are logged and reported as `false`.
/// In-memory state is never touched here, so the next successful write is
/// what brings the backend back in sync.
///
/// A `Storage` carries a namespace; [`Storage::scoped`] derives a child whose
/// keys are prefixed `"<namespace>:"`, so two activities can share one
/// backend without seeing each other's records.
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn KeyValueStore>,
    namespace: String,
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("backend", &"<dyn KeyValueStore>")
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl Storage {
    /// Creates a root (un-namespaced) storage.
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            namespace: String::new(),
        }
    }

    /// Returns a storage whose keys live under `namespace`.
    ///
    /// Nested scopes join with `':'`: `root.scoped("a").scoped("b")` writes `a:b:<key>`.
    pub fn scoped(&self, namespace: &str) -> Self {
        let namespace = if self.namespace.is_empty() {
            namespace.to_string()
        } else {
            format!("{}:{}", self.namespace, namespace)
        };
        Self {
            backend: self.backend.clone(),
            namespace,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The backend key for a record key.
    pub fn full_key(&self, key: &str) -> String {
        if self.namespace.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.namespace, key)
        }
    }

    /// Reads and decodes a value, or `None` if absent or unreadable.
    pub fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let full_key = self.full_key(key);
        let raw = match self.backend.read(&full_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %full_key, error = %e, "storage read failed; using fallback");
                return None;
            }
        };

        if raw.trim().is_empty() {
            return None;
        }

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %full_key, error = %e, "corrupt stored value; using fallback");
                None
            }
        }
    }

    /// Reads and decodes a value, falling back on any failure.
    pub fn get<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        self.get_opt(key).unwrap_or(fallback)
    }

    /// Encodes and writes a value. Returns whether it reached the backend.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let full_key = self.full_key(key);
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key = %full_key, error = %e, "failed to encode value; write skipped");
                return false;
            }
        };

        match self.backend.write(&full_key, &raw) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = %full_key, error = %e, "storage write failed");
                false
            }
        }
    }

    /// Removes a value. Returns whether the backend accepted the removal.
    pub fn remove(&self, key: &str) -> bool {
        let full_key = self.full_key(key);
        match self.backend.remove(&full_key) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = %full_key, error = %e, "storage remove failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CardloopError, Result};
    use crate::storage::MemoryStore;
    use serde::Deserialize;

    /// Backend whose every call fails.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn read(&self, _key: &str) -> Result<Option<String>> {
            Err(CardloopError::io("disk gone"))
        }
        fn write(&self, _key: &str, _value: &str) -> Result<()> {
            Err(CardloopError::io("disk gone"))
        }
        fn remove(&self, _key: &str) -> Result<()> {
            Err(CardloopError::io("disk gone"))
        }
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        used: u32,
    }

    #[test]
    fn test_round_trip_through_namespace() {
        let backend = Arc::new(MemoryStore::new());
        let storage = Storage::new(backend.clone()).scoped("task");

        assert!(storage.set("record", &Record { used: 2 }));
        assert!(backend.contains("task:record"));
        assert_eq!(storage.get_opt::<Record>("record"), Some(Record { used: 2 }));
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let root = Storage::new(Arc::new(MemoryStore::new()));
        let task = root.scoped("task");
        let bait = root.scoped("bait");

        task.set("exit_debt_v1", &3u32);
        assert_eq!(bait.get("exit_debt_v1", 0u32), 0);
        assert_eq!(task.get("exit_debt_v1", 0u32), 3);
    }

    #[test]
    fn test_nested_scope_key() {
        let storage = Storage::new(Arc::new(MemoryStore::new()))
            .scoped("a")
            .scoped("b");
        assert_eq!(storage.full_key("k"), "a:b:k");
    }

    #[test]
    fn test_corrupt_value_falls_back() {
        let backend = Arc::new(MemoryStore::new());
        backend.write("stats", "{not json").unwrap();
        let storage = Storage::new(backend);
        assert_eq!(storage.get("stats", 7u32), 7);
    }

    #[test]
    fn test_broken_backend_never_fails() {
        let storage = Storage::new(Arc::new(BrokenStore)).scoped("task");
        assert_eq!(storage.get("anything", 5u32), 5);
        assert!(storage.get_opt::<Record>("anything").is_none());
        assert!(!storage.set("anything", &1u32));
        assert!(!storage.remove("anything"));
    }
}
