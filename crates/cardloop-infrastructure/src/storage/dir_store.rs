//! Directory-backed key/value store.

use super::atomic_file::AtomicFile;
use cardloop_core::KeyValueStore;
use cardloop_core::error::Result;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Keeps each key in its own file under a root directory.
///
/// # Directory Structure
///
/// ```text
/// <root>/
/// ├── wallet%3Areward_tokens_v1.json
/// ├── task%3Aactive_session_v1.json
/// ├── task%3Areroll_run_v1.json
/// └── bait%3Astats_v1.json
/// ```
///
/// Keys are percent-encoded into file names, so distinct keys never share a
/// file. Writes go through [`AtomicFile`]: a crash leaves either the old or
/// the new value, never a torn one.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Opens a store rooted at `root`, creating the directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        tracing::debug!(root = %root.display(), "Opened directory store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", encode_key(key)))
    }

    fn file(&self, key: &str) -> AtomicFile {
        AtomicFile::new(self.path_for(key))
    }
}

impl KeyValueStore for DirStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.file(key).load()
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.file(key).save(value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.file(key).remove()
    }
}

fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            encoded.push(byte as char);
        } else {
            let _ = write!(encoded, "%{:02X}", byte);
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardloop_core::Storage;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_encode_key() {
        assert_eq!(encode_key("task:stats_v1"), "task%3Astats_v1");
        assert_eq!(encode_key("a/b"), "a%2Fb");
        assert_eq!(encode_key("..secret"), "%2E%2Esecret");
        assert_ne!(encode_key("a:b"), encode_key("a_b"));
    }

    #[test]
    fn test_read_write_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = DirStore::open(temp_dir.path().join("store")).unwrap();

        assert!(store.read("task:run").unwrap().is_none());

        store.write("task:run", r#"{"used":1}"#).unwrap();
        assert_eq!(store.read("task:run").unwrap().as_deref(), Some(r#"{"used":1}"#));
        assert!(store.path_for("task:run").exists());

        store.remove("task:run").unwrap();
        assert!(store.read("task:run").unwrap().is_none());
        store.remove("task:run").unwrap();
    }

    #[test]
    fn test_values_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();

        let storage = Storage::new(Arc::new(DirStore::open(&root).unwrap())).scoped("wallet");
        assert!(storage.set("reward_tokens_v1", &7u32));
        drop(storage);

        let reopened = Storage::new(Arc::new(DirStore::open(&root).unwrap())).scoped("wallet");
        assert_eq!(reopened.get("reward_tokens_v1", 0u32), 7);
    }

    #[test]
    fn test_corrupt_file_reads_as_fallback() {
        let temp_dir = TempDir::new().unwrap();
        let store = DirStore::open(temp_dir.path()).unwrap();
        std::fs::write(store.path_for("task:exit_debt_v1"), "not json").unwrap();

        let storage = Storage::new(Arc::new(store)).scoped("task");
        assert_eq!(storage.get("exit_debt_v1", 0u32), 0);
    }
}
