//! Key-value persistence.
//!
//! The engine only needs get/set-by-key with string values; absence means
//! "no record". Hosts inject a store; the crate ships an in-memory store and
//! a JSON file store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::core::ConfigError;

/// String key-value storage.
pub trait KeyValueStore {
    /// Read a value. `None` if the key was never set.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value.
    fn set(&mut self, key: &str, value: &str);

    /// Delete a value.
    fn remove(&mut self, key: &str);
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &mut T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) {
        (**self).set(key, value);
    }

    fn remove(&mut self, key: &str) {
        (**self).remove(key);
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) {
        (**self).set(key, value);
    }

    fn remove(&mut self, key: &str) {
        (**self).remove(key);
    }
}

/// Volatile store, for tests and hosts without persistence.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: FxHashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// Store persisted as a flat JSON object of strings.
///
/// Every write is flushed to disk. Write failures are logged and leave the
/// in-memory value in place; call [`flush`](Self::flush) to observe them.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open a store backed by `path`.
    ///
    /// A missing file is an empty store. A file that is not a JSON object of
    /// strings is treated as empty and overwritten on the next write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                log::warn!("ignoring unreadable store {}: {}", path.display(), err);
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, values })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current contents to disk.
    pub fn flush(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    fn flush_logged(&self) {
        if let Err(err) = self.flush() {
            log::warn!("failed to persist {}: {}", self.path.display(), err);
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        self.flush_logged();
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.flush_logged();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Per-test scratch directory, removed on drop.
    struct ScratchDir(PathBuf);

    impl ScratchDir {
        fn new(name: &str) -> Self {
            let dir = std::env::temp_dir()
                .join(format!("memory-match-{}-{}", name, std::process::id()));
            let _ = std::fs::remove_dir_all(&dir);
            Self(dir)
        }

        fn file(&self) -> PathBuf {
            self.0.join("store.json")
        }
    }

    impl Drop for ScratchDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k"), None);

        store.set("k", "v");
        assert_eq!(store.get("k").as_deref(), Some("v"));

        store.remove("k");
        assert!(store.is_empty());
    }

    #[test]
    fn test_mut_ref_store() {
        fn write<S: KeyValueStore>(mut store: S) {
            store.set("a", "1");
        }

        let mut store = MemoryStore::new();
        write(&mut store);
        assert_eq!(store.get("a").as_deref(), Some("1"));
    }

    #[test]
    fn test_json_file_store_persists() {
        let scratch = ScratchDir::new("persist");
        let path = scratch.file();

        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("bestMoves_easy"), None);
        store.set("bestMoves_easy", "10");

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("bestMoves_easy").as_deref(), Some("10"));
    }

    #[test]
    fn test_json_file_store_ignores_garbage() {
        let scratch = ScratchDir::new("garbage");
        let path = scratch.file();
        std::fs::create_dir_all(&scratch.0).unwrap();
        std::fs::write(&path, "not json at all").unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("anything"), None);
    }

    #[test]
    fn test_scratch_dir_is_removed() {
        let scratch = ScratchDir::new("cleanup");
        let dir = scratch.0.clone();
        let mut store = JsonFileStore::open(scratch.file()).unwrap();
        store.set("memory_muted", "true");
        assert!(dir.exists());

        drop(store);
        drop(scratch);
        assert!(!dir.exists());
    }
}
