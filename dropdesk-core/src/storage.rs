//! Durable key-value storage.
//!
//! The same shape as a browser's local storage: string keys, string values,
//! whole-value overwrite on every write.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{DeskError, Result};

/// String key-value slots that survive the component
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store. Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Arc<Mutex<BTreeMap<String, String>>>,
    writes: Arc<Mutex<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a slot without counting it as a write
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .slots
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(key.to_string(), value.to_string());
        store
    }

    /// Raw slot content
    pub fn peek(&self, key: &str) -> Option<String> {
        self.slots
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(key)
            .cloned()
    }

    /// Number of `set` calls so far
    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.peek(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.slots
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(key.to_string(), value.to_string());
        *self.writes.lock().unwrap_or_else(|p| p.into_inner()) += 1;
        Ok(())
    }
}

/// Key-value slots kept in a single JSON object file.
///
/// The file is read once on open and rewritten whole (temp file + rename)
/// on every `set`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    slots: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable or non-object file is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let slots: BTreeMap<String, String> = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)
                    .map_err(|e| DeskError::json(path.display().to_string(), e))?
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), keys = slots.len(), "Opened storage file");
        Ok(Self { path, slots })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, slots: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let body = serde_json::to_string_pretty(slots)
            .map_err(|e| DeskError::json("storage file", e))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, body)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut next = self.slots.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next)
            .map_err(|e| DeskError::storage(key, e.to_string()))?;
        self.slots = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_counts_writes_and_shares_slots() {
        let mut store = MemoryStore::new();
        let view = store.clone();

        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();

        assert_eq!(view.peek("k").as_deref(), Some("v2"));
        assert_eq!(view.writes(), 2);
    }

    #[test]
    fn json_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("tasks").unwrap(), None);
        store.set("tasks", "[]").unwrap();
        store.set("other", "x").unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("tasks").unwrap().as_deref(), Some("[]"));
        assert_eq!(reopened.get("other").unwrap().as_deref(), Some("x"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn json_file_store_rejects_non_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(matches!(err, DeskError::Json { .. }));
    }

    #[test]
    fn json_file_store_empty_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "").unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("tasks").unwrap(), None);
    }

    #[test]
    fn json_file_store_failed_write_keeps_old_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set("tasks", "[]").unwrap();

        // A directory in the temp file's place makes the next write fail
        std::fs::create_dir(path.with_extension("json.tmp")).unwrap();

        let err = store.set("tasks", "[1]").unwrap_err();
        assert!(matches!(err, DeskError::Storage { .. }));
        assert_eq!(store.get("tasks").unwrap().as_deref(), Some("[]"));
        assert_eq!(
            JsonFileStore::open(&path).unwrap().get("tasks").unwrap().as_deref(),
            Some("[]")
        );
    }
}
