//! Single-file JSON storage.
//!
//! The whole store is one JSON object on disk. Every write rewrites the file
//! through a sibling temp file and a rename, so a crash never leaves a
//! half-written document behind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use super::backend::{run_blocking, KvBackend};
use crate::error::StoreError;

struct FileState {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl FileState {
    fn flush(&self) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(&self.entries).map_err(|e| StoreError::Encoding {
            key: "*".into(),
            message: e.to_string(),
        })?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Remove `keys` and flush, putting them back if the flush fails.
    fn remove_and_flush(&mut self, keys: &[String]) -> Result<(), StoreError> {
        let removed: Vec<(String, Value)> = keys
            .iter()
            .filter_map(|key| self.entries.remove_entry(key))
            .collect();
        if removed.is_empty() {
            return Ok(());
        }
        if let Err(e) = self.flush() {
            self.entries.extend(removed);
            return Err(e);
        }
        Ok(())
    }
}

/// JSON document store, one file per data directory.
pub struct JsonFileBackend {
    state: Arc<Mutex<FileState>>,
}

impl JsonFileBackend {
    /// Open the file at `path`, starting empty when it does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but is not a JSON object.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = load_entries(&path)?;
        Ok(Self {
            state: Arc::new(Mutex::new(FileState { path, entries })),
        })
    }

    async fn with_state<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut FileState) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let state = Arc::clone(&self.state);
        run_blocking(move || {
            let mut state = state.lock().map_err(|_| StoreError::Poisoned)?;
            op(&mut state)
        })
        .await
    }
}

fn load_entries(path: &Path) -> Result<BTreeMap<String, Value>, StoreError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(e.into()),
    };
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(&content).map_err(|e| StoreError::OpenFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[async_trait]
impl KvBackend for JsonFileBackend {
    fn name(&self) -> &'static str {
        "json"
    }

    async fn get_raw(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let key = key.to_string();
        self.with_state(move |state| Ok(state.entries.get(&key).cloned())).await
    }

    async fn set_raw(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let key = key.to_string();
        let value = value.clone();
        self.with_state(move |state| {
            let previous = state.entries.insert(key.clone(), value);
            if let Err(e) = state.flush() {
                // Keep memory in step with disk.
                match previous {
                    Some(old) => state.entries.insert(key, old),
                    None => state.entries.remove(&key),
                };
                return Err(e);
            }
            Ok(())
        })
        .await
    }

    async fn delete_raw(&self, key: &str) -> Result<(), StoreError> {
        let keys = vec![key.to_string()];
        self.with_state(move |state| state.remove_and_flush(&keys)).await
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.with_state(|state| Ok(state.entries.keys().cloned().collect())).await
    }

    async fn delete_many(&self, keys: &[String]) -> Result<(), StoreError> {
        let keys = keys.to_vec();
        self.with_state(move |state| state.remove_and_flush(&keys)).await
    }
}
