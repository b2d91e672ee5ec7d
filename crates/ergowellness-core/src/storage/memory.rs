//! In-memory storage for tests and throwaway runs.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::backend::KvBackend;
use crate::error::StoreError;

#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<BTreeMap<String, Value>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Value>>, StoreError> {
        self.entries.lock().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get_raw(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries()?.get(key).cloned())
    }

    async fn set_raw(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        self.entries()?.insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn delete_raw(&self, key: &str) -> Result<(), StoreError> {
        self.entries()?.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries()?.keys().cloned().collect())
    }
}
