//! Namespaced, never-failing key-value store.
//!
//! [`Store`] is the only storage surface the rest of the crate sees. It
//! prefixes every key with its namespace, and it turns every backend failure
//! into a logged default: reads resolve to the caller's default, writes
//! report `false`. A backend that stalls is cut off after the operation
//! timeout so a tick never hangs on I/O.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::backend::KvBackend;
use super::memory::MemoryBackend;
use crate::error::StoreError;

/// Prefix applied to every key, matching the mobile build's AsyncStorage prefix.
pub const DEFAULT_NAMESPACE: &str = "@ErgoWellness:";

const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(5);

/// Cheap-to-clone handle over a shared backend.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn KvBackend>,
    namespace: Arc<str>,
    op_timeout: Duration,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("backend", &self.backend.name())
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl Store {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self::with_namespace(backend, DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(backend: Arc<dyn KvBackend>, namespace: impl Into<String>) -> Self {
        Self {
            backend,
            namespace: Arc::from(namespace.into()),
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }

    /// Fresh store over a [`MemoryBackend`].
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    pub fn with_op_timeout(mut self, timeout: Duration) -> Self {
        self.op_timeout = timeout;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }

    async fn checked<T>(
        &self,
        op: &'static str,
        key: &str,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::warn!(op, key, backend = self.backend.name(), error = %e, "store operation failed");
                Err(e)
            }
            Err(_) => {
                let ms = self.op_timeout.as_millis() as u64;
                tracing::warn!(op, key, backend = self.backend.name(), timeout_ms = ms, "store operation timed out");
                Err(StoreError::TimedOut { op, ms })
            }
        }
    }

    async fn guarded<T>(
        &self,
        op: &'static str,
        key: &str,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Option<T> {
        self.checked(op, key, fut).await.ok()
    }

    /// Raw read that reports backend failures instead of masking them.
    ///
    /// Callers that rewrite a stored value from what they read use this, so
    /// an unreadable value is never replaced by a default. `Ok(None)` means
    /// the key is absent or holds `null`.
    ///
    /// # Errors
    /// Returns the backend error, or [`StoreError::TimedOut`].
    pub async fn try_get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let full = self.full_key(key);
        let value = self.checked("get", key, self.backend.get_raw(&full)).await?;
        Ok(value.filter(|v| !v.is_null()))
    }

    /// Write that reports backend failures.
    ///
    /// # Errors
    /// Returns the backend error, or [`StoreError::TimedOut`].
    pub async fn try_set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let full = self.full_key(key);
        self.checked("set", key, self.backend.set_raw(&full, value)).await
    }

    /// Value for `key`, or `default` when absent or unreadable.
    pub async fn get(&self, key: &str, default: Value) -> Value {
        let full = self.full_key(key);
        match self.guarded("get", key, self.backend.get_raw(&full)).await {
            Some(Some(value)) if !value.is_null() => value,
            _ => default,
        }
    }

    /// Typed read. A stored value that does not fit `T` also yields `default`.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get_opt(key).await.unwrap_or(default)
    }

    /// Typed read distinguishing "absent or unreadable" as `None`.
    pub async fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key, Value::Null).await;
        if value.is_null() {
            return None;
        }
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                tracing::warn!(key, error = %e, "stored value has unexpected shape");
                None
            }
        }
    }

    /// Store `value` under `key`. Returns whether the write landed.
    pub async fn set(&self, key: &str, value: Value) -> bool {
        let full = self.full_key(key);
        self.guarded("set", key, self.backend.set_raw(&full, &value))
            .await
            .is_some()
    }

    pub async fn set_as<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        match serde_json::to_value(value) {
            Ok(value) => self.set(key, value).await,
            Err(e) => {
                tracing::warn!(key, error = %e, "value could not be serialized");
                false
            }
        }
    }

    pub async fn delete(&self, key: &str) -> bool {
        let full = self.full_key(key);
        self.guarded("delete", key, self.backend.delete_raw(&full))
            .await
            .is_some()
    }

    async fn namespaced_keys(&self) -> Option<Vec<String>> {
        let keys = self.guarded("keys", "*", self.backend.keys()).await?;
        Some(
            keys.into_iter()
                .filter(|k| k.starts_with(&*self.namespace))
                .collect(),
        )
    }

    /// Every key in this namespace (prefix stripped) mapped to its value.
    pub async fn get_all(&self) -> BTreeMap<String, Value> {
        let mut all = BTreeMap::new();
        let Some(keys) = self.namespaced_keys().await else {
            return all;
        };
        for full in keys {
            let short = &full[self.namespace.len()..];
            if let Some(Some(value)) = self.guarded("get", short, self.backend.get_raw(&full)).await {
                all.insert(short.to_string(), value);
            }
        }
        all
    }

    /// Remove every key in this namespace, leaving other data untouched.
    pub async fn clear(&self) -> bool {
        let Some(keys) = self.namespaced_keys().await else {
            return false;
        };
        if keys.is_empty() {
            return true;
        }
        let removed = self
            .guarded("clear", "*", self.backend.delete_many(&keys))
            .await
            .is_some();
        if removed {
            tracing::info!(namespace = %self.namespace, count = keys.len(), "cleared store");
        }
        removed
    }
}
