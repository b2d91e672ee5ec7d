//! Raw storage capability implemented by each backend.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

/// Fallible key-value operations over full (already namespaced) keys.
///
/// Backends report every failure; [`super::Store`] decides how to degrade.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    async fn get_raw(&self, key: &str) -> Result<Option<Value>, StoreError>;

    async fn set_raw(&self, key: &str, value: &Value) -> Result<(), StoreError>;

    async fn delete_raw(&self, key: &str) -> Result<(), StoreError>;

    /// Every key held by the backend, including keys outside any namespace.
    async fn keys(&self) -> Result<Vec<String>, StoreError>;

    async fn delete_many(&self, keys: &[String]) -> Result<(), StoreError> {
        for key in keys {
            self.delete_raw(key).await?;
        }
        Ok(())
    }
}

/// Run a synchronous backend operation on the blocking pool.
pub(crate) async fn run_blocking<T, F>(op: F) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("blocking task failed: {e}")))?
}
