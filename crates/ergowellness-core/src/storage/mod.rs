mod backend;
mod config;
mod json_file;
pub mod keys;
mod memory;
mod sqlite;
mod store;

pub use backend::KvBackend;
pub use config::{AppConfig, BackendKind, DefaultsConfig, NotificationsConfig, SchedulerConfig, StorageConfig};
pub use json_file::JsonFileBackend;
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;
pub use store::{Store, DEFAULT_NAMESPACE};

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{ConfigError, StoreError};

/// Returns the data directory, creating it if needed.
///
/// `ERGOWELLNESS_DATA_DIR` wins when set. Otherwise `~/.config/ergowellness`,
/// or `~/.config/ergowellness-dev` with `ERGOWELLNESS_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("ERGOWELLNESS_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("ERGOWELLNESS_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("ergowellness-dev")
            } else {
                base_dir.join("ergowellness")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Build the backend named by the storage config, rooted at `dir`.
///
/// # Errors
/// Returns an error if the SQLite database or JSON file cannot be opened.
pub fn open_backend(config: &StorageConfig, dir: &std::path::Path) -> Result<Arc<dyn KvBackend>, StoreError> {
    let backend: Arc<dyn KvBackend> = match config.backend {
        BackendKind::Sqlite => Arc::new(SqliteBackend::open(dir.join("ergowellness.db"))?),
        BackendKind::Json => Arc::new(JsonFileBackend::open(dir.join("store.json"))?),
        BackendKind::Memory => Arc::new(MemoryBackend::new()),
    };
    tracing::debug!(backend = backend.name(), dir = %dir.display(), "opened store backend");
    Ok(backend)
}

/// Open the namespaced store described by `config`.
///
/// # Errors
/// Returns an error if the backend cannot be opened.
pub fn open_store(config: &AppConfig, dir: &std::path::Path) -> Result<Store, StoreError> {
    let backend = open_backend(&config.storage, dir)?;
    Ok(Store::with_namespace(backend, config.storage.namespace.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_store_honours_backend_kind() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();

        config.storage.backend = BackendKind::Json;
        let store = open_store(&config, dir.path()).unwrap();
        assert!(store.set(keys::THEME, serde_json::json!("dark")).await);
        assert!(dir.path().join("store.json").exists());

        config.storage.backend = BackendKind::Sqlite;
        let store = open_store(&config, dir.path()).unwrap();
        assert!(store.set(keys::THEME, serde_json::json!("dark")).await);
        assert!(dir.path().join("ergowellness.db").exists());
    }
}
