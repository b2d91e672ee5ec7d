//! SQLite-backed key-value storage.
//!
//! Values are stored as JSON text in a single `kv` table:
//!
//! ```text
//! kv(key TEXT PRIMARY KEY, value TEXT NOT NULL, updated_at TEXT NOT NULL)
//! ```

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use super::backend::{run_blocking, KvBackend};
use crate::error::StoreError;

/// SQLite database holding the namespaced kv table.
pub struct SqliteBackend {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBackend {
    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let conn = Connection::open(&path).map_err(|e| StoreError::OpenFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        conn.busy_timeout(Duration::from_secs(2))?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        migrate(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        run_blocking(move || {
            let conn = conn.lock().map_err(|_| StoreError::Poisoned)?;
            op(&conn)
        })
        .await
    }
}

fn migrate(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv (
            key        TEXT PRIMARY KEY,
            value      TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );",
    )?;
    Ok(())
}

#[async_trait]
impl KvBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn get_raw(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            let text: Option<String> = conn
                .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
                .optional()?;
            match text {
                Some(text) => serde_json::from_str(&text).map(Some).map_err(|e| StoreError::Encoding {
                    key,
                    message: e.to_string(),
                }),
                None => Ok(None),
            }
        })
        .await
    }

    async fn set_raw(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let key = key.to_string();
        let text = serde_json::to_string(value).map_err(|e| StoreError::Encoding {
            key: key.clone(),
            message: e.to_string(),
        })?;
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
                params![key, text, chrono::Utc::now().to_rfc3339()],
            )?;
            Ok(())
        })
        .await
    }

    async fn delete_raw(&self, key: &str) -> Result<(), StoreError> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
            Ok(())
        })
        .await
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            let mut keys = Vec::new();
            for row in rows {
                keys.push(row?);
            }
            Ok(keys)
        })
        .await
    }

    async fn delete_many(&self, keys: &[String]) -> Result<(), StoreError> {
        let keys = keys.to_vec();
        self.with_conn(move |conn| {
            let tx = conn.unchecked_transaction()?;
            for key in &keys {
                tx.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }
}
