use std::collections::HashMap;
use std::str::FromStr;

use airing_core::{KeyValueStore, WatchError, WatchResult};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tokio::sync::RwLock;

fn storage_err(e: impl std::fmt::Display) -> WatchError {
    WatchError::Storage(e.to_string())
}

/// SQLite-backed key-value store. Values are stored as JSON text.
#[derive(Clone)]
pub struct SqliteKvStore {
    pool: SqlitePool,
}

impl SqliteKvStore {
    /// Open (creating if missing) the database and ensure the table exists.
    pub async fn connect(database_url: &str) -> WatchResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(storage_err)?
            .create_if_missing(true);

        // In-memory databases are per-connection
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(storage_err)?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> WatchResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl KeyValueStore for SqliteKvStore {
    async fn get(&self, key: &str) -> WatchResult<Option<Value>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        match row {
            Some((raw,)) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| WatchError::Storage(format!("corrupt value under {key}: {e}"))),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value) -> WatchResult<()> {
        let raw = serde_json::to_string(&value).map_err(storage_err)?;
        sqlx::query(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(raw)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }
}

/// Process-local store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> WatchResult<Option<Value>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> WatchResult<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_sqlite_roundtrip_and_overwrite() {
        let store = SqliteKvStore::connect("sqlite::memory:").await.unwrap();
        assert_eq!(store.get("watchlist").await.unwrap(), None);

        store.set("watchlist", json!([{ "id": 1 }])).await.unwrap();
        store.set("watchlist", json!([{ "id": 2 }])).await.unwrap();

        assert_eq!(store.get("watchlist").await.unwrap(), Some(json!([{ "id": 2 }])));
    }

    #[tokio::test]
    async fn test_sqlite_corrupt_value_is_storage_error() {
        let store = SqliteKvStore::connect("sqlite::memory:").await.unwrap();
        sqlx::query("INSERT INTO kv_store (key, value) VALUES ('settings', 'not json')")
            .execute(store.pool())
            .await
            .unwrap();

        assert!(matches!(store.get("settings").await, Err(WatchError::Storage(_))));
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryKvStore::new();
        store.set("lastUpdate", json!(42)).await.unwrap();
        assert_eq!(store.get("lastUpdate").await.unwrap(), Some(json!(42)));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }
}
