use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};

/// Durable string-valued key-value storage. Records are serialized by the
/// repositories; the store never interprets values.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    async fn load(&self, key: &str) -> AppResult<Option<String>>;
    async fn save(&self, key: &str, value: &str) -> AppResult<()>;
    async fn remove(&self, key: &str) -> AppResult<()>;
}

// ============================================================================
// SQLite store
// ============================================================================

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn load(&self, key: &str) -> AppResult<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn save(&self, key: &str, value: &str) -> AppResult<()> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(())
    }
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn load(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("memory store lock poisoned")))?;
        Ok(entries.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("memory store lock poisoned")))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("memory store lock poisoned")))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.load("k").await.unwrap(), None);

        assert_ok!(store.save("k", "v1").await);
        assert_ok!(store.save("k", "v2").await);
        assert_eq!(store.load("k").await.unwrap().as_deref(), Some("v2"));

        assert_ok!(store.remove("k").await);
        assert_eq!(store.load("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn sqlite_store_persists_across_pools() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("planner.db");
        let url = format!("sqlite://{}", db_path.display());

        let config = crate::config::Config {
            database: crate::config::DatabaseConfig {
                url: url.clone(),
                max_connections: 1,
            },
            ..crate::config::Config::default()
        };

        {
            let pool = crate::services::init::init_db(&config).await.unwrap();
            let store = SqliteStore::new(pool.clone());
            assert_ok!(store.save("settings.city", "\"Pune\"").await);
            assert_ok!(store.save("settings.city", "\"Mumbai\"").await);
            pool.close().await;
        }

        let pool = crate::services::init::init_db(&config).await.unwrap();
        let store = SqliteStore::new(pool);
        assert_eq!(
            store.load("settings.city").await.unwrap().as_deref(),
            Some("\"Mumbai\"")
        );
        assert_ok!(store.remove("settings.city").await);
        assert_eq!(store.load("settings.city").await.unwrap(), None);
    }
}
