// SQLite TimestampStore Implementation

use crate::map_sqlx_error;
use async_trait::async_trait;
use custodian_core::error::Result;
use custodian_core::port::{TimeProvider, TimestampStore};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Key-value store over the `kv_store` table.
pub struct SqliteTimestampStore {
    pool: SqlitePool,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteTimestampStore {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            pool,
            time_provider,
        }
    }
}

#[async_trait]
impl TimestampStore for SqliteTimestampStore {
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = self.time_provider.now_secs();

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(value)
    }
}
