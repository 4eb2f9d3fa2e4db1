// SQLite LockProvider Implementation
// Lease rows in the `locks` table; expired leases are taken over atomically

use crate::map_sqlx_error;
use async_trait::async_trait;
use custodian_core::error::Result;
use custodian_core::port::{IdProvider, LockHandle, LockProvider, TimeProvider};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::debug;

pub struct SqliteLockProvider {
    pool: SqlitePool,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteLockProvider {
    pub fn new(
        pool: SqlitePool,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            pool,
            id_provider,
            time_provider,
        }
    }
}

#[async_trait]
impl LockProvider for SqliteLockProvider {
    async fn try_acquire(&self, key: &str, ttl_secs: i64) -> Result<Option<LockHandle>> {
        let now = self.time_provider.now_secs();
        let owner = self.id_provider.generate_id();

        // Single atomic claim: insert a fresh lease, or take over a row whose
        // lease has expired. rows_affected == 0 means a live holder exists.
        let result = sqlx::query(
            r#"
            INSERT INTO locks (key, owner, expires_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET owner = excluded.owner, expires_at = excluded.expires_at
            WHERE locks.expires_at <= ?
            "#,
        )
        .bind(key)
        .bind(&owner)
        .bind(now + ttl_secs)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            debug!(key = %key, "Lock held elsewhere");
            return Ok(None);
        }

        debug!(key = %key, owner = %owner, "Lock acquired");
        Ok(Some(LockHandle {
            key: key.to_string(),
            owner,
        }))
    }

    async fn release(&self, handle: &LockHandle) -> Result<()> {
        // Owner-scoped delete: releasing a handle that was never granted, or
        // whose lease has been taken over, touches nothing.
        sqlx::query("DELETE FROM locks WHERE key = ? AND owner = ?")
            .bind(&handle.key)
            .bind(&handle.owner)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }
}
