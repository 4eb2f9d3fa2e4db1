// SQLite MessageBridge Implementation
// Queue rows carry opaque JSON payloads; suppression markers live beside them

use crate::map_sqlx_error;
use async_trait::async_trait;
use custodian_core::error::Result;
use custodian_core::port::{IdProvider, MessageBridge, TaskMessage, TimeProvider};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::debug;

pub struct SqliteMessageBridge {
    pool: SqlitePool,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteMessageBridge {
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

    /// Messages not yet consumed, oldest first (consumer-side query).
    pub async fn pending(&self) -> Result<Vec<TaskMessage>> {
        let payloads: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT payload FROM task_messages
            WHERE consumed_at IS NULL
            ORDER BY enqueued_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let mut messages = Vec::with_capacity(payloads.len());
        for payload in payloads {
            messages.push(serde_json::from_str(&payload)?);
        }
        Ok(messages)
    }

    /// Whether a suppression marker exists for `task` (consumer-side query).
    pub async fn is_marked_skipped(&self, task: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM skipped_tasks WHERE task = ?")
            .bind(task)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count > 0)
    }
}

#[async_trait]
impl MessageBridge for SqliteMessageBridge {
    async fn dispatch(&self, message: &TaskMessage) -> Result<()> {
        let id = self.id_provider.generate_id();
        let now = self.time_provider.now_secs();
        let payload = serde_json::to_string(message)?;

        sqlx::query(
            r#"
            INSERT INTO task_messages (id, payload, enqueued_at, consumed_at)
            VALUES (?, ?, ?, NULL)
            "#,
        )
        .bind(&id)
        .bind(&payload)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!(id = %id, task = %message.task, "Message enqueued");
        Ok(())
    }

    async fn mark_skipped(&self, task: &str) -> Result<()> {
        let now = self.time_provider.now_secs();

        // INSERT OR IGNORE makes repeated suppression calls harmless
        sqlx::query("INSERT OR IGNORE INTO skipped_tasks (task, marked_at) VALUES (?, ?)")
            .bind(task)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }
}
