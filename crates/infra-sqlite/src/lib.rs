// Custodian Infrastructure - SQLite Adapters
// Implements: LockProvider, TimestampStore, MessageBridge over a shared
// database file (single-host, multi-process deployments)

mod connection;
mod kv_store;
mod lock_provider;
mod message_bridge;
mod migration;

pub use connection::create_pool;
pub use kv_store::SqliteTimestampStore;
pub use lock_provider::SqliteLockProvider;
pub use message_bridge::SqliteMessageBridge;
pub use migration::run_migrations;

// Note: sqlx::Error conversion is handled by the helper below
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)

use custodian_core::AppError;

pub(crate) fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                AppError::Database(format!("Database error [{}]: {}", code, db_err.message()))
            } else {
                AppError::Database(format!("Database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => AppError::Database("Row not found".to_string()),
        _ => AppError::Database(err.to_string()),
    }
}
