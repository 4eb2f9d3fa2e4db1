// Execution Timestamp Store Port
// Key-value collaborator persisting the last-execution audit record

use crate::error::Result;
use async_trait::async_trait;

/// Persistent key-value store interface.
#[async_trait]
pub trait TimestampStore: Send + Sync {
    /// Write `value` under `key`, overwriting any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Read the value under `key`, `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory store for tests
    #[derive(Default)]
    pub struct InMemoryTimestampStore {
        entries: Mutex<HashMap<String, String>>,
    }

    impl InMemoryTimestampStore {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl TimestampStore for InMemoryTimestampStore {
        async fn set(&self, key: &str, value: &str) -> Result<()> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }
    }
}
