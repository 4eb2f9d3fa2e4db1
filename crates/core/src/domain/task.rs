// Maintenance Task Contract
// A task is an opaque, idempotent unit of work with a single capability

use async_trait::async_trait;
use thiserror::Error;

/// Task name (unique within a catalog)
pub type TaskName = String;

/// Failure raised by a task's `execute` capability.
///
/// Task failures are reported and absorbed by the executor; they never cross
/// the single-task boundary.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("{0}")]
    Failed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A registered maintenance job.
///
/// Implementations must be idempotent: the scheduler guards against
/// concurrent re-entry, not against repeated runs.
#[async_trait]
pub trait MaintenanceTask: Send + Sync {
    /// Run the task to completion.
    ///
    /// # Errors
    /// Any `TaskError`; the caller logs it and keeps going.
    async fn execute(&self) -> Result<(), TaskError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock task behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Always succeed
        Success,
        /// Always fail with message
        Fail(String),
    }

    /// Mock task for testing
    pub struct MockTask {
        behavior: Arc<Mutex<MockBehavior>>,
        call_count: Arc<Mutex<usize>>,
    }

    impl MockTask {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl MaintenanceTask for MockTask {
        async fn execute(&self) -> Result<(), TaskError> {
            *self.call_count.lock().unwrap() += 1;

            let behavior = self.behavior.lock().unwrap().clone();

            match behavior {
                MockBehavior::Success => Ok(()),
                MockBehavior::Fail(msg) => Err(TaskError::Failed(msg)),
            }
        }
    }
}
