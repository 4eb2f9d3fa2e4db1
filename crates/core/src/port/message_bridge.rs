// Message Dispatch Bridge Port
// Converts "run this task" intents into queued messages for out-of-process
// execution, plus a side-channel suppressing messages already in flight

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Wire payload for a queued task run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMessage {
    pub task: String,
    pub force: bool,
}

impl TaskMessage {
    pub fn new(task: impl Into<String>, force: bool) -> Self {
        Self {
            task: task.into(),
            force,
        }
    }
}

/// Message bridge interface.
///
/// Dispatch is fire-and-forget: no completion signal, no ordering guarantee,
/// no cancellation once queued. `mark_skipped` only helps if the consumer
/// checks it before running.
#[async_trait]
pub trait MessageBridge: Send + Sync {
    /// Enqueue a message for asynchronous execution.
    async fn dispatch(&self, message: &TaskMessage) -> Result<()>;

    /// Instruct the consumer to suppress a pending message for `task`.
    ///
    /// Idempotent: marking the same name repeatedly is harmless.
    async fn mark_skipped(&self, task: &str) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Recording bridge: keeps every dispatch and every suppression call,
    /// duplicates included, so tests can count exact signal traffic.
    #[derive(Default)]
    pub struct RecordingBridge {
        dispatched: Mutex<Vec<TaskMessage>>,
        skipped: Mutex<Vec<String>>,
    }

    impl RecordingBridge {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn dispatched(&self) -> Vec<TaskMessage> {
            self.dispatched.lock().unwrap().clone()
        }

        pub fn skipped(&self) -> Vec<String> {
            self.skipped.lock().unwrap().clone()
        }

        pub fn skip_count(&self, task: &str) -> usize {
            self.skipped
                .lock()
                .unwrap()
                .iter()
                .filter(|name| name.as_str() == task)
                .count()
        }
    }

    #[async_trait]
    impl MessageBridge for RecordingBridge {
        async fn dispatch(&self, message: &TaskMessage) -> Result<()> {
            self.dispatched.lock().unwrap().push(message.clone());
            Ok(())
        }

        async fn mark_skipped(&self, task: &str) -> Result<()> {
            self.skipped.lock().unwrap().push(task.to_string());
            Ok(())
        }
    }
}
