// Execution Event Sink Port
// Reporting is an injected sink rather than an ambient logger, so tests can
// assert on the emitted trail

use tracing::{error, info, warn};

/// Why a task was filtered out of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A non-empty valid-jobs list did not contain the task
    NotInValidJobs,
    /// The excluded-jobs list contained the task
    Excluded,
}

/// Everything the executor reports about task execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionEvent {
    /// Task ran to completion
    Completed { task: String },
    /// Task raised; absorbed at the single-task boundary
    Failed { task: String, error: String },
    /// Lock held elsewhere, execution skipped (normal overlap outcome)
    SkippedLocked { task: String },
    /// Filtered out of a batch run
    SkippedFiltered { task: String, reason: SkipReason },
    /// Message handed to the bridge
    Dispatched { task: String, force: bool },
    /// Force flag bypassed a held lock; running without exclusivity
    ForcedWithoutLock { task: String },
}

/// Structured-event sink interface.
pub trait ExecutionEventSink: Send + Sync {
    fn emit(&self, event: ExecutionEvent);
}

/// Production sink forwarding events to `tracing`.
pub struct TracingEventSink;

impl ExecutionEventSink for TracingEventSink {
    fn emit(&self, event: ExecutionEvent) {
        match event {
            ExecutionEvent::Completed { task } => {
                info!(id = %task, "Finished job");
            }
            ExecutionEvent::Failed { task, error } => {
                error!(id = %task, error = %error, "Failed to execute job");
            }
            ExecutionEvent::SkippedLocked { task } => {
                info!(id = %task, "Skipped job because it is already being executed");
            }
            ExecutionEvent::SkippedFiltered { task, reason } => match reason {
                SkipReason::NotInValidJobs => {
                    info!(id = %task, "Skipped job because it is not in the valid jobs");
                }
                SkipReason::Excluded => {
                    info!(id = %task, "Skipped job because it has been excluded");
                }
            },
            ExecutionEvent::Dispatched { task, force } => {
                info!(id = %task, force = force, "Dispatched job to the message bridge");
            }
            ExecutionEvent::ForcedWithoutLock { task } => {
                warn!(id = %task, "Executing job without exclusivity (force)");
            }
        }
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Records every emitted event in order.
    #[derive(Default)]
    pub struct RecordingEventSink {
        events: Mutex<Vec<ExecutionEvent>>,
    }

    impl RecordingEventSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<ExecutionEvent> {
            self.events.lock().unwrap().clone()
        }

        pub fn count_matching(&self, predicate: impl Fn(&ExecutionEvent) -> bool) -> usize {
            self.events.lock().unwrap().iter().filter(|e| predicate(e)).count()
        }
    }

    impl ExecutionEventSink for RecordingEventSink {
        fn emit(&self, event: ExecutionEvent) {
            self.events.lock().unwrap().push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::RecordingEventSink;
    use super::*;

    #[test]
    fn test_recording_sink_keeps_order() {
        let sink = RecordingEventSink::new();
        sink.emit(ExecutionEvent::Dispatched {
            task: "cleanup".to_string(),
            force: false,
        });
        sink.emit(ExecutionEvent::Completed {
            task: "cleanup".to_string(),
        });

        assert_eq!(
            sink.events(),
            vec![
                ExecutionEvent::Dispatched {
                    task: "cleanup".to_string(),
                    force: false
                },
                ExecutionEvent::Completed {
                    task: "cleanup".to_string()
                },
            ]
        );
        assert_eq!(
            sink.count_matching(|e| matches!(e, ExecutionEvent::Completed { .. })),
            1
        );
    }

    #[test]
    fn test_tracing_sink_handles_every_variant() {
        let sink = TracingEventSink;
        for event in [
            ExecutionEvent::Completed {
                task: "a".to_string(),
            },
            ExecutionEvent::Failed {
                task: "a".to_string(),
                error: "boom".to_string(),
            },
            ExecutionEvent::SkippedLocked {
                task: "a".to_string(),
            },
            ExecutionEvent::SkippedFiltered {
                task: "a".to_string(),
                reason: SkipReason::NotInValidJobs,
            },
            ExecutionEvent::SkippedFiltered {
                task: "a".to_string(),
                reason: SkipReason::Excluded,
            },
            ExecutionEvent::Dispatched {
                task: "a".to_string(),
                force: true,
            },
            ExecutionEvent::ForcedWithoutLock {
                task: "a".to_string(),
            },
        ] {
            sink.emit(event);
        }
    }
}
