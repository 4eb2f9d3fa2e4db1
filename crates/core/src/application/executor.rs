// Maintenance Executor - composes catalog, locks, bridge and bookkeeping
// to run one task synchronously or an entire batch asynchronously

use crate::domain::{DomainError, TaskEntry, TaskRegistry};
use crate::error::Result;
use crate::port::{
    ExecutionEvent, ExecutionEventSink, LockProvider, MessageBridge, SkipReason, TaskMessage,
    TimeProvider, TimestampStore,
};
use std::sync::Arc;
use tracing::debug;

/// Prefix for per-task lock keys
pub const LOCK_PREFIX: &str = "maintenance-";

/// Lock lease duration (24h): bounds a crashed holder's lease, not a
/// normal-path timeout
pub const LOCK_TTL_SECS: i64 = 86_400;

/// Fixed key for the last-execution audit record
pub const LAST_EXECUTION_KEY: &str = "maintenance-last-execution";

/// Orchestrator for the maintenance-task catalog.
///
/// Sequential per invocation; cross-process concurrency is mediated entirely
/// by the lock provider. The registry is built once at startup and read-only
/// afterwards.
pub struct MaintenanceExecutor {
    registry: TaskRegistry,
    lock_provider: Arc<dyn LockProvider>,
    timestamp_store: Arc<dyn TimestampStore>,
    message_bridge: Arc<dyn MessageBridge>,
    time_provider: Arc<dyn TimeProvider>,
    event_sink: Arc<dyn ExecutionEventSink>,
}

impl MaintenanceExecutor {
    pub fn new(
        registry: TaskRegistry,
        lock_provider: Arc<dyn LockProvider>,
        timestamp_store: Arc<dyn TimestampStore>,
        message_bridge: Arc<dyn MessageBridge>,
        time_provider: Arc<dyn TimeProvider>,
        event_sink: Arc<dyn ExecutionEventSink>,
    ) -> Self {
        Self {
            registry,
            lock_provider,
            timestamp_store,
            message_bridge,
            time_provider,
            event_sink,
        }
    }

    /// Full catalog listing (in-process and bridged names, stable order).
    pub fn task_names(&self) -> Vec<String> {
        self.registry.names()
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Run a single task under its maintenance lock.
    ///
    /// A contended lock is a normal outcome (skip, no error) unless `force`
    /// opts out of exclusivity. A failure inside the task is reported and
    /// absorbed; only an unknown name or an infrastructure fault surfaces.
    pub async fn execute_task(&self, name: &str, force: bool) -> Result<()> {
        let entry = self
            .registry
            .get(name)
            .ok_or_else(|| DomainError::TaskNotFound {
                name: name.to_string(),
            })?;

        let task = match entry {
            TaskEntry::Bridged => {
                // Execution is delegated entirely to the bridge consumer
                self.message_bridge
                    .dispatch(&TaskMessage::new(name, force))
                    .await?;
                self.event_sink.emit(ExecutionEvent::Dispatched {
                    task: name.to_string(),
                    force,
                });
                return Ok(());
            }
            TaskEntry::InProcess(task) => Arc::clone(task),
        };

        let key = format!("{}{}", LOCK_PREFIX, name);
        let handle = self.lock_provider.try_acquire(&key, LOCK_TTL_SECS).await?;

        match &handle {
            Some(_) => debug!(key = %key, "Acquired maintenance lock"),
            None => {
                if !force {
                    self.event_sink.emit(ExecutionEvent::SkippedLocked {
                        task: name.to_string(),
                    });
                    return Ok(());
                }
                self.event_sink.emit(ExecutionEvent::ForcedWithoutLock {
                    task: name.to_string(),
                });
            }
        }

        match task.execute().await {
            Ok(()) => self.event_sink.emit(ExecutionEvent::Completed {
                task: name.to_string(),
            }),
            Err(e) => self.event_sink.emit(ExecutionEvent::Failed {
                task: name.to_string(),
                error: e.to_string(),
            }),
        }

        // Released on every path once acquired; a lease never granted has
        // nothing to release (force-bypass path).
        if let Some(handle) = handle {
            self.lock_provider.release(&handle).await?;
        }

        Ok(())
    }

    /// Trigger a batch run: stamp the audit record, then fan the catalog out
    /// through the bridge, applying the valid/excluded filters.
    ///
    /// Nothing runs in-process here; the effect is the set of dispatched and
    /// suppressed messages plus the event trail.
    pub async fn execute_maintenance(
        &self,
        valid_jobs: &[String],
        excluded_jobs: &[String],
        force: bool,
    ) -> Result<()> {
        self.set_last_execution().await?;

        for (name, entry) in self.registry.entries() {
            let reasons = skip_reasons(name, valid_jobs, excluded_jobs);

            match entry {
                TaskEntry::InProcess(_) => {
                    if let Some(reason) = reasons.first() {
                        self.event_sink.emit(ExecutionEvent::SkippedFiltered {
                            task: name.to_string(),
                            reason: *reason,
                        });
                        continue;
                    }
                    self.message_bridge
                        .dispatch(&TaskMessage::new(name, force))
                        .await?;
                    self.event_sink.emit(ExecutionEvent::Dispatched {
                        task: name.to_string(),
                        force,
                    });
                }
                TaskEntry::Bridged => {
                    // One suppression per matching filter: a name excluded by
                    // both filters marks the skip twice. mark_skipped is
                    // idempotent, so the double signal is harmless.
                    for reason in reasons {
                        self.event_sink.emit(ExecutionEvent::SkippedFiltered {
                            task: name.to_string(),
                            reason,
                        });
                        self.message_bridge.mark_skipped(name).await?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Stamp the audit record with the current time.
    pub async fn set_last_execution(&self) -> Result<()> {
        let now = self.time_provider.now_secs();
        self.timestamp_store
            .set(LAST_EXECUTION_KEY, &now.to_string())
            .await
    }

    /// Last batch-trigger time as a Unix timestamp; `0` when never executed.
    pub async fn get_last_execution(&self) -> Result<i64> {
        let value = self.timestamp_store.get(LAST_EXECUTION_KEY).await?;
        Ok(value
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(0))
    }
}

/// Matching skip reasons for `name`, in filter order. The two checks are
/// independent, so a name can match both.
fn skip_reasons(name: &str, valid_jobs: &[String], excluded_jobs: &[String]) -> Vec<SkipReason> {
    let mut reasons = Vec::new();
    if !valid_jobs.is_empty() && !valid_jobs.iter().any(|job| job == name) {
        reasons.push(SkipReason::NotInValidJobs);
    }
    if !excluded_jobs.is_empty() && excluded_jobs.iter().any(|job| job == name) {
        reasons.push(SkipReason::Excluded);
    }
    reasons
}
