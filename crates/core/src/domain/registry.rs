// Task Registry - the catalog of maintenance jobs
// Built once at startup, read-only afterwards

use crate::domain::error::{DomainError, Result};
use crate::domain::task::MaintenanceTask;
use std::collections::BTreeMap;
use std::sync::Arc;

/// How a catalog entry is executed.
///
/// `InProcess` entries run inside an executor holding their lock; `Bridged`
/// entries are delegated entirely to the message bridge and consumed
/// elsewhere.
pub enum TaskEntry {
    InProcess(Arc<dyn MaintenanceTask>),
    Bridged,
}

impl TaskEntry {
    pub fn is_bridged(&self) -> bool {
        matches!(self, TaskEntry::Bridged)
    }
}

/// Catalog of maintenance jobs, keyed by unique name.
///
/// A BTreeMap keeps `names()` in a stable sorted order for listing surfaces.
#[derive(Default)]
pub struct TaskRegistry {
    entries: BTreeMap<String, TaskEntry>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an in-process task under `name`.
    ///
    /// # Errors
    /// `DomainError::DuplicateTask` if the name is taken (either mode); the
    /// existing registration is left intact. Duplicates are a wiring bug and
    /// must fail during startup, never be silently overwritten.
    pub fn register(&mut self, name: impl Into<String>, task: Arc<dyn MaintenanceTask>) -> Result<()> {
        self.insert(name.into(), TaskEntry::InProcess(task))
    }

    /// Register a name whose execution is delegated to the message bridge.
    pub fn register_bridged(&mut self, name: impl Into<String>) -> Result<()> {
        self.insert(name.into(), TaskEntry::Bridged)
    }

    fn insert(&mut self, name: String, entry: TaskEntry) -> Result<()> {
        if self.entries.contains_key(&name) {
            return Err(DomainError::DuplicateTask { name });
        }
        self.entries.insert(name, entry);
        Ok(())
    }

    /// All catalog names, both in-process and bridged, in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Combined-catalog membership test.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&TaskEntry> {
        self.entries.get(name)
    }

    /// In-process tasks only (bridged names excluded).
    pub fn tasks(&self) -> impl Iterator<Item = (&str, &Arc<dyn MaintenanceTask>)> {
        self.entries.iter().filter_map(|(name, entry)| match entry {
            TaskEntry::InProcess(task) => Some((name.as_str(), task)),
            TaskEntry::Bridged => None,
        })
    }

    /// Every catalog entry, for the batch loop.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &TaskEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
