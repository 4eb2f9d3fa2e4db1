// Distributed Lock Provider Port
// Named, time-bounded mutual-exclusion leases shared across processes/hosts

use crate::error::Result;
use async_trait::async_trait;

/// Proof of lock ownership.
///
/// `owner` is an opaque token minted per acquisition; release is scoped to
/// it, so releasing a handle that was never granted (or has since expired
/// and been taken over) touches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockHandle {
    pub key: String,
    pub owner: String,
}

/// Distributed lock interface.
///
/// Acquisition is a non-blocking attempt: a contended lock means "someone
/// else is already doing this", not a condition to wait out. The TTL bounds
/// a crashed holder's lease, it is not a normal-path timeout.
#[async_trait]
pub trait LockProvider: Send + Sync {
    /// Try to acquire the lock `key` for `ttl_secs`.
    ///
    /// Returns `None` when the lock is currently held elsewhere.
    async fn try_acquire(&self, key: &str, ttl_secs: i64) -> Result<Option<LockHandle>>;

    /// Release a previously acquired lock.
    ///
    /// Idempotent: releasing a handle that is not currently held is a no-op.
    async fn release(&self, handle: &LockHandle) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    };

    /// In-memory lock provider honoring the same contract as a real
    /// coordination service (single-process scope only).
    #[derive(Default)]
    pub struct InMemoryLockProvider {
        held: Mutex<HashMap<String, String>>,
        counter: AtomicU64,
        attempts: AtomicU64,
    }

    impl InMemoryLockProvider {
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of acquisition attempts seen so far.
        pub fn attempt_count(&self) -> u64 {
            self.attempts.load(Ordering::SeqCst)
        }

        /// Mark `key` as held by a foreign owner, simulating another host.
        pub fn hold(&self, key: &str) {
            self.held
                .lock()
                .unwrap()
                .insert(key.to_string(), "foreign-holder".to_string());
        }

        pub fn is_held(&self, key: &str) -> bool {
            self.held.lock().unwrap().contains_key(key)
        }
    }

    #[async_trait]
    impl LockProvider for InMemoryLockProvider {
        async fn try_acquire(&self, key: &str, _ttl_secs: i64) -> Result<Option<LockHandle>> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let mut held = self.held.lock().unwrap();
            if held.contains_key(key) {
                return Ok(None);
            }
            let owner = format!("owner-{}", self.counter.fetch_add(1, Ordering::SeqCst));
            held.insert(key.to_string(), owner.clone());
            Ok(Some(LockHandle {
                key: key.to_string(),
                owner,
            }))
        }

        async fn release(&self, handle: &LockHandle) -> Result<()> {
            let mut held = self.held.lock().unwrap();
            if held.get(&handle.key) == Some(&handle.owner) {
                held.remove(&handle.key);
            }
            Ok(())
        }
    }

}
