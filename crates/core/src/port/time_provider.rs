// Time Provider Port (for testability)

/// Time provider interface (allows mocking in tests)
pub trait TimeProvider: Send + Sync {
    /// Get current time in seconds since epoch
    fn now_secs(&self) -> i64;
}

/// System time provider (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Fixed, settable clock for tests
    pub struct MockTimeProvider {
        current_time: Mutex<i64>,
    }

    impl MockTimeProvider {
        pub fn new(current_time: i64) -> Self {
            Self {
                current_time: Mutex::new(current_time),
            }
        }

        pub fn set(&self, time: i64) {
            *self.current_time.lock().unwrap() = time;
        }
    }

    impl TimeProvider for MockTimeProvider {
        fn now_secs(&self) -> i64 {
            *self.current_time.lock().unwrap()
        }
    }
}
