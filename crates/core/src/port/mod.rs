// Port Layer - Interfaces for external dependencies

pub mod event_sink;
pub mod id_provider; // For deterministic testing
pub mod lock_provider;
pub mod message_bridge;
pub mod time_provider;
pub mod timestamp_store;

// Re-exports
pub use event_sink::{ExecutionEvent, ExecutionEventSink, SkipReason, TracingEventSink};
pub use id_provider::IdProvider;
pub use lock_provider::{LockHandle, LockProvider};
pub use message_bridge::{MessageBridge, TaskMessage};
pub use time_provider::TimeProvider;
pub use timestamp_store::TimestampStore;
