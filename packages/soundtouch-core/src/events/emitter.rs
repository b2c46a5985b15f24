//! Event emitter abstraction for decoupling the controller from presentation.
//!
//! The controller depends on the [`EventEmitter`] trait rather than on a
//! concrete UI, enabling testing and alternative frontends.

use super::SessionEvent;

/// Trait for emitting session events without knowledge of the consumer.
///
/// # Example
///
/// ```ignore
/// struct PrintingEmitter;
///
/// impl EventEmitter for PrintingEmitter {
///     fn emit(&self, event: SessionEvent) {
///         println!("{event:?}");
///     }
/// }
/// ```
pub trait EventEmitter: Send + Sync {
    /// Emits a session event.
    fn emit(&self, event: SessionEvent);
}

/// No-op emitter for headless use or testing.
pub struct NoopEventEmitter;

impl EventEmitter for NoopEventEmitter {
    fn emit(&self, _event: SessionEvent) {
        // No-op
    }
}

/// Logging emitter for debugging and development.
///
/// Logs all events at debug level.
pub struct LoggingEventEmitter;

impl EventEmitter for LoggingEventEmitter {
    fn emit(&self, event: SessionEvent) {
        tracing::debug!(?event, "session_event");
    }
}
