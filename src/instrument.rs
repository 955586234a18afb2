//! Instrumentation hooks for circuit breaker events.

use parking_lot::Mutex;

/// Observable circuit breaker events, in the order the breaker emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerEvent {
    /// A request was allowed through.
    Allowed,
    /// A request was short-circuited.
    Denied,
    /// The caller reported a success.
    Success,
    /// The caller reported a failure.
    Failure,
    /// The circuit tripped open.
    Opened,
    /// The circuit closed again.
    Closed,
}

/// Capability set notified of breaker events.
///
/// Notification is best-effort: the breaker updates its own state before
/// calling a hook, never reads a hook's result, and expects hooks not to
/// panic. Every method has a no-op default body, so an implementation only
/// overrides the events it cares about.
pub trait Instrumenter: Send + Sync {
    /// A request was allowed through.
    fn on_allowed(&self) {}

    /// A request was short-circuited.
    fn on_denied(&self) {}

    /// The caller reported a success.
    fn on_success(&self) {}

    /// The caller reported a failure.
    fn on_failure(&self) {}

    /// The circuit tripped open.
    fn on_open(&self) {}

    /// The circuit closed again.
    fn on_closed(&self) {}
}

/// Instrumenter that discards every event. The default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInstrumenter;

impl Instrumenter for NoopInstrumenter {}

/// Instrumenter that records events in order, for test assertions.
#[derive(Debug, Default)]
pub struct MemoryInstrumenter {
    events: Mutex<Vec<BreakerEvent>>,
}

impl MemoryInstrumenter {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event seen so far, oldest first.
    pub fn events(&self) -> Vec<BreakerEvent> {
        self.events.lock().clone()
    }

    /// Forgets all recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }

    fn record(&self, event: BreakerEvent) {
        self.events.lock().push(event);
    }
}

impl Instrumenter for MemoryInstrumenter {
    fn on_allowed(&self) {
        self.record(BreakerEvent::Allowed);
    }

    fn on_denied(&self) {
        self.record(BreakerEvent::Denied);
    }

    fn on_success(&self) {
        self.record(BreakerEvent::Success);
    }

    fn on_failure(&self) {
        self.record(BreakerEvent::Failure);
    }

    fn on_open(&self) {
        self.record(BreakerEvent::Opened);
    }

    fn on_closed(&self) {
        self.record(BreakerEvent::Closed);
    }
}

/// Instrumenter that emits `tracing` events.
#[cfg(feature = "tracing")]
#[cfg_attr(docsrs, doc(cfg(feature = "tracing")))]
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingInstrumenter;

#[cfg(feature = "tracing")]
impl Instrumenter for TracingInstrumenter {
    fn on_allowed(&self) {
        tracing::trace!("circuit breaker allowed request");
    }

    fn on_denied(&self) {
        tracing::debug!("circuit breaker denied request");
    }

    fn on_success(&self) {
        tracing::trace!("circuit breaker recorded success");
    }

    fn on_failure(&self) {
        tracing::debug!("circuit breaker recorded failure");
    }

    fn on_open(&self) {
        tracing::warn!("circuit breaker opened");
    }

    fn on_closed(&self) {
        tracing::info!("circuit breaker closed");
    }
}
