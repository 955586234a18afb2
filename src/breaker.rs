//! Core circuit breaker implementation.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::clock::Clock;
use crate::config::{BreakerBuilder, Config};
use crate::instrument::Instrumenter;
use crate::metrics::RollingMetrics;

/// Admission-control state machine guarding a risky dependency.
///
/// The breaker answers "may I proceed?" via [`allow_request`] and learns
/// from outcomes the caller reports via [`mark_success`] and
/// [`mark_failure`]; it never performs, retries, or times out the guarded
/// call itself.
///
/// Three logical states, two stored fields. `open` and `opened_at` are the
/// only persisted state; half-open is derived at decision time:
///
/// | `open` | elapsed vs sleep window | decision |
/// |---|---|---|
/// | `false` | — | closed: judge by window metrics |
/// | `true` | `now - opened_at <= sleep_window` | open: deny |
/// | `true` | `now - opened_at > sleep_window` | half-open: allow a probe |
///
/// A probe that succeeds closes the circuit (any reported success does);
/// a probe that fails leaves `open` set and restarts nothing, so further
/// requests stay denied until the threshold arithmetic changes.
///
/// Every transition happens synchronously inside these three methods; there
/// are no background threads or timers. Tripping uses a compare-exchange,
/// so concurrent callers racing to trip do so once. The design tolerates a
/// benign race where the circuit trips slightly later or recovers slightly
/// earlier than a perfectly serialized execution would; counters themselves
/// are never corrupted because the default storage serializes increments.
///
/// [`allow_request`]: CircuitBreaker::allow_request
/// [`mark_success`]: CircuitBreaker::mark_success
/// [`mark_failure`]: CircuitBreaker::mark_failure
pub struct CircuitBreaker {
    config: Arc<Config>,
    metrics: RollingMetrics,
    open: AtomicBool,
    opened_at: AtomicU64,
    clock: Arc<dyn Clock>,
    instrumenter: Arc<dyn Instrumenter>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl CircuitBreaker {
    /// Creates a breaker with the default configuration and a fresh
    /// in-memory rolling metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for customizing a circuit breaker.
    pub fn builder() -> BreakerBuilder {
        BreakerBuilder::new()
    }

    pub(crate) fn from_parts(
        config: Arc<Config>,
        metrics: RollingMetrics,
        clock: Arc<dyn Clock>,
        instrumenter: Arc<dyn Instrumenter>,
    ) -> Self {
        Self {
            config,
            metrics,
            open: AtomicBool::new(false),
            opened_at: AtomicU64::new(0),
            clock,
            instrumenter,
        }
    }

    /// The breaker's configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The breaker's rolling metrics.
    pub fn metrics(&self) -> &RollingMetrics {
        &self.metrics
    }

    /// Whether the circuit is currently tripped.
    pub fn open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Decides whether a request may proceed right now.
    ///
    /// A pure function of the current time and recorded history, evaluated
    /// fresh on every call: repeated calls with no intervening marks and no
    /// elapsed time return the same answer. This is also where the circuit
    /// trips — a failure report alone never flips state.
    pub fn allow_request(&self) -> bool {
        let allowed = self.decide();
        if allowed {
            self.instrumenter.on_allowed();
        } else {
            self.instrumenter.on_denied();
        }
        allowed
    }

    fn decide(&self) -> bool {
        // force_closed wins over force_open when both are set.
        if self.config.force_closed() {
            return true;
        }
        if self.config.force_open() {
            return false;
        }

        if self.open.load(Ordering::Acquire) {
            // Cooling down: deny until strictly more than sleep_window
            // seconds have elapsed (the boundary second still denies),
            // then allow a probe through without clearing `open`; only a
            // reported success closes the circuit.
            let opened_at = self.opened_at.load(Ordering::Acquire);
            return self.clock.now().saturating_sub(opened_at) > self.config.sleep_window_seconds();
        }

        // Closed: not enough samples to judge means allow.
        if self.metrics.requests() < self.config.request_volume_threshold() {
            return true;
        }

        // Threshold is inclusive: hitting it exactly trips the circuit.
        if self.metrics.error_percentage() >= self.config.error_threshold_percentage() {
            self.trip();
            return false;
        }

        true
    }

    /// Records a reported success and closes the circuit.
    ///
    /// A success always closes the circuit immediately, whatever state it
    /// was in; this is how a half-open probe recovers the breaker.
    pub fn mark_success(&self) {
        self.metrics.mark_success();
        self.opened_at.store(0, Ordering::Release);
        if self.open.swap(false, Ordering::AcqRel) {
            self.instrumenter.on_closed();
        }
        self.instrumenter.on_success();
    }

    /// Records a reported failure.
    ///
    /// Does not flip state by itself: the transition to open happens lazily
    /// the next time [`allow_request`](CircuitBreaker::allow_request) finds
    /// the threshold breached, keeping all transition logic in one place.
    pub fn mark_failure(&self) {
        self.metrics.mark_failure();
        self.instrumenter.on_failure();
    }

    /// Clears metrics and closes the circuit.
    pub fn reset(&self) {
        self.metrics.reset();
        self.open.store(false, Ordering::Release);
        self.opened_at.store(0, Ordering::Release);
    }

    fn trip(&self) {
        // Only the thread that wins the exchange records the trip time:
        // a late tripper must not refresh opened_at on a circuit already
        // cooling down, which would extend the sleep window. A reader
        // that observes `open` before opened_at lands merely probes
        // early, the tolerated direction.
        if self
            .open
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.opened_at.store(self.clock.now(), Ordering::Release);
            self.instrumenter.on_open();
        }
    }
}
