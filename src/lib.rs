//! # resilient
//!
//! A sliding-window circuit breaker library for Rust applications.
//!
//! A circuit breaker protects a caller from repeatedly invoking a failing
//! dependency. It tracks recent success/failure outcomes in a trailing time
//! window and, once the failure rate crosses a threshold, short-circuits
//! further attempts for a cooldown period before cautiously allowing
//! traffic again.
//!
//! This crate is a decision oracle, not a call wrapper: it answers "may I
//! proceed?" and records the outcomes you report. It never performs the
//! guarded call, retries it, or times it out — you own the call and its
//! cancellation, the breaker owns the admission decision.
//!
//! ## How it decides
//!
//! - **Closed**: requests flow. Once enough samples are in the window and
//!   the failure percentage reaches the configured threshold, the circuit
//!   trips.
//! - **Open**: requests are denied while the sleep window elapses.
//! - **Half-open**: after the sleep window, a probe request is allowed
//!   through while the circuit formally stays open; a reported success
//!   closes it again.
//!
//! Outcome counts live in a fixed ring of time buckets, so recording is
//! O(1) and aggregation is O(buckets) regardless of call volume.
//!
//! ## Basic usage
//!
//! ```rust
//! use resilient::{CircuitBreaker, Config};
//!
//! # fn main() -> Result<(), resilient::ConfigError> {
//! let config = Config::builder()
//!     .error_threshold_percentage(50) // trip at a 50% failure rate
//!     .request_volume_threshold(20)   // but only once 20 requests are in-window
//!     .sleep_window_seconds(5)        // cool down 5s before probing
//!     .build()?;
//!
//! let breaker = CircuitBreaker::builder().config(config).build();
//!
//! if breaker.allow_request() {
//!     match risky_call() {
//!         Ok(_) => breaker.mark_success(),
//!         Err(_) => breaker.mark_failure(),
//!     }
//! } else {
//!     // short-circuited: fail fast, serve a fallback, shed load, ...
//! }
//! # Ok(())
//! # }
//! # fn risky_call() -> Result<(), ()> { Ok(()) }
//! ```
//!
//! ## Pluggable pieces
//!
//! - [`MetricsStorage`]: where per-bucket counters live. The default
//!   [`MemoryStorage`] is in-process; a backend with shared atomic counters
//!   enables cross-process breakers without touching breaker or metrics
//!   logic.
//! - [`Clock`]: the time source. Tests substitute a [`ManualClock`] and
//!   travel in time instead of sleeping.
//! - [`Instrumenter`]: best-effort event hooks (allowed, denied, success,
//!   failure, opened, closed). [`NoopInstrumenter`] discards everything;
//!   [`MemoryInstrumenter`] records events in order for assertions.
//!
//! ## Features
//!
//! - `std` - Standard library support (default)
//! - `tracing` - A `TracingInstrumenter` emitting `tracing` events

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod breaker;
mod clock;
mod config;
mod error;
mod instrument;
mod metrics;
pub mod prelude;
mod storage;

// Re-exports
pub use breaker::CircuitBreaker;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BreakerBuilder, Config, ConfigBuilder};
pub use error::{ConfigError, ConfigResult};
pub use instrument::{BreakerEvent, Instrumenter, MemoryInstrumenter, NoopInstrumenter};
#[cfg(feature = "tracing")]
pub use instrument::TracingInstrumenter;
pub use metrics::RollingMetrics;
pub use storage::{Counter, MemoryStorage, MetricsStorage};
