//! Re-exports common types for convenient usage.
//!
//! # Example
//! ```rust,no_run
//! use resilient::prelude::*;
//! ```

pub use crate::breaker::CircuitBreaker;
pub use crate::config::Config;
pub use crate::error::ConfigError;
pub use crate::instrument::Instrumenter;
pub use crate::metrics::RollingMetrics;
pub use crate::storage::MetricsStorage;
