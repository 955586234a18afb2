//! Configuration and builders for circuit breakers.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::breaker::CircuitBreaker;
use crate::clock::{Clock, SystemClock};
use crate::error::{ConfigError, ConfigResult};
use crate::instrument::{Instrumenter, NoopInstrumenter};
use crate::metrics::RollingMetrics;
use crate::storage::MetricsStorage;

/// Process-wide default configuration, shared by breakers built without an
/// explicit config.
static DEFAULT_CONFIG: Lazy<Arc<Config>> = Lazy::new(|| Arc::new(Config::default()));

/// Immutable circuit breaker tunables.
///
/// Built through [`Config::builder`]; validation happens once at build time
/// and never again, so a `Config` in hand is always internally consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    force_open: bool,
    force_closed: bool,
    sleep_window_seconds: u64,
    request_volume_threshold: u64,
    error_threshold_percentage: u8,
    window_size_in_seconds: u64,
    bucket_size_in_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            force_open: false,
            force_closed: false,
            sleep_window_seconds: 5,
            request_volume_threshold: 20,
            error_threshold_percentage: 50,
            window_size_in_seconds: 60,
            bucket_size_in_seconds: 10,
        }
    }
}

impl Config {
    /// Creates a builder seeded with the defaults.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// The shared default configuration.
    pub(crate) fn shared_default() -> Arc<Config> {
        Arc::clone(&DEFAULT_CONFIG)
    }

    /// When true, every request is denied regardless of metrics.
    pub fn force_open(&self) -> bool {
        self.force_open
    }

    /// When true, every request is allowed regardless of metrics.
    pub fn force_closed(&self) -> bool {
        self.force_closed
    }

    /// Cooldown after tripping before a probe request is allowed.
    pub fn sleep_window_seconds(&self) -> u64 {
        self.sleep_window_seconds
    }

    /// Minimum in-window requests before the breaker may trip at all.
    pub fn request_volume_threshold(&self) -> u64 {
        self.request_volume_threshold
    }

    /// Failure-rate percentage at or above which the breaker trips.
    pub fn error_threshold_percentage(&self) -> u8 {
        self.error_threshold_percentage
    }

    /// Total trailing window duration.
    pub fn window_size_in_seconds(&self) -> u64 {
        self.window_size_in_seconds
    }

    /// Granularity of the window.
    pub fn bucket_size_in_seconds(&self) -> u64 {
        self.bucket_size_in_seconds
    }

    /// Number of buckets the window is divided into.
    pub fn number_of_buckets(&self) -> u64 {
        self.window_size_in_seconds / self.bucket_size_in_seconds
    }
}

/// Builder for [`Config`]. Every option is optional and defaults to the
/// values documented on its setter.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    /// Creates a builder seeded with the defaults.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Deny every request, overriding metrics. Default `false`.
    pub fn force_open(mut self, force_open: bool) -> Self {
        self.config.force_open = force_open;
        self
    }

    /// Allow every request, overriding metrics (and `force_open`).
    /// Default `false`.
    pub fn force_closed(mut self, force_closed: bool) -> Self {
        self.config.force_closed = force_closed;
        self
    }

    /// Cooldown in seconds after tripping before a probe is allowed.
    /// Default 5.
    pub fn sleep_window_seconds(mut self, seconds: u64) -> Self {
        self.config.sleep_window_seconds = seconds;
        self
    }

    /// Minimum in-window requests before the breaker may trip. Default 20.
    pub fn request_volume_threshold(mut self, threshold: u64) -> Self {
        self.config.request_volume_threshold = threshold;
        self
    }

    /// Failure percentage (0..=100) at or above which the breaker trips.
    /// Default 50.
    pub fn error_threshold_percentage(mut self, percentage: u8) -> Self {
        self.config.error_threshold_percentage = percentage;
        self
    }

    /// Total trailing window duration in seconds. Default 60.
    pub fn window_size_in_seconds(mut self, seconds: u64) -> Self {
        self.config.window_size_in_seconds = seconds;
        self
    }

    /// Bucket granularity in seconds. Must divide the window size evenly
    /// and be strictly smaller than it. Default 10.
    pub fn bucket_size_in_seconds(mut self, seconds: u64) -> Self {
        self.config.bucket_size_in_seconds = seconds;
        self
    }

    /// Validates and builds the configuration.
    pub fn build(self) -> ConfigResult<Config> {
        let config = self.config;
        if config.bucket_size_in_seconds == 0 {
            return Err(ConfigError::BucketSizeZero);
        }
        if config.bucket_size_in_seconds >= config.window_size_in_seconds {
            return Err(ConfigError::BucketExceedsWindow {
                bucket_size_in_seconds: config.bucket_size_in_seconds,
                window_size_in_seconds: config.window_size_in_seconds,
            });
        }
        if config.window_size_in_seconds % config.bucket_size_in_seconds != 0 {
            return Err(ConfigError::WindowNotDivisible {
                bucket_size_in_seconds: config.bucket_size_in_seconds,
                window_size_in_seconds: config.window_size_in_seconds,
            });
        }
        Ok(config)
    }
}

/// Builder for [`CircuitBreaker`]. Every part is optional: the default is
/// the shared default config, a fresh in-memory rolling metrics, the system
/// clock, and a no-op instrumenter.
pub struct BreakerBuilder {
    config: Option<Arc<Config>>,
    metrics: Option<RollingMetrics>,
    storage: Option<Box<dyn MetricsStorage>>,
    clock: Arc<dyn Clock>,
    instrumenter: Arc<dyn Instrumenter>,
}

impl Default for BreakerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BreakerBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: None,
            metrics: None,
            storage: None,
            clock: Arc::new(SystemClock),
            instrumenter: Arc::new(NoopInstrumenter),
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(Arc::new(config));
        self
    }

    /// Supplies a pre-built rolling metrics instance. Takes precedence over
    /// [`storage`](Self::storage) and [`clock`](Self::clock) for the
    /// metrics side; the breaker itself still uses the builder's clock for
    /// sleep-window timing, so tests driving a [`ManualClock`](crate::ManualClock)
    /// should share one instance between the two.
    pub fn metrics(mut self, metrics: RollingMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Sets the counter storage backend for the breaker-built metrics.
    pub fn storage(mut self, storage: Box<dyn MetricsStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Sets the clock used for bucket rotation and sleep-window timing.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the instrumenter notified of breaker events.
    pub fn instrumenter(mut self, instrumenter: Arc<dyn Instrumenter>) -> Self {
        self.instrumenter = instrumenter;
        self
    }

    /// Builds the circuit breaker.
    pub fn build(self) -> CircuitBreaker {
        let config = self.config.unwrap_or_else(Config::shared_default);
        let metrics = match self.metrics {
            Some(metrics) => metrics,
            None => {
                let mut metrics =
                    RollingMetrics::from_config(&config).with_clock(Arc::clone(&self.clock));
                if let Some(storage) = self.storage {
                    metrics = metrics.with_storage(storage);
                }
                metrics
            }
        };
        CircuitBreaker::from_parts(config, metrics, self.clock, self.instrumenter)
    }
}
