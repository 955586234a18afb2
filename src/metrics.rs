//! Sliding-window success/failure aggregation.

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::storage::{Counter, MemoryStorage, MetricsStorage};

/// Success/failure counts over a trailing time window, bucketed for O(1)
/// recording and O(number_of_buckets) aggregation.
///
/// The window is a fixed-size circular array of buckets kept in a
/// [`MetricsStorage`] backend. Each bucket covers `bucket_size_in_seconds`
/// of wall-clock time and remembers the start-timestamp it currently
/// represents. Eviction is lazy: a slot whose stored start no longer matches
/// the start the current window assigns to it is stale, reads as zero, and
/// is overwritten in place the next time a mark lands on it. No background
/// sweep, no unbounded growth.
pub struct RollingMetrics {
    storage: Box<dyn MetricsStorage>,
    clock: Arc<dyn Clock>,
    number_of_buckets: u64,
    bucket_size_in_seconds: u64,
}

impl Default for RollingMetrics {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl RollingMetrics {
    /// Creates rolling metrics sized from `config`, backed by in-memory
    /// storage and the system clock.
    pub fn from_config(config: &Config) -> Self {
        Self {
            storage: Box::new(MemoryStorage::new()),
            clock: Arc::new(SystemClock),
            number_of_buckets: config.number_of_buckets(),
            bucket_size_in_seconds: config.bucket_size_in_seconds(),
        }
    }

    /// Replaces the storage backend.
    pub fn with_storage(mut self, storage: Box<dyn MetricsStorage>) -> Self {
        self.storage = storage;
        self
    }

    /// Replaces the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Records one success in the bucket covering the current time.
    pub fn mark_success(&self) {
        self.mark(Counter::Success);
    }

    /// Records one failure in the bucket covering the current time.
    pub fn mark_failure(&self) {
        self.mark(Counter::Failure);
    }

    fn mark(&self, counter: Counter) {
        let period = self.clock.now() / self.bucket_size_in_seconds;
        let slot = (period % self.number_of_buckets) as usize;
        let expected_start = period * self.bucket_size_in_seconds;

        // A mismatched start means the slot still holds a previous cycle's
        // bucket; overwrite it before counting.
        if self.storage.bucket_start(slot) != Some(expected_start) {
            self.storage.reset_bucket(slot, expected_start);
        }
        self.storage.increment(slot, counter);
    }

    /// Successes recorded within the trailing window.
    pub fn successes(&self) -> u64 {
        self.sum(Counter::Success)
    }

    /// Failures recorded within the trailing window.
    pub fn failures(&self) -> u64 {
        self.sum(Counter::Failure)
    }

    /// Total requests recorded within the trailing window.
    pub fn requests(&self) -> u64 {
        let now = self.clock.now();
        self.sum_at(Counter::Success, now) + self.sum_at(Counter::Failure, now)
    }

    /// Failure rate over the window as a whole percentage, 0 when the
    /// window is empty. Rounds to the nearest integer, halves up: 1 failure
    /// in 2 requests is exactly 50, 1 in 200 is 1.
    pub fn error_percentage(&self) -> u8 {
        let now = self.clock.now();
        let failures = self.sum_at(Counter::Failure, now);
        let requests = self.sum_at(Counter::Success, now) + failures;
        if requests == 0 {
            return 0;
        }
        ((200 * failures + requests) / (2 * requests)) as u8
    }

    /// Clears all recorded history; every aggregate reads 0 until new
    /// marks arrive.
    pub fn reset(&self) {
        self.storage.clear();
    }

    fn sum(&self, counter: Counter) -> u64 {
        self.sum_at(counter, self.clock.now())
    }

    fn sum_at(&self, counter: Counter, now: u64) -> u64 {
        self.storage
            .live_slots()
            .into_iter()
            .filter(|&(slot, start)| self.expected_start_for(slot, now) == Some(start))
            .map(|(slot, _)| self.storage.read(slot, counter))
            .sum()
    }

    /// The start-timestamp the current window assigns to `slot`: the most
    /// recent bucket period at or before `now` that maps onto that slot.
    /// `None` when no such period exists yet (clock close to zero).
    fn expected_start_for(&self, slot: usize, now: u64) -> Option<u64> {
        let current_period = now / self.bucket_size_in_seconds;
        let current_slot = current_period % self.number_of_buckets;
        let offset = (current_slot + self.number_of_buckets - slot as u64) % self.number_of_buckets;
        let period = current_period.checked_sub(offset)?;
        Some(period * self.bucket_size_in_seconds)
    }
}
