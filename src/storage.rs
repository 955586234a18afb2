//! Pluggable counter storage backing the rolling metrics.

use ahash::AHashMap;
use parking_lot::Mutex;
use smallvec::SmallVec;

/// The two counters kept per bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    /// Successful outcomes reported by the caller.
    Success,
    /// Failed outcomes reported by the caller.
    Failure,
}

/// Storage contract for per-bucket success/failure counters.
///
/// [`RollingMetrics`](crate::RollingMetrics) owns the windowing logic; a
/// backend only stores counters keyed by bucket slot, together with the
/// start-timestamp the slot currently represents. Buckets from a previous
/// window cycle are never swept eagerly: the metrics layer detects a stale
/// start-timestamp and asks the backend to reset the slot before reuse.
///
/// The in-process default is [`MemoryStorage`]. A deployment that needs
/// counters shared across processes supplies a different backend (for
/// example one backed by an external store with atomic increments); the
/// breaker and metrics logic are unchanged by the substitution. Backend
/// failures are the backend's concern; this contract has no error channel
/// because the reference backend cannot fail.
pub trait MetricsStorage: Send + Sync {
    /// Increments a counter for the bucket at `slot`, creating the slot if
    /// it does not exist yet.
    fn increment(&self, slot: usize, counter: Counter);

    /// Current value of a counter at `slot`. Returns 0 for a slot that was
    /// never written or has been cleared.
    fn read(&self, slot: usize, counter: Counter) -> u64;

    /// The start-timestamp stored at `slot`, if the slot holds a bucket.
    fn bucket_start(&self, slot: usize) -> Option<u64>;

    /// Resets `slot` to an empty bucket beginning at `start`, zeroing both
    /// counters.
    fn reset_bucket(&self, slot: usize, start: u64);

    /// Every currently stored slot with its start-timestamp. Includes stale
    /// slots; liveness is judged by the caller.
    fn live_slots(&self) -> SmallVec<[(usize, u64); 16]>;

    /// Drops all stored state. Used by reset.
    fn clear(&self);
}

#[derive(Debug, Default, Clone, Copy)]
struct Bucket {
    start: u64,
    successes: u64,
    failures: u64,
}

/// In-memory counter storage, the default backend.
///
/// A plain slot-indexed map behind a mutex: increments are serialized, so
/// concurrent marks from multiple threads are never lost. Nothing is shared
/// across processes.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    buckets: Mutex<AHashMap<usize, Bucket>>,
}

impl MemoryStorage {
    /// Creates an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetricsStorage for MemoryStorage {
    fn increment(&self, slot: usize, counter: Counter) {
        let mut buckets = self.buckets.lock();
        let bucket = buckets.entry(slot).or_default();
        match counter {
            Counter::Success => bucket.successes += 1,
            Counter::Failure => bucket.failures += 1,
        }
    }

    fn read(&self, slot: usize, counter: Counter) -> u64 {
        let buckets = self.buckets.lock();
        match buckets.get(&slot) {
            Some(bucket) => match counter {
                Counter::Success => bucket.successes,
                Counter::Failure => bucket.failures,
            },
            None => 0,
        }
    }

    fn bucket_start(&self, slot: usize) -> Option<u64> {
        self.buckets.lock().get(&slot).map(|bucket| bucket.start)
    }

    fn reset_bucket(&self, slot: usize, start: u64) {
        let mut buckets = self.buckets.lock();
        buckets.insert(
            slot,
            Bucket {
                start,
                successes: 0,
                failures: 0,
            },
        );
    }

    fn live_slots(&self) -> SmallVec<[(usize, u64); 16]> {
        self.buckets
            .lock()
            .iter()
            .map(|(slot, bucket)| (*slot, bucket.start))
            .collect()
    }

    fn clear(&self) {
        self.buckets.lock().clear();
    }
}
