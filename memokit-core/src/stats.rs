//! Per-accessor counters.
//!
//! Incremented on every read of a memoized accessor, so they are plain
//! `AtomicU64`s with relaxed ordering: no lock on the hot path.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters owned by one memoized accessor.
#[derive(Debug)]
pub(crate) struct MemoCounters {
    computations: AtomicU64,
    hits: AtomicU64,
    failures: AtomicU64,
}

impl MemoCounters {
    pub(crate) const fn new() -> Self {
        Self {
            computations: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    pub(crate) fn record_computation(&self) {
        self.computations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> MemoStats {
        MemoStats {
            computations: self.computations.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of an accessor's counters, summed over every
/// instance it has been read on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoStats {
    /// Computations that ran and stored a value.
    pub computations: u64,
    /// Reads served from a stored value.
    pub hits: u64,
    /// Computations that returned an error (nothing stored).
    pub failures: u64,
}

impl MemoStats {
    /// Fraction of successful reads served from cache, 0.0 when unused.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.computations;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
