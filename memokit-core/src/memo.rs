//! Instance-scoped memoization.
//!
//! Two ways to give an instance a cache slot:
//!
//! - [`Memo<T>`]: a field on the instance holding one lazily computed value.
//! - [`MemoSlots`] + [`MemoHost`]: a field holding any number of slots, read
//!   through [`Memoized`] / [`TryMemoized`] accessors built with [`memoize`]
//!   and [`try_memoize`]. The cache is keyed by (instance, [`MemoKey`]), where
//!   the key names the computation rather than the accessor value: building
//!   an accessor again from the same closure reuses the same slot.
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use memokit_core::{MemoHost, MemoSlots, Memoized, memoize};
//!
//! #[derive(Default)]
//! struct Report {
//!     loads: AtomicUsize,
//!     memo: MemoSlots,
//! }
//!
//! impl MemoHost for Report {
//!     fn memo_slots(&self) -> &MemoSlots {
//!         &self.memo
//!     }
//! }
//!
//! impl Report {
//!     fn load_total(&self) -> u64 {
//!         self.loads.fetch_add(1, Ordering::SeqCst);
//!         42
//!     }
//!
//!     fn total(&self) -> u64 {
//!         static TOTAL: Memoized<Report, u64, fn(&Report) -> u64> =
//!             memoize("total", Report::load_total);
//!         TOTAL.get(self)
//!     }
//! }
//!
//! let report = Report::default();
//! assert_eq!(report.total(), 42);
//! assert_eq!(report.total(), 42);
//! assert_eq!(report.loads.load(Ordering::SeqCst), 1);
//! ```
//!
//! ## Concurrency
//!
//! Slots are `once_cell::sync::OnceCell`s: concurrent first readers of the
//! same slot block until the single computation finishes, then all observe
//! its value. The slot table lock is released before computing, so one
//! accessor's computation may read other accessors on the same instance.
//! A computation must not read its own accessor on the same instance; that
//! deadlocks.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::stats::{MemoCounters, MemoStats};

// ---------------------------------------------------------------------------
// Single-slot field
// ---------------------------------------------------------------------------

/// A single cache slot owned by an instance.
///
/// Holds at most one value for its whole lifetime. A failed
/// [`Memo::get_or_try_init`] leaves it empty.
#[derive(Debug, Clone)]
pub struct Memo<T> {
    cell: OnceCell<T>,
}

impl<T> Memo<T> {
    /// An empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self { cell: OnceCell::new() }
    }

    /// Return the stored value, computing it with `f` on first access.
    pub fn get_or_init<F>(&self, f: F) -> &T
    where
        F: FnOnce() -> T,
    {
        self.cell.get_or_init(f)
    }

    /// Return the stored value, computing it with `f` on first access.
    ///
    /// # Errors
    /// Returns `f`'s error unchanged. Nothing is stored, so the next call
    /// runs `f` again.
    pub fn get_or_try_init<F, E>(&self, f: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.cell.get_or_try_init(f)
    }

    /// The stored value, if it has been computed.
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    /// Whether a value has been stored.
    #[must_use]
    pub fn is_computed(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Consume the slot, returning the stored value if any.
    #[must_use]
    pub fn into_inner(self) -> Option<T> {
        self.cell.into_inner()
    }
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Slot table
// ---------------------------------------------------------------------------

/// Identity of one memoized computation.
///
/// Made of the computation's type, the type of the value stored in the slot
/// and the accessor's name. Every closure and function item has a type of
/// its own, so the number of keys a host can accumulate is bounded by the
/// computations written in the program, however many accessors are built
/// from them. Accessors stored as function pointers (`fn(&H) -> T`) share
/// one type and are told apart by `name` alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoKey {
    computation: TypeId,
    value: TypeId,
    name: &'static str,
}

impl MemoKey {
    /// The key for computation type `F` storing values of type `T`.
    #[must_use]
    pub fn of<F: 'static, T: 'static>(name: &'static str) -> Self {
        Self {
            computation: TypeId::of::<F>(),
            value: TypeId::of::<T>(),
            name,
        }
    }

    /// The accessor name this key was built from.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for MemoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "memo:{}", self.name)
    }
}

type Slot = Arc<dyn Any + Send + Sync>;

/// Per-instance side table of cache slots, one per accessor.
///
/// Embed it as a field and expose it through [`MemoHost`]. Slots are created
/// on first read and live until the table is dropped or [`MemoSlots::clear`]ed.
#[derive(Default)]
pub struct MemoSlots {
    slots: Mutex<HashMap<MemoKey, Slot>>,
}

impl MemoSlots {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The slot for `key`, created empty on first use.
    ///
    /// Only the table lookup happens under the lock; callers compute into the
    /// returned cell after it is released.
    fn slot<T>(&self, key: MemoKey) -> Arc<OnceCell<T>>
    where
        T: Send + Sync + 'static,
    {
        let mut slots = self.slots.lock();
        let entry = slots
            .entry(key)
            .or_insert_with(|| Arc::new(OnceCell::<T>::new()) as Slot);

        // The key carries the value type, so every slot under it holds `T`.
        debug_assert!(
            (**entry).is::<OnceCell<T>>(),
            "memo slot {key} holds a different value type"
        );
        match Arc::clone(entry).downcast::<OnceCell<T>>() {
            Ok(cell) => cell,
            Err(_) => {
                let cell = Arc::new(OnceCell::<T>::new());
                *entry = Arc::clone(&cell) as Slot;
                cell
            }
        }
    }

    /// The slot for `key` if one of type `T` exists, without creating it.
    fn existing<T>(&self, key: MemoKey) -> Option<Arc<OnceCell<T>>>
    where
        T: Send + Sync + 'static,
    {
        let slots = self.slots.lock();
        let slot = Arc::clone(slots.get(&key)?);
        slot.downcast::<OnceCell<T>>().ok()
    }

    /// Number of slots created so far (computed or in flight).
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Whether no accessor has been read on this instance yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }

    /// Drop every slot. The next read of each accessor recomputes.
    pub fn clear(&self) {
        self.slots.lock().clear();
    }
}

impl fmt::Debug for MemoSlots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoSlots").field("slots", &self.len()).finish()
    }
}

/// An instance that owns a [`MemoSlots`] table.
pub trait MemoHost {
    /// The instance's slot table.
    fn memo_slots(&self) -> &MemoSlots;
}

impl MemoHost for MemoSlots {
    fn memo_slots(&self) -> &MemoSlots {
        self
    }
}

// ---------------------------------------------------------------------------
// Accessors
// ---------------------------------------------------------------------------

/// A memoized zero-argument method: `compute` runs at most once per host.
///
/// Built with [`memoize`]. Usually stored in a `static` next to the method it
/// serves.
pub struct Memoized<H, T, F> {
    name: &'static str,
    compute: F,
    counters: MemoCounters,
    _marker: PhantomData<fn(&H) -> T>,
}

/// Wrap `compute` into a per-instance memoized accessor.
///
/// `name` appears in logs and is part of the slot's [`MemoKey`]. Accessors
/// built from the same closure or function item with the same `name` share
/// one slot per host. Give accessors typed as function pointers distinct
/// names when they serve the same host type.
pub const fn memoize<H, T, F>(name: &'static str, compute: F) -> Memoized<H, T, F>
where
    H: MemoHost,
    T: Clone + Send + Sync + 'static,
    F: Fn(&H) -> T,
{
    Memoized {
        name,
        compute,
        counters: MemoCounters::new(),
        _marker: PhantomData,
    }
}

impl<H, T, F> Memoized<H, T, F>
where
    H: MemoHost,
    T: Clone + Send + Sync + 'static,
    F: Fn(&H) -> T + 'static,
{
    /// This accessor's slot key.
    #[must_use]
    pub fn key(&self) -> MemoKey {
        MemoKey::of::<F, T>(self.name)
    }

    /// Read the accessor on `host`, computing on the first read only.
    pub fn get(&self, host: &H) -> T {
        let cell = host.memo_slots().slot::<T>(self.key());
        let mut computed = false;
        let value = cell.get_or_init(|| {
            computed = true;
            debug!(memo = self.name, "computing memoized value");
            (self.compute)(host)
        });

        if computed {
            self.counters.record_computation();
        } else {
            self.counters.record_hit();
            trace!(memo = self.name, "memoized value served from cache");
        }
        value.clone()
    }

    /// Whether `host` already holds a value for this accessor.
    #[must_use]
    pub fn is_cached(&self, host: &H) -> bool {
        host.memo_slots()
            .existing::<T>(self.key())
            .is_some_and(|cell| cell.get().is_some())
    }
}

impl<H, T, F> Memoized<H, T, F> {
    /// The name given to [`memoize`].
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Counters summed over every host this accessor has been read on.
    #[must_use]
    pub fn stats(&self) -> MemoStats {
        self.counters.snapshot()
    }
}

impl<H, T, F> fmt::Debug for Memoized<H, T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("name", &self.name)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

/// A memoized fallible method: successes are stored, failures are not.
///
/// Built with [`try_memoize`].
pub struct TryMemoized<H, T, E, F> {
    name: &'static str,
    compute: F,
    counters: MemoCounters,
    _marker: PhantomData<fn(&H) -> Result<T, E>>,
}

/// Wrap a fallible `compute` into a per-instance memoized accessor.
///
/// An `Err` is returned to the caller and leaves the slot empty, so the next
/// read retries.
pub const fn try_memoize<H, T, E, F>(name: &'static str, compute: F) -> TryMemoized<H, T, E, F>
where
    H: MemoHost,
    T: Clone + Send + Sync + 'static,
    F: Fn(&H) -> Result<T, E>,
{
    TryMemoized {
        name,
        compute,
        counters: MemoCounters::new(),
        _marker: PhantomData,
    }
}

impl<H, T, E, F> TryMemoized<H, T, E, F>
where
    H: MemoHost,
    T: Clone + Send + Sync + 'static,
    F: Fn(&H) -> Result<T, E> + 'static,
{
    /// This accessor's slot key.
    #[must_use]
    pub fn key(&self) -> MemoKey {
        MemoKey::of::<F, T>(self.name)
    }

    /// Read the accessor on `host`, computing until one attempt succeeds.
    ///
    /// # Errors
    /// Returns the computation's error unchanged.
    pub fn try_get(&self, host: &H) -> Result<T, E> {
        let cell = host.memo_slots().slot::<T>(self.key());
        let mut computed = false;
        let result = cell.get_or_try_init(|| {
            computed = true;
            debug!(memo = self.name, "computing memoized value");
            (self.compute)(host)
        });

        match result {
            Ok(value) => {
                if computed {
                    self.counters.record_computation();
                } else {
                    self.counters.record_hit();
                    trace!(memo = self.name, "memoized value served from cache");
                }
                Ok(value.clone())
            }
            Err(err) => {
                self.counters.record_failure();
                warn!(memo = self.name, "memoized computation failed, slot left empty");
                Err(err)
            }
        }
    }

    /// Whether `host` already holds a value for this accessor.
    #[must_use]
    pub fn is_cached(&self, host: &H) -> bool {
        host.memo_slots()
            .existing::<T>(self.key())
            .is_some_and(|cell| cell.get().is_some())
    }
}

impl<H, T, E, F> TryMemoized<H, T, E, F> {
    /// The name given to [`try_memoize`].
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Counters summed over every host this accessor has been read on.
    #[must_use]
    pub fn stats(&self) -> MemoStats {
        self.counters.snapshot()
    }
}

impl<H, T, E, F> fmt::Debug for TryMemoized<H, T, E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryMemoized")
            .field("name", &self.name)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Barrier;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Default)]
    struct Sample {
        compute_calls: AtomicUsize,
        memo: MemoSlots,
    }

    impl MemoHost for Sample {
        fn memo_slots(&self) -> &MemoSlots {
            &self.memo
        }
    }

    impl Sample {
        fn compute_value(&self) -> i32 {
            self.compute_calls.fetch_add(1, Ordering::SeqCst);
            42
        }

        fn calls(&self) -> usize {
            self.compute_calls.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn computes_once_and_returns_same_value() {
        let cached = memoize("cached_property", Sample::compute_value);
        let instance = Sample::default();

        assert_eq!(cached.get(&instance), 42);
        assert_eq!(cached.get(&instance), 42);
        assert_eq!(instance.calls(), 1);

        let stats = cached.stats();
        assert_eq!(stats.computations, 1);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn instances_are_isolated() {
        let cached = memoize("cached_property", Sample::compute_value);
        let first = Sample::default();
        let second = Sample::default();

        cached.get(&first);
        assert!(cached.is_cached(&first));
        assert!(!cached.is_cached(&second));

        cached.get(&second);
        cached.get(&second);
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 1);
    }

    #[test]
    fn distinct_accessors_have_distinct_slots() {
        let a = memoize("a", Sample::compute_value);
        let b = memoize("b", |s: &Sample| s.compute_value() + 1);
        let instance = Sample::default();

        assert_eq!(a.get(&instance), 42);
        assert_eq!(b.get(&instance), 43);
        assert_eq!(instance.calls(), 2);
        assert_eq!(instance.memo.len(), 2);
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn static_accessor_behaves_like_a_method() {
        static CACHED: Memoized<Sample, i32, fn(&Sample) -> i32> =
            memoize("cached_property", Sample::compute_value);

        let instance = Sample::default();
        for _ in 0..5 {
            assert_eq!(CACHED.get(&instance), 42);
        }
        assert_eq!(instance.calls(), 1);
        assert_eq!(CACHED.name(), "cached_property");
    }

    #[test]
    fn failure_is_not_cached_and_retries() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&attempts);
        let flaky = try_memoize("flaky", move |_: &Sample| {
            if counted.fetch_add(1, Ordering::SeqCst) == 0 {
                Err("transient")
            } else {
                Ok(7_u32)
            }
        });
        let instance = Sample::default();

        assert_eq!(flaky.try_get(&instance), Err("transient"));
        assert!(!flaky.is_cached(&instance));
        assert_eq!(flaky.try_get(&instance), Ok(7));
        assert_eq!(flaky.try_get(&instance), Ok(7));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);

        let stats = flaky.stats();
        assert_eq!(stats, MemoStats { computations: 1, hits: 1, failures: 1 });
    }

    #[test]
    fn nested_accessors_on_same_host() {
        static BASE: Memoized<Sample, i32, fn(&Sample) -> i32> = memoize("base", Sample::compute_value);
        let doubled = memoize("doubled", |s: &Sample| BASE.get(s) * 2);
        let instance = Sample::default();

        assert_eq!(doubled.get(&instance), 84);
        assert_eq!(BASE.get(&instance), 42);
        assert_eq!(instance.calls(), 1);
    }

    #[test]
    fn concurrent_first_reads_compute_once() {
        const THREADS: usize = 8;
        let cached = memoize("slow", |s: &Sample| {
            std::thread::sleep(std::time::Duration::from_millis(20));
            s.compute_value()
        });
        let instance = Sample::default();
        let barrier = Barrier::new(THREADS);

        std::thread::scope(|scope| {
            for _ in 0..THREADS {
                scope.spawn(|| {
                    barrier.wait();
                    assert_eq!(cached.get(&instance), 42);
                });
            }
        });

        assert_eq!(instance.calls(), 1);
        assert_eq!(cached.stats().computations, 1);
        assert_eq!(cached.stats().hits, (THREADS - 1) as u64);
    }

    #[test]
    fn clear_forces_recompute() {
        let cached = memoize("cached_property", Sample::compute_value);
        let instance = Sample::default();

        cached.get(&instance);
        instance.memo.clear();
        assert!(instance.memo.is_empty());
        cached.get(&instance);
        assert_eq!(instance.calls(), 2);
    }

    #[test]
    fn memo_field_computes_once() {
        let memo: Memo<String> = Memo::new();
        let mut calls = 0;

        assert!(!memo.is_computed());
        let first = memo.get_or_init(|| {
            calls += 1;
            "value".to_string()
        });
        assert_eq!(first, "value");
        let second = memo.get_or_init(|| {
            calls += 1;
            "other".to_string()
        });
        assert_eq!(second, "value");
        assert_eq!(calls, 1);
        assert_eq!(memo.into_inner().as_deref(), Some("value"));
    }

    #[test]
    fn memo_field_failure_leaves_slot_empty() {
        let memo: Memo<u8> = Memo::default();

        let err = memo.get_or_try_init(|| Err::<u8, _>("boom")).expect_err("should fail");
        assert_eq!(err, "boom");
        assert!(memo.get().is_none());

        assert_eq!(memo.get_or_try_init(|| Ok::<_, &str>(3)), Ok(&3));
        assert_eq!(memo.get(), Some(&3));
    }

    #[test]
    fn slots_as_their_own_host() {
        let cached = memoize("plain", |_: &MemoSlots| vec![1, 2, 3]);
        let slots = MemoSlots::new();

        assert_eq!(cached.get(&slots), vec![1, 2, 3]);
        assert_eq!(slots.len(), 1);
        assert!(format!("{slots:?}").contains("slots: 1"));
    }

    #[test]
    fn rebuilt_accessors_reuse_one_slot() {
        let instance = Sample::default();

        for _ in 0..1000 {
            let cached = memoize("cached_property", |s: &Sample| s.compute_value());
            assert_eq!(cached.get(&instance), 42);
        }
        assert_eq!(instance.memo.len(), 1);
        assert_eq!(instance.calls(), 1);
    }

    #[test]
    fn function_pointer_accessors_are_told_apart_by_name() {
        static FIRST: Memoized<Sample, i32, fn(&Sample) -> i32> = memoize("first", Sample::compute_value);
        static SECOND: Memoized<Sample, i32, fn(&Sample) -> i32> =
            memoize("second", |s: &Sample| s.compute_value() + 1);
        let instance = Sample::default();

        assert_eq!(FIRST.get(&instance), 42);
        assert_eq!(SECOND.get(&instance), 43);
        assert_eq!(instance.memo.len(), 2);
        assert_ne!(FIRST.key(), SECOND.key());
    }

    #[test]
    fn plain_and_fallible_accessors_over_one_closure_keep_separate_slots() {
        fn parse(_: &Sample) -> Result<u32, String> {
            Ok(5)
        }
        let plain = memoize("parse", parse);
        let fallible = try_memoize("parse", parse);
        let instance = Sample::default();

        assert_eq!(plain.get(&instance), Ok(5));
        assert_eq!(fallible.try_get(&instance), Ok(5));
        assert_eq!(instance.memo.len(), 2);
        assert_ne!(plain.key(), fallible.key());
        assert_eq!(plain.key().to_string(), "memo:parse");
    }
}
