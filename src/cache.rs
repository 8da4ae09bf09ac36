//! The W-TinyLFU cache core: window admission, segmented main, and the
//! single mutex that serializes every mutation.
//!
//! A fully faithful concurrency model would keep the lookup table lock-free
//! for reads and only take a lock around segment-list mutation, with sketch
//! increments happening outside that lock entirely. Reusing raw pointers
//! between three segment lists under partial lock-freedom is exactly the
//! kind of code that's easy to get subtly wrong, so this cache instead uses
//! one `parking_lot::Mutex<CacheCore<K, V, S>>` guarding the table, arena,
//! segment lists, sketch and predictor together, acquired once per
//! `get`/`put`/`remove`/`clear`: a single implicit shard around everything
//! the eviction path touches, the same "one mutex per logical unit" shape a
//! sharded concurrent cache uses per shard. [`crate::statistics::Statistics`]
//! stays outside the mutex as independent atomics, matching the "consistent
//! per-counter, not cross-counter" statistics contract while simplifying
//! everything the mutex covers. Noted as a deliberate simplification, not an
//! oversight.

use crate::admission::should_admit;
use crate::config::CacheConfig;
use crate::entry::{AccessPattern, Entry, Segment};
use crate::list::{Arena, SegmentList};
use crate::predictor::Predictor;
use crate::sketch::Sketch;
use crate::statistics::{Statistics, StatisticsSnapshot};
use parking_lot::Mutex;
use std::borrow::Borrow;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the Unix epoch")
        .as_millis() as u64
}

struct CacheCore<K, V, S> {
    arena: Arena<K, V>,
    table: HashMap<K, usize, S>,
    window: SegmentList,
    probationary: SegmentList,
    protected: SegmentList,
    sketch: Sketch,
    predictor: Predictor,
}

/// A thread-safe Window TinyLFU cache with an optional learned admission
/// layer.
///
/// `S` is the hash-builder type, defaulting to `hashbrown`'s (or, without
/// the `hashbrown` feature, `std`'s `RandomState`), the same
/// default-hasher-as-type-parameter shape `hashbrown::HashMap` itself uses.
pub struct Cache<K, V, S = DefaultHashBuilder> {
    config: CacheConfig,
    statistics: Statistics,
    core: Mutex<CacheCore<K, V, S>>,
}

impl<K, V, S> Debug for Cache<K, V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("config", &self.config)
            .field("statistics", &self.statistics.snapshot())
            .finish()
    }
}

impl<K: Hash + Eq + Clone, V: Clone + Debug, S: Default + std::hash::BuildHasher> Cache<K, V, S> {
    /// Builds an empty cache from a validated [`CacheConfig`], using `S`'s
    /// `Default` hasher.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_hasher(config, S::default())
    }
}

impl<K: Hash + Eq + Clone, V: Clone + Debug, S: std::hash::BuildHasher> Cache<K, V, S> {
    /// Builds an empty cache from a validated [`CacheConfig`] with an
    /// explicit hasher.
    pub fn with_hasher(config: CacheConfig, hasher: S) -> Self {
        tracing::debug!(
            maximum_size = config.maximum_size(),
            window_size = config.window_size(),
            probationary_size = config.probationary_size(),
            protected_size = config.protected_size(),
            enable_ai = config.enable_ai(),
            "constructing cache"
        );
        let core = CacheCore {
            arena: Arena::with_capacity(config.maximum_size()),
            table: HashMap::with_hasher(hasher),
            window: SegmentList::new(config.window_size(), Segment::Window),
            probationary: SegmentList::new(config.probationary_size(), Segment::Probationary),
            protected: SegmentList::new(config.protected_size(), Segment::Protected),
            sketch: Sketch::new(config.maximum_size()),
            predictor: Predictor::new(config.max_training_examples(), config.learning_rate()),
        };
        Cache {
            config,
            statistics: Statistics::new(),
            core: Mutex::new(core),
        }
    }

    /// The configuration this cache was built from.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Maximum number of resident entries, i.e. `config().maximum_size()`.
    pub fn capacity(&self) -> usize {
        self.config.maximum_size()
    }

    /// Number of entries currently resident.
    pub fn size(&self) -> usize {
        self.core.lock().table.len()
    }

    /// Read-only access to the lifetime counters.
    pub fn statistics(&self) -> StatisticsSnapshot {
        self.statistics.snapshot()
    }

    /// Zeroes every counter in [`Self::statistics`] without touching cache
    /// contents.
    pub fn reset_statistics(&self) {
        self.statistics.reset();
    }

    /// The access pattern the predictor most recently classified `key` as,
    /// or `None` if `key` is not resident. Read-only: does not affect
    /// admission or eviction.
    pub fn pattern_of<Q>(&self, key: &Q) -> Option<AccessPattern>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let core = self.core.lock();
        let slot = *core.table.get(key)?;
        Some(core.arena.get(slot).pattern)
    }

    /// Whether `key` is currently resident, without affecting recency,
    /// frequency, or statistics.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.core.lock().table.contains_key(key)
    }

    /// Removes every resident entry. The frequency sketch and the predictor
    /// keep their learned state; only cache contents are discarded.
    pub fn clear(&self) {
        let mut core = self.core.lock();
        core.arena.clear();
        core.window.clear();
        core.probationary.clear();
        core.protected.clear();
        core.table.clear();
    }

    /// Looks up `key`, recording a hit or miss, reordering the entry's
    /// segment, and training the predictor on a hit.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = now_millis();
        let mut core = self.core.lock();

        let slot = match core.table.get(key) {
            Some(&slot) => slot,
            None => {
                drop(core);
                self.statistics.record_miss();
                return None;
            }
        };

        core.sketch.increment(key);

        let CacheCore {
            arena,
            window,
            probationary,
            protected,
            predictor,
            ..
        } = &mut *core;

        let entry = arena.get_mut(slot);
        entry.record_access(now);
        predictor.record_access(entry, now, true);
        let value = entry.value.clone();
        let segment = entry.segment;

        match segment {
            Segment::Window => window.move_to_tail(arena, slot),
            Segment::Protected => protected.move_to_tail(arena, slot),
            Segment::Probationary => {
                Self::promote(arena, probationary, protected, slot);
            }
        }

        drop(core);
        self.statistics.record_hit();
        Some(value)
    }

    /// Moves `slot` (currently in `probationary`) into `protected`,
    /// swapping out `protected`'s LRU to `probationary` if `protected` is
    /// already at capacity. A no-op promotion when `protected`'s capacity is
    /// zero: the entry just moves to the tail of `probationary` instead.
    fn promote(
        arena: &mut Arena<K, V>,
        probationary: &mut SegmentList,
        protected: &mut SegmentList,
        slot: usize,
    ) {
        if protected.cap() == 0 {
            probationary.move_to_tail(arena, slot);
            return;
        }
        probationary.remove(arena, slot);
        if protected.len() >= protected.cap() {
            if let Some(demoted) = protected.remove_first(arena) {
                probationary.add(arena, demoted);
            }
        }
        protected.add(arena, slot);
    }

    /// Inserts or overwrites `key`. Returns the previous value, if any.
    pub fn put(&self, key: K, value: V) -> Option<V> {
        let now = now_millis();
        let mut core = self.core.lock();
        core.sketch.increment(&key);

        if let Some(&slot) = core.table.get(&key) {
            let CacheCore {
                arena,
                window,
                probationary,
                protected,
                ..
            } = &mut *core;
            let entry = arena.get_mut(slot);
            let old = entry.value.clone();
            entry.overwrite(value, now);
            let segment = entry.segment;
            match segment {
                Segment::Window => window.move_to_tail(arena, slot),
                Segment::Protected => protected.move_to_tail(arena, slot),
                Segment::Probationary => Self::promote(arena, probationary, protected, slot),
            }
            return Some(old);
        }

        let entry = Entry::new(key.clone(), value, now, self.config.feature_history_size());
        let slot = core.arena.insert(entry);
        core.table.insert(key, slot);
        core.window.add(&mut core.arena, slot);

        if core.window.len() > core.window.cap() {
            self.evict_and_admit(&mut core, now);
        }

        if core
            .sketch
            .should_reset(10 * self.config.maximum_size().max(1) as u64)
        {
            core.sketch.reset();
        }

        None
    }

    /// Called whenever a fresh insert has pushed the window one past its
    /// cap. Pops the window's LRU as a candidate for the main segment,
    /// compares it against probationary's LRU via the admission policy, and
    /// either promotes it into probationary (demoting probationary's own LRU
    /// first if probationary is itself at capacity) or discards it outright.
    /// Evicts at most one main-segment entry per `put`, since the window can
    /// only ever be one entry over its cap at the point this runs.
    fn evict_and_admit(&self, core: &mut CacheCore<K, V, S>, now: u64) {
        let window_victim_slot = match core.window.first() {
            Some(slot) => slot,
            None => return,
        };

        let victim_slot = core.probationary.first();
        let admit = match victim_slot {
            None => true,
            Some(victim_slot) => {
                let (candidate, victim) =
                    core.arena.split_pair_mut(window_victim_slot, victim_slot);
                should_admit(
                    candidate,
                    Some(victim),
                    &core.sketch,
                    &core.predictor,
                    self.config.enable_ai(),
                    now,
                    self.config.ai_weight(),
                )
            }
        };

        core.window.remove(&mut core.arena, window_victim_slot);

        if admit {
            if core.probationary.len() >= core.probationary.cap() {
                if let Some(head) = core.probationary.remove_first(&mut core.arena) {
                    let removed = core.arena.remove(head);
                    core.table.remove(&removed.key);
                    self.statistics.record_eviction();
                }
            }
            core.probationary.add(&mut core.arena, window_victim_slot);
            tracing::trace!("admitted window candidate into probationary segment");
            self.statistics
                .record_admission(core.predictor.confidence() > 0.5);
        } else {
            let removed = core.arena.remove(window_victim_slot);
            core.table.remove(&removed.key);
            tracing::trace!("rejected window candidate");
            self.statistics.record_rejection();
            self.statistics.record_eviction();
        }
    }

    /// Removes `key`, returning its value if it was resident.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut core = self.core.lock();
        let slot = core.table.remove(key)?;
        let segment = core.arena.get(slot).segment;
        match segment {
            Segment::Window => core.window.remove(&mut core.arena, slot),
            Segment::Probationary => core.probationary.remove(&mut core.arena, slot),
            Segment::Protected => core.protected.remove(&mut core.arena, slot),
        }
        Some(core.arena.remove(slot).value)
    }
}
