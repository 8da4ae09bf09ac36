//! Cache entry type and the bookkeeping each resident key carries.
//!
//! Every key admitted into the cache owns exactly one [`Entry`], which tracks
//! access metadata used by the frequency sketch, the feature extractor and
//! the segment lists. An `Entry` belongs to exactly one segment list at a
//! time; `prev`/`next` are reused as that entry moves between segments
//! rather than allocating a fresh link on every promotion.

use std::collections::VecDeque;

/// Which segment list currently holds an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment {
    Window,
    Probationary,
    Protected,
}

/// Coarse access-pattern classification produced by the predictor.
///
/// Patterns are advisory: the admission policy must remain correct if this
/// is always [`AccessPattern::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessPattern {
    /// High, steady access rate with low inter-access variance.
    HotSpot,
    /// Moderate access rate with high inter-access variance.
    Temporal,
    /// Very few accesses, seen only recently.
    SequentialScan,
    /// Access rate consistent with a bounded working set.
    WorkingSet,
    /// No discernible pattern.
    Random,
    /// Not yet classified.
    #[default]
    Unknown,
}

/// A single resident key/value pair plus the metadata the admission policy
/// and predictor need.
///
/// `prev`/`next` are slot indices into the cache's entry arena, not pointers:
/// see [`crate::list`] for why an index-addressed arena stands in for the
/// intrusive pointer list the policy describes.
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) access_count: u64,
    pub(crate) creation_time: u64,
    pub(crate) last_access_time: u64,
    pub(crate) write_time: u64,
    access_timestamps: VecDeque<u64>,
    feature_history_size: usize,
    pub(crate) predicted_value: f64,
    pub(crate) pattern: AccessPattern,
    pub(crate) segment: Segment,
    pub(crate) prev: Option<usize>,
    pub(crate) next: Option<usize>,
}

impl<K, V> Entry<K, V> {
    pub(crate) fn new(key: K, value: V, now_millis: u64, feature_history_size: usize) -> Self {
        let mut access_timestamps = VecDeque::with_capacity(feature_history_size.max(1));
        access_timestamps.push_back(now_millis);
        Entry {
            key,
            value,
            access_count: 1,
            creation_time: now_millis,
            last_access_time: now_millis,
            write_time: now_millis,
            access_timestamps,
            feature_history_size: feature_history_size.max(1),
            predicted_value: 0.0,
            pattern: AccessPattern::Unknown,
            segment: Segment::Window,
            prev: None,
            next: None,
        }
    }

    /// Records a `get` hit or a `put` on an already-resident key: bumps
    /// `access_count`, `last_access_time`, and the access-timestamp ring.
    pub(crate) fn record_access(&mut self, now_millis: u64) {
        self.access_count += 1;
        self.last_access_time = now_millis;
        if self.access_timestamps.len() >= self.feature_history_size {
            self.access_timestamps.pop_front();
        }
        self.access_timestamps.push_back(now_millis);
    }

    /// Overwrites the value on a `put` to an existing key: sets
    /// `write_time = last_access_time = now` and records `now` in the
    /// access-timestamp ring so its last element keeps tracking
    /// `last_access_time`.
    pub(crate) fn overwrite(&mut self, value: V, now_millis: u64) {
        self.value = value;
        self.write_time = now_millis;
        self.last_access_time = now_millis;
        if self.access_timestamps.len() >= self.feature_history_size {
            self.access_timestamps.pop_front();
        }
        self.access_timestamps.push_back(now_millis);
    }

    pub(crate) fn access_timestamps(&self) -> &VecDeque<u64> {
        &self.access_timestamps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entry_seeds_a_single_timestamp() {
        let e: Entry<&str, i32> = Entry::new("k", 1, 1_000, 4);
        assert_eq!(e.access_count, 1);
        assert_eq!(e.creation_time, 1_000);
        assert_eq!(e.last_access_time, 1_000);
        assert_eq!(e.access_timestamps().len(), 1);
    }

    #[test]
    fn record_access_drops_oldest_beyond_history_size() {
        let mut e: Entry<&str, i32> = Entry::new("k", 1, 0, 2);
        e.record_access(10);
        e.record_access(20);
        assert_eq!(e.access_timestamps().len(), 2);
        assert_eq!(*e.access_timestamps().front().unwrap(), 10);
        assert_eq!(*e.access_timestamps().back().unwrap(), 20);
    }

    #[test]
    fn overwrite_updates_write_and_access_time_together() {
        let mut e: Entry<&str, i32> = Entry::new("k", 1, 0, 4);
        e.overwrite(2, 50);
        assert_eq!(e.value, 2);
        assert_eq!(e.write_time, 50);
        assert_eq!(e.last_access_time, 50);
        assert!(e.creation_time <= e.write_time);
        assert_eq!(*e.access_timestamps().back().unwrap(), 50);
    }

    #[test]
    fn overwrite_respects_the_history_size_bound() {
        let mut e: Entry<&str, i32> = Entry::new("k", 1, 0, 2);
        e.overwrite(2, 10);
        e.overwrite(3, 20);
        assert_eq!(e.access_timestamps().len(), 2);
        assert_eq!(*e.access_timestamps().back().unwrap(), 20);
    }
}
