//! Lock-free monotone counters and the derived rates computed from them.
//!
//! Every counter is an independent `AtomicU64` so it can be updated from the
//! `get` fast path without the eviction mutex; a derived rate is zero when
//! its denominator is zero rather than `NaN`. Reads are consistent
//! per-counter, not across counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotone counters tracked for the lifetime of a [`crate::Cache`].
#[derive(Debug, Default)]
pub struct Statistics {
    hit_count: AtomicU64,
    miss_count: AtomicU64,
    eviction_count: AtomicU64,
    admission_count: AtomicU64,
    rejection_count: AtomicU64,
    total_access_count: AtomicU64,
    ai_admission_count: AtomicU64,
    frequency_admission_count: AtomicU64,
}

impl Statistics {
    pub(crate) fn new() -> Self {
        Statistics::default()
    }

    pub(crate) fn record_hit(&self) {
        self.hit_count.fetch_add(1, Ordering::Relaxed);
        self.total_access_count.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.miss_count.fetch_add(1, Ordering::Relaxed);
        self.total_access_count.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_eviction(&self) {
        self.eviction_count.fetch_add(1, Ordering::Relaxed);
    }

    /// `ai_decision` is whether the predictor, rather than the sketch alone,
    /// was the deciding influence on this admission.
    pub(crate) fn record_admission(&self, ai_decision: bool) {
        self.admission_count.fetch_add(1, Ordering::Relaxed);
        if ai_decision {
            self.ai_admission_count.fetch_add(1, Ordering::Relaxed);
        } else {
            self.frequency_admission_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_rejection(&self) {
        self.rejection_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Resets every counter to zero. An administrative operation for
    /// long-running services that want periodic reporting windows; it does
    /// not affect cache contents or eviction behavior.
    pub fn reset(&self) {
        self.hit_count.store(0, Ordering::Relaxed);
        self.miss_count.store(0, Ordering::Relaxed);
        self.eviction_count.store(0, Ordering::Relaxed);
        self.admission_count.store(0, Ordering::Relaxed);
        self.rejection_count.store(0, Ordering::Relaxed);
        self.total_access_count.store(0, Ordering::Relaxed);
        self.ai_admission_count.store(0, Ordering::Relaxed);
        self.frequency_admission_count.store(0, Ordering::Relaxed);
    }

    /// Materializes a consistent-enough snapshot for reporting. Individual
    /// counters are read independently, so the snapshot may not be
    /// internally consistent under concurrent mutation: each field is
    /// accurate on its own, but two fields read a moment apart may not
    /// reflect the same instant.
    pub fn snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot {
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            eviction_count: self.eviction_count.load(Ordering::Relaxed),
            admission_count: self.admission_count.load(Ordering::Relaxed),
            rejection_count: self.rejection_count.load(Ordering::Relaxed),
            total_access_count: self.total_access_count.load(Ordering::Relaxed),
            ai_admission_count: self.ai_admission_count.load(Ordering::Relaxed),
            frequency_admission_count: self.frequency_admission_count.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time read of every counter in [`Statistics`], plus derived
/// rates computed from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatisticsSnapshot {
    /// Number of `get` calls that found a resident key.
    pub hit_count: u64,
    /// Number of `get` calls on an absent key.
    pub miss_count: u64,
    /// Number of entries discarded from the main segment, whether admitted
    /// over an existing resident or rejected outright.
    pub eviction_count: u64,
    /// Number of window candidates admitted into probationary.
    pub admission_count: u64,
    /// Number of window candidates discarded without ever entering the main
    /// segment.
    pub rejection_count: u64,
    /// Total `get` calls, hit or miss.
    pub total_access_count: u64,
    /// Number of admissions decided by the predictor rather than the
    /// frequency sketch alone.
    pub ai_admission_count: u64,
    /// Number of admissions decided by the frequency sketch alone.
    pub frequency_admission_count: u64,
}

impl StatisticsSnapshot {
    /// `hits / (hits + misses)`, or `0.0` when no accesses have occurred.
    pub fn hit_rate(&self) -> f64 {
        let denom = self.hit_count + self.miss_count;
        if denom == 0 {
            0.0
        } else {
            self.hit_count as f64 / denom as f64
        }
    }

    /// `admissions / (admissions + rejections)`, or `0.0` when neither has
    /// happened yet.
    pub fn admission_rate(&self) -> f64 {
        let denom = self.admission_count + self.rejection_count;
        if denom == 0 {
            0.0
        } else {
            self.admission_count as f64 / denom as f64
        }
    }

    /// `ai_admissions / admissions`, or `0.0` when nothing has been admitted.
    pub fn ai_influence_rate(&self) -> f64 {
        if self.admission_count == 0 {
            0.0
        } else {
            self.ai_admission_count as f64 / self.admission_count as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_are_zero_with_no_activity() {
        let stats = Statistics::new();
        let snap = stats.snapshot();
        assert_eq!(snap.hit_rate(), 0.0);
        assert_eq!(snap.admission_rate(), 0.0);
        assert_eq!(snap.ai_influence_rate(), 0.0);
    }

    #[test]
    fn hit_rate_reflects_recorded_hits_and_misses() {
        let stats = Statistics::new();
        stats.record_hit();
        stats.record_miss();
        let snap = stats.snapshot();
        assert_eq!(snap.hit_count, 1);
        assert_eq!(snap.miss_count, 1);
        assert_eq!(snap.total_access_count, 2);
        assert_eq!(snap.hit_rate(), 0.5);
    }

    #[test]
    fn admission_and_ai_influence_rates_track_the_right_counters() {
        let stats = Statistics::new();
        stats.record_admission(true);
        stats.record_admission(false);
        stats.record_rejection();
        let snap = stats.snapshot();
        assert_eq!(snap.admission_count, 2);
        assert_eq!(snap.rejection_count, 1);
        assert!((snap.admission_rate() - (2.0 / 3.0)).abs() < 1e-9);
        assert_eq!(snap.ai_influence_rate(), 0.5);
    }

    #[test]
    fn reset_zeroes_every_counter() {
        let stats = Statistics::new();
        stats.record_hit();
        stats.record_eviction();
        stats.reset();
        let snap = stats.snapshot();
        assert_eq!(snap.hit_count, 0);
        assert_eq!(snap.eviction_count, 0);
    }
}
