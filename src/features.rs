//! Feature extraction for the learned admission predictor.
//!
//! Maps an [`Entry`](crate::entry::Entry) to a 7-dimensional normalized
//! feature vector, each component squashed into `[0, 1]` independently so
//! the predictor's weights operate on comparable scales.

use crate::entry::Entry;
use std::fmt::Debug;

/// Number of features the predictor consumes.
pub(crate) const FEATURE_COUNT: usize = 7;

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Population variance of consecutive deltas in a timestamp sequence; `0.0`
/// when fewer than two samples (and so fewer than one delta) are available.
pub(crate) fn delta_variance(timestamps: &std::collections::VecDeque<u64>) -> f64 {
    if timestamps.len() < 2 {
        return 0.0;
    }
    let deltas: Vec<f64> = timestamps
        .iter()
        .zip(timestamps.iter().skip(1))
        .map(|(a, b)| b.saturating_sub(*a) as f64)
        .collect();
    if deltas.is_empty() {
        return 0.0;
    }
    let mean = deltas.iter().sum::<f64>() / deltas.len() as f64;
    deltas.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / deltas.len() as f64
}

/// Extracts and normalizes the 7-feature vector for `entry` as of `now_millis`.
///
/// Time-of-day (feature 5) is derived from `now_millis` — the wall-clock
/// time of the extraction, not from any single field stored on the entry —
/// since the intent is to capture what part of the day an admission decision
/// is happening in, not a property of the entry itself.
pub(crate) fn extract<K, V: Debug>(entry: &Entry<K, V>, now_millis: u64) -> [f64; FEATURE_COUNT] {
    let age_ms = now_millis.saturating_sub(entry.creation_time);
    let idle_ms = now_millis.saturating_sub(entry.last_access_time);
    let age_seconds = (age_ms as f64 / 1000.0).max(0.0);
    let idle_seconds = (idle_ms as f64 / 1000.0).max(0.0);

    let f0 = ((1.0 + entry.access_count as f64).ln()) / 10.0;
    let f1 = idle_seconds / 3600.0;
    let f2 = age_seconds / 86_400.0;
    let f3 = entry.access_count as f64 / age_seconds.max(1.0);
    let f4 = (1.0 + delta_variance(entry.access_timestamps())).ln() / 1000.0;
    let hour_of_day = ((now_millis / 1000 / 3600) % 24) as f64;
    let f5_raw = (std::f64::consts::TAU * hour_of_day / 24.0).sin();
    let value_len = format!("{:?}", entry.value).len();
    let f6 = ((1.0 + value_len as f64).ln()) / 10.0;

    [
        sigmoid(f0),
        sigmoid(f1),
        sigmoid(f2),
        sigmoid(f3),
        sigmoid(f4),
        (f5_raw + 1.0) / 2.0,
        sigmoid(f6),
    ]
}
