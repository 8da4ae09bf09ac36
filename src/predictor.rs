//! Online linear predictor and heuristic pattern classifier.
//!
//! `score = σ(⟨w, x⟩)`, trained by one gradient-descent epoch over a bounded
//! FIFO of recent `(features, hit)` examples every time enough new examples
//! have accumulated. This is the learned half of the admission policy in
//! [`crate::admission`]; the sketch-only half never needs it.

use crate::entry::{AccessPattern, Entry};
use crate::features::{delta_variance, FEATURE_COUNT};
use rand::Rng;
use std::collections::VecDeque;
use std::fmt::Debug;

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn dot(weights: &[f64; FEATURE_COUNT], features: &[f64; FEATURE_COUNT]) -> f64 {
    weights.iter().zip(features.iter()).map(|(w, x)| w * x).sum()
}

/// An online-trained linear model scoring how likely an entry is to be
/// accessed again.
pub(crate) struct Predictor {
    weights: [f64; FEATURE_COUNT],
    buffer: VecDeque<([f64; FEATURE_COUNT], u8)>,
    max_training_examples: usize,
    learning_rate: f64,
    training_count: u64,
    confidence: f64,
}

impl Predictor {
    pub(crate) fn new(max_training_examples: usize, learning_rate: f64) -> Self {
        let mut rng = rand::thread_rng();
        let mut weights = [0.0; FEATURE_COUNT];
        for w in &mut weights {
            *w = rng.gen_range(-0.05..=0.05);
        }
        Predictor {
            weights,
            buffer: VecDeque::with_capacity(max_training_examples.min(4096)),
            max_training_examples,
            learning_rate,
            training_count: 0,
            confidence: 0.0,
        }
    }

    /// `predict_future_value`: extract, normalize, dot with weights, sigmoid.
    /// Side-effect-free.
    pub(crate) fn predict<K, V: Debug>(&self, entry: &Entry<K, V>, now_millis: u64) -> f64 {
        let features = crate::features::extract(entry, now_millis);
        sigmoid(dot(&self.weights, &features))
    }

    /// Appends a training example, dropping the oldest once the buffer
    /// exceeds `max_training_examples`, then trains if enough fresh examples
    /// have accumulated.
    pub(crate) fn record_access<K, V: Debug>(
        &mut self,
        entry: &Entry<K, V>,
        now_millis: u64,
        hit: bool,
    ) {
        let features = crate::features::extract(entry, now_millis);
        if self.buffer.len() >= self.max_training_examples {
            self.buffer.pop_front();
        }
        self.buffer.push_back((features, u8::from(hit)));

        let threshold = (self.max_training_examples / 10).min(100);
        if self.buffer.len() >= threshold {
            self.train();
        }
    }

    /// One gradient-descent epoch over the entire buffer.
    fn train(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let mut sum_sq_err = 0.0;
        for (x, label) in self.buffer.iter() {
            let p = sigmoid(dot(&self.weights, x));
            let err = *label as f64 - p;
            let g = err * p * (1.0 - p);
            for i in 0..FEATURE_COUNT {
                self.weights[i] += self.learning_rate * g * x[i];
            }
            sum_sq_err += err * err;
        }
        let mse = sum_sq_err / self.buffer.len() as f64;
        self.confidence = (1.0 - mse).max(0.0);
        self.training_count += 1;
    }

    /// Effective confidence: grows only after repeated training epochs, so
    /// a cold predictor cannot outvote the frequency sketch on a lucky MSE.
    pub(crate) fn get_confidence(&self) -> f64 {
        let maturity = (self.training_count as f64 / 100.0).min(1.0);
        self.confidence.min(maturity)
    }

    /// Raw confidence from the last training epoch, unmoderated by maturity.
    pub(crate) fn confidence(&self) -> f64 {
        self.confidence
    }
}

/// Classifies an entry's access pattern from its raw (unnormalized) access
/// rate, age, and inter-access variance. Rules are evaluated in order below;
/// first match wins.
pub(crate) fn classify_pattern<K, V>(entry: &Entry<K, V>, now_millis: u64) -> AccessPattern {
    let age_ms = now_millis.saturating_sub(entry.creation_time);
    let age_seconds = (age_ms as f64 / 1000.0).max(0.0);
    let access_rate = entry.access_count as f64 / age_seconds.max(1.0);
    let variance = delta_variance(entry.access_timestamps());

    if access_rate > 1.0 && variance < 1000.0 {
        AccessPattern::HotSpot
    } else if access_rate > 0.1 && variance > 10_000.0 {
        AccessPattern::Temporal
    } else if entry.access_count <= 2 && age_ms < 60_000 {
        AccessPattern::SequentialScan
    } else if access_rate > 0.01 && access_rate < 1.0 {
        AccessPattern::WorkingSet
    } else {
        AccessPattern::Random
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_is_always_in_unit_interval() {
        let predictor = Predictor::new(1000, 0.01);
        let entry: Entry<&str, i32> = Entry::new("k", 1, 0, 8);
        let score = predictor.predict(&entry, 1_000);
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn confidence_starts_at_zero_and_is_bounded() {
        let predictor = Predictor::new(1000, 0.01);
        assert_eq!(predictor.get_confidence(), 0.0);
    }

    #[test]
    fn confidence_stays_low_until_many_training_epochs_have_run() {
        let mut predictor = Predictor::new(20, 0.05);
        let mut entry: Entry<&str, i32> = Entry::new("k", 1, 0, 8);
        // Each record_access trains once the buffer reaches min(100, 2) = 2 examples,
        // so this runs a handful of epochs, nowhere near the 100 needed for maturity.
        for t in 0..10 {
            entry.record_access(t * 100);
            predictor.record_access(&entry, t * 100, true);
        }
        assert!(predictor.get_confidence() < 0.3);
    }

    #[test]
    fn sequential_scan_classified_for_fresh_rarely_touched_entry() {
        let entry: Entry<&str, i32> = Entry::new("k", 1, 0, 8);
        assert_eq!(classify_pattern(&entry, 1_000), AccessPattern::SequentialScan);
    }

    #[test]
    fn hot_spot_classified_for_frequent_low_variance_entry() {
        let mut entry: Entry<&str, i32> = Entry::new("k", 1, 0, 8);
        for t in (100..=2_000).step_by(100) {
            entry.record_access(t);
        }
        // access_count=20 over age ~2s -> rate well above 1.0, deltas constant -> variance 0.
        assert_eq!(classify_pattern(&entry, 2_000), AccessPattern::HotSpot);
    }
}
