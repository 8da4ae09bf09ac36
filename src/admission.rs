//! The hybrid admission policy: sketch frequency blended with a learned
//! per-entry score, arbitrated by pattern-specific multipliers.
//!
//! Follows the classic sampled-victim admission shape (estimate the
//! candidate, estimate the victim, compare, evict or reject), generalized
//! from a single frequency comparison to a two-tier frequency/learned-score
//! blend.

use crate::entry::{AccessPattern, Entry};
use crate::predictor::{classify_pattern, Predictor};
use crate::sketch::Sketch;
use std::fmt::Debug;
use std::hash::Hash;

fn pattern_multiplier(pattern: AccessPattern) -> f64 {
    match pattern {
        AccessPattern::SequentialScan => 0.5,
        AccessPattern::HotSpot => 1.3,
        AccessPattern::Temporal => 1.1,
        AccessPattern::WorkingSet => 1.2,
        AccessPattern::Random | AccessPattern::Unknown => 1.0,
    }
}

/// Decides whether `candidate` (the window head) should displace `victim`
/// (the probationary head). `victim` is `None` only when probationary is
/// empty, in which case admission is unconditional.
///
/// Mutates `candidate.predicted_value`/`pattern` and, when present,
/// `victim.predicted_value`/`pattern` as a side effect of the AI path —
/// these are read back by callers that want to know why an admission
/// decision went the way it did (see `Cache::pattern_of`).
pub(crate) fn should_admit<K: Hash, V: Debug>(
    candidate: &mut Entry<K, V>,
    victim: Option<&mut Entry<K, V>>,
    sketch: &Sketch,
    predictor: &Predictor,
    enable_ai: bool,
    now_millis: u64,
    ai_weight: f64,
) -> bool {
    let victim = match victim {
        Some(v) => v,
        None => return true,
    };

    let cf = (sketch.estimate(&candidate.key) as f64 / 15.0).clamp(0.0, 1.0);
    let vf = (sketch.estimate(&victim.key) as f64 / 15.0).clamp(0.0, 1.0);

    if !enable_ai || predictor.get_confidence() < 0.3 {
        return cf > vf;
    }

    let cv_raw = predictor.predict(candidate, now_millis);
    let vv_raw = predictor.predict(victim, now_millis);
    let candidate_pattern = classify_pattern(candidate, now_millis);
    let victim_pattern = classify_pattern(victim, now_millis);

    let cv = (cv_raw * pattern_multiplier(candidate_pattern)).min(1.0);
    let vv = (vv_raw * pattern_multiplier(victim_pattern)).min(1.0);

    let cand_score = ai_weight * cv + (1.0 - ai_weight) * cf;
    let victim_score = ai_weight * vv + (1.0 - ai_weight) * vf;

    candidate.pattern = candidate_pattern;
    victim.pattern = victim_pattern;
    candidate.predicted_value = cv;
    victim.predicted_value = vv;

    cand_score > victim_score
}
