//! Error types surfaced by the core.
//!
//! Configuration validation at build time is the only recoverable error
//! kind; everything else (`get` misses, internal invariant violations) is
//! either a non-error return value or a test-time panic. `thiserror` gives
//! each failure mode its own variant and message, rather than a single
//! stringly-typed error.

use thiserror::Error;

/// Raised by [`crate::CacheConfigBuilder::build`] when a parameter is out of
/// its documented range.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum CacheConfigError {
    /// `maximum_size` was zero.
    #[error("maximum_size must be greater than zero")]
    InvalidMaximumSize,

    /// `window_size` was zero.
    #[error("window_size must be greater than zero")]
    InvalidWindowSize,

    /// `window_size` was larger than `maximum_size`.
    #[error("window_size ({window_size}) must not exceed maximum_size ({maximum_size})")]
    WindowSizeExceedsMaximum {
        /// The offending window size.
        window_size: usize,
        /// The maximum size it exceeded.
        maximum_size: usize,
    },

    /// `feature_history_size` was zero.
    #[error("feature_history_size must be greater than zero")]
    InvalidFeatureHistorySize,

    /// `ai_weight` fell outside `[0, 1]`.
    #[error("ai_weight must be in [0, 1], got {0}")]
    InvalidAiWeight(f64),

    /// `max_training_examples` was zero.
    #[error("max_training_examples must be greater than zero")]
    InvalidMaxTrainingExamples,

    /// `learning_rate` fell outside `(0, 1]`.
    #[error("learning_rate must be in (0, 1], got {0}")]
    InvalidLearningRate(f64),
}
