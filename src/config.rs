//! Validated, immutable cache configuration.
//!
//! A config struct is the single entry point for building a cache: required
//! parameters up front, optional parameters as chained setters on a fluent
//! builder, validation deferred to `build()` rather than checked eagerly and
//! panicked on. `build()` returns `Result<CacheConfig, CacheConfigError>`
//! instead of asserting, so an invalid combination of parameters is a
//! recoverable error, not a crash.

use crate::error::CacheConfigError;

const DEFAULT_MAXIMUM_SIZE: usize = 10_000;
const DEFAULT_FEATURE_HISTORY_SIZE: usize = 10;
const DEFAULT_ENABLE_AI: bool = true;
const DEFAULT_AI_WEIGHT: f64 = 0.7;
const DEFAULT_MAX_TRAINING_EXAMPLES: usize = 1_000;
const DEFAULT_LEARNING_RATE: f64 = 0.01;

/// Validated, immutable parameters for a [`crate::Cache`].
///
/// Only constructible via [`CacheConfigBuilder::build`], so every live
/// `CacheConfig` is known-valid by construction — nothing downstream needs
/// to re-check these invariants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheConfig {
    maximum_size: usize,
    window_size: usize,
    probationary_size: usize,
    protected_size: usize,
    feature_history_size: usize,
    enable_ai: bool,
    ai_weight: f64,
    max_training_examples: usize,
    learning_rate: f64,
}

impl CacheConfig {
    /// Starts a new builder with every parameter at its documented default.
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Upper bound on the number of resident entries.
    pub fn maximum_size(&self) -> usize {
        self.maximum_size
    }

    /// Capacity of the admission window, either set explicitly or derived
    /// as `max(1, maximum_size / 100)` at build time.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Capacity of the main segment's probationary sub-list, derived as
    /// `floor((maximum_size - window_size) * 0.2)` at build time.
    pub fn probationary_size(&self) -> usize {
        self.probationary_size
    }

    /// Capacity of the main segment's protected sub-list; whatever remains
    /// of `maximum_size - window_size` after `probationary_size`.
    pub fn protected_size(&self) -> usize {
        self.protected_size
    }

    /// Maximum number of access timestamps retained per entry for feature
    /// extraction.
    pub fn feature_history_size(&self) -> usize {
        self.feature_history_size
    }

    /// Whether the learned predictor takes part in admission decisions.
    pub fn enable_ai(&self) -> bool {
        self.enable_ai
    }

    /// Blend weight given to the predictor's vote against the frequency
    /// sketch's vote when `enable_ai` is set.
    pub fn ai_weight(&self) -> f64 {
        self.ai_weight
    }

    /// Maximum number of labeled examples the predictor retains for
    /// training.
    pub fn max_training_examples(&self) -> usize {
        self.max_training_examples
    }

    /// Step size used when the predictor updates its weights.
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
}

/// Fluent builder for [`CacheConfig`]. Setting `maximum_size` without an
/// explicit `window_size` auto-derives `window_size = max(1, maximum_size /
/// 100)` at `build()` time.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfigBuilder {
    maximum_size: usize,
    window_size: Option<usize>,
    feature_history_size: usize,
    enable_ai: bool,
    ai_weight: f64,
    max_training_examples: usize,
    learning_rate: f64,
}

impl Default for CacheConfigBuilder {
    fn default() -> Self {
        CacheConfigBuilder {
            maximum_size: DEFAULT_MAXIMUM_SIZE,
            window_size: None,
            feature_history_size: DEFAULT_FEATURE_HISTORY_SIZE,
            enable_ai: DEFAULT_ENABLE_AI,
            ai_weight: DEFAULT_AI_WEIGHT,
            max_training_examples: DEFAULT_MAX_TRAINING_EXAMPLES,
            learning_rate: DEFAULT_LEARNING_RATE,
        }
    }
}

impl CacheConfigBuilder {
    /// Sets the upper bound on resident entries.
    pub fn maximum_size(mut self, maximum_size: usize) -> Self {
        self.maximum_size = maximum_size;
        self
    }

    /// Overrides the auto-derived window size.
    pub fn window_size(mut self, window_size: usize) -> Self {
        self.window_size = Some(window_size);
        self
    }

    /// Sets the maximum number of access timestamps retained per entry.
    pub fn feature_history_size(mut self, feature_history_size: usize) -> Self {
        self.feature_history_size = feature_history_size;
        self
    }

    /// Enables or disables the learned predictor's vote in admission.
    pub fn enable_ai(mut self, enable_ai: bool) -> Self {
        self.enable_ai = enable_ai;
        self
    }

    /// Sets the predictor's blend weight against the frequency sketch.
    pub fn ai_weight(mut self, ai_weight: f64) -> Self {
        self.ai_weight = ai_weight;
        self
    }

    /// Sets the maximum number of labeled examples the predictor retains.
    pub fn max_training_examples(mut self, max_training_examples: usize) -> Self {
        self.max_training_examples = max_training_examples;
        self
    }

    /// Sets the predictor's training step size.
    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Validates and finalizes the configuration.
    pub fn build(self) -> Result<CacheConfig, CacheConfigError> {
        if self.maximum_size == 0 {
            return Err(CacheConfigError::InvalidMaximumSize);
        }
        let window_size = self
            .window_size
            .unwrap_or_else(|| (self.maximum_size / 100).max(1));
        if window_size == 0 {
            return Err(CacheConfigError::InvalidWindowSize);
        }
        if window_size > self.maximum_size {
            return Err(CacheConfigError::WindowSizeExceedsMaximum {
                window_size,
                maximum_size: self.maximum_size,
            });
        }
        if self.feature_history_size == 0 {
            return Err(CacheConfigError::InvalidFeatureHistorySize);
        }
        if !(0.0..=1.0).contains(&self.ai_weight) {
            return Err(CacheConfigError::InvalidAiWeight(self.ai_weight));
        }
        if self.max_training_examples == 0 {
            return Err(CacheConfigError::InvalidMaxTrainingExamples);
        }
        if self.learning_rate <= 0.0 || self.learning_rate > 1.0 {
            return Err(CacheConfigError::InvalidLearningRate(self.learning_rate));
        }

        let main_size = self.maximum_size - window_size;
        let probationary_size = ((main_size as f64) * 0.2).floor() as usize;
        let protected_size = main_size - probationary_size;

        Ok(CacheConfig {
            maximum_size: self.maximum_size,
            window_size,
            probationary_size,
            protected_size,
            feature_history_size: self.feature_history_size,
            enable_ai: self.enable_ai,
            ai_weight: self.ai_weight,
            max_training_examples: self.max_training_examples,
            learning_rate: self.learning_rate,
        })
    }
}
