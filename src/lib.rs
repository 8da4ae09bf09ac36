//! A thread-safe, in-memory Window TinyLFU (W-TinyLFU) cache with an
//! optional learned admission layer.
//!
//! Resident keys live in one of three segments: a small LRU **window**,
//! and a **main** segment split into **probationary** and **protected**
//! sub-lists. New keys always enter the window; when the window overflows,
//! its LRU entry competes for a slot in probationary against probationary's
//! own LRU, arbitrated by an approximate frequency oracle (a 4-bit
//! Count-Min Sketch) and, optionally, an online-trained linear predictor
//! over per-entry access features. Entries hit twice in probationary are
//! promoted to protected.
//!
//! ```rust
//! use tinylfu_cache::{Cache, CacheConfig};
//!
//! let config = CacheConfig::builder()
//!     .maximum_size(10_000)
//!     .build()
//!     .unwrap();
//! let cache: Cache<String, Vec<u8>> = Cache::new(config);
//!
//! cache.put("a".to_string(), vec![1, 2, 3]);
//! assert_eq!(cache.get("a"), Some(vec![1, 2, 3]));
//! ```
//!
//! ## Modules
//!
//! - [`cache`]: the [`Cache`] core tying entries, segment lists, sketch,
//!   predictor and statistics together behind a single mutex.
//! - [`config`]: validated, immutable cache configuration
//!   ([`CacheConfig`]/[`CacheConfigBuilder`]).
//! - [`error`]: configuration validation errors ([`CacheConfigError`]).
//! - [`statistics`]: lock-free lifetime counters and their derived rates
//!   ([`Statistics`]/[`StatisticsSnapshot`]).
//!
//! The entry bookkeeping, arena/segment lists, frequency sketch, feature
//! extractor, predictor and admission policy are internal infrastructure
//! and not part of the public API.

#[cfg(test)]
extern crate scoped_threadpool;

pub(crate) mod admission;
pub mod cache;
pub mod config;
pub(crate) mod entry;
pub mod error;
pub(crate) mod features;
pub(crate) mod list;
pub(crate) mod predictor;
pub(crate) mod sketch;
pub mod statistics;

pub use cache::Cache;
pub use config::{CacheConfig, CacheConfigBuilder};
pub use entry::AccessPattern;
pub use error::CacheConfigError;
pub use statistics::{Statistics, StatisticsSnapshot};
