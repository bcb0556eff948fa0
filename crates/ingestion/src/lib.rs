//! Data ingestion and normalization for the condo explorer pipeline.
//!
//! This crate handles:
//! - Loading raw listing records (CSV, document exports, in-memory)
//! - Snapshot caching keyed by source identity
//! - Record normalization into typed listings
//! - Price tier classification
//! - Marker position jitter

pub mod cache;
pub mod classifier;
pub mod jitter;
pub mod normalizer;
pub mod source;

pub use cache::{CacheStats, Snapshot, SnapshotCache};
pub use classifier::{PriceClassifier, TierStats};
pub use jitter::PositionJitterer;
pub use normalizer::{NormalizationStats, RecordNormalizer};
pub use source::{CsvFileSource, InMemorySource, JsonDocumentSource, RecordSource};
