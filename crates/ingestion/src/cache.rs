//! Snapshot cache keyed by source identity.
//!
//! A page view loads its source through the cache so repeated views within a
//! session skip the read. Entries expire after a TTL and can be dropped by
//! hand for a manual refresh. Failed loads never touch the cache.

use crate::source::RecordSource;
use chrono::{DateTime, Duration, Utc};
use condo_core::config::CacheConfig;
use condo_core::{RawRecord, Result, SnapshotInfo};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A loaded, shareable snapshot.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub records: Arc<Vec<RawRecord>>,
    pub info: SnapshotInfo,
}

/// Cache hit/miss counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    /// Loads triggered by an absent entry.
    pub misses: u64,
    /// Loads triggered by an expired entry.
    pub expired: u64,
    pub failed_loads: u64,
}

/// Snapshot cache with time-based expiry.
pub struct SnapshotCache {
    ttl: Duration,
    entries: HashMap<String, Snapshot>,
    stats: CacheStats,
}

impl SnapshotCache {
    /// Create a cache. A TTL of zero or less reloads on every request; one
    /// beyond chrono's range never expires.
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            ttl: Duration::try_seconds(ttl_seconds.max(0)).unwrap_or(Duration::MAX),
            entries: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// Create a cache from configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.ttl_seconds)
    }

    /// Return the cached snapshot for `source`, loading it if absent or stale.
    pub fn get_or_load<S: RecordSource + ?Sized>(&mut self, source: &S) -> Result<Snapshot> {
        self.get_or_load_at(source, Utc::now())
    }

    /// Same as [`get_or_load`](Self::get_or_load) with an explicit clock.
    pub fn get_or_load_at<S: RecordSource + ?Sized>(
        &mut self,
        source: &S,
        now: DateTime<Utc>,
    ) -> Result<Snapshot> {
        let source_id = source.source_id();

        match self.entries.get(&source_id) {
            Some(entry) if now - entry.info.loaded_at < self.ttl => {
                self.stats.hits += 1;
                debug!(source = %source_id, "snapshot cache hit");
                return Ok(entry.clone());
            }
            Some(_) => self.stats.expired += 1,
            None => self.stats.misses += 1,
        }

        let records = match source.load() {
            Ok(records) => records,
            Err(e) => {
                self.stats.failed_loads += 1;
                warn!(source = %source_id, error = %e, "snapshot load failed");
                return Err(e);
            }
        };

        let snapshot = Snapshot {
            info: SnapshotInfo {
                source_id: source_id.clone(),
                loaded_at: now,
                record_count: records.len(),
            },
            records: Arc::new(records),
        };
        info!(source = %source_id, records = snapshot.info.record_count, "snapshot loaded");
        self.entries.insert(source_id, snapshot.clone());
        Ok(snapshot)
    }

    /// Drop one source's snapshot. Returns whether an entry existed.
    pub fn invalidate(&mut self, source_id: &str) -> bool {
        self.entries.remove(source_id).is_some()
    }

    /// Drop every snapshot.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}
