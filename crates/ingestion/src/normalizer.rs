//! Raw record normalization.
//!
//! Turns untyped source rows into typed [`Listing`]s. Rows without usable
//! coordinates or priced above the cap are dropped; every other malformed
//! field becomes `None` and the row is kept.

use condo_core::config::FieldMapping;
use condo_core::{Config, Listing, RawRecord};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

/// Statistics about normalization quality.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizationStats {
    /// Records presented to the normalizer.
    pub records_seen: u64,
    /// Records that became listings.
    pub records_kept: u64,
    /// Records dropped for a missing or unparseable latitude/longitude.
    pub dropped_bad_coordinates: u64,
    /// Records dropped for a price above the cap.
    pub dropped_price_cap: u64,
    /// Present but unparseable non-coordinate fields that were nulled.
    pub fields_nulled: u64,
}

impl NormalizationStats {
    /// Total records dropped.
    pub fn dropped(&self) -> u64 {
        self.dropped_bad_coordinates + self.dropped_price_cap
    }

    /// Reset statistics.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Result of coercing one raw field.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Coerced<T> {
    Missing,
    Invalid,
    Present(T),
}

impl<T> Coerced<T> {
    fn into_option(self, stats: &mut NormalizationStats) -> Option<T> {
        match self {
            Coerced::Present(v) => Some(v),
            Coerced::Invalid => {
                stats.fields_nulled += 1;
                None
            }
            Coerced::Missing => None,
        }
    }
}

/// Coerce a JSON value to a finite number. Strings are trimmed first.
fn coerce_number(value: Option<&Value>) -> Coerced<f64> {
    match value {
        None | Some(Value::Null) => Coerced::Missing,
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v.is_finite() => Coerced::Present(v),
            _ => Coerced::Invalid,
        },
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Coerced::Missing;
            }
            match s.parse::<f64>() {
                Ok(v) if v.is_finite() => Coerced::Present(v),
                _ => Coerced::Invalid,
            }
        }
        Some(_) => Coerced::Invalid,
    }
}

/// Coerce a JSON value to a non-negative whole count (`"2"` and `2.0` both give 2).
fn coerce_count(value: Option<&Value>) -> Coerced<u32> {
    match coerce_number(value) {
        Coerced::Present(v) if v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 => {
            Coerced::Present(v as u32)
        }
        Coerced::Present(_) => Coerced::Invalid,
        Coerced::Missing => Coerced::Missing,
        Coerced::Invalid => Coerced::Invalid,
    }
}

/// Coerce a JSON value to non-empty text. Numbers are rendered as written.
fn coerce_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Normalizer from raw source rows to typed listings.
pub struct RecordNormalizer {
    /// Source column names.
    fields: FieldMapping,
    /// Maximum accepted price (inclusive).
    price_cap: f64,
    /// Normalization statistics.
    stats: NormalizationStats,
}

impl RecordNormalizer {
    /// Create a new normalizer.
    pub fn new(fields: FieldMapping, price_cap: f64) -> Self {
        Self {
            fields,
            price_cap,
            stats: NormalizationStats::default(),
        }
    }

    /// Create a normalizer from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.fields.clone(), config.normalize.price_cap)
    }

    /// Normalize a single record. Returns `None` when the record is dropped.
    pub fn normalize(&mut self, record: &RawRecord) -> Option<Listing> {
        self.stats.records_seen += 1;
        let f = &self.fields;

        let latitude = coerce_number(record.get(&f.latitude));
        let longitude = coerce_number(record.get(&f.longitude));
        let (latitude, longitude) = match (latitude, longitude) {
            (Coerced::Present(lat), Coerced::Present(lon)) => (lat, lon),
            _ => {
                debug!(?latitude, ?longitude, "dropping record without usable coordinates");
                self.stats.dropped_bad_coordinates += 1;
                return None;
            }
        };

        let price = coerce_number(record.get(&f.price)).into_option(&mut self.stats);
        if let Some(p) = price {
            if p > self.price_cap {
                debug!(price = p, cap = self.price_cap, "dropping price outlier");
                self.stats.dropped_price_cap += 1;
                return None;
            }
        }

        let stats = &mut self.stats;
        let listing = Listing {
            building_name: coerce_text(record.get(&f.building_name)).unwrap_or_default(),
            price,
            latitude,
            longitude,
            bedrooms: coerce_count(record.get(&f.bedrooms)).into_option(stats),
            bathrooms: coerce_count(record.get(&f.bathrooms)).into_option(stats),
            floor_area: coerce_number(record.get(&f.floor_area)).into_option(stats),
            rating: coerce_number(record.get(&f.rating)).into_option(stats),
            agent_name: coerce_text(record.get(&f.agent_name)),
            agent_phone: coerce_text(record.get(&f.agent_phone)),
            distance_to_transit: coerce_number(record.get(&f.distance_to_transit)).into_option(stats),
            address: coerce_text(record.get(&f.address)),
        };

        stats.records_kept += 1;
        Some(listing)
    }

    /// Normalize a batch of records, preserving input order.
    pub fn normalize_batch(&mut self, records: &[RawRecord]) -> Vec<Listing> {
        let before = self.stats.clone();
        let listings: Vec<Listing> = records.iter().filter_map(|r| self.normalize(r)).collect();

        info!(
            seen = self.stats.records_seen - before.records_seen,
            kept = listings.len(),
            bad_coordinates = self.stats.dropped_bad_coordinates - before.dropped_bad_coordinates,
            over_cap = self.stats.dropped_price_cap - before.dropped_price_cap,
            "normalized listing batch"
        );
        listings
    }

    /// Get normalization statistics.
    pub fn stats(&self) -> &NormalizationStats {
        &self.stats
    }

    /// Reset statistics.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }
}
