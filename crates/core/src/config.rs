//! Configuration structures for the condo explorer pipeline.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Longest accepted snapshot TTL: 30 days.
pub const MAX_CACHE_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Main configuration for the dashboard pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source column names.
    pub fields: FieldMapping,
    /// Normalization configuration.
    pub normalize: NormalizeConfig,
    /// Price tier thresholds.
    pub tiers: TierConfig,
    /// Marker jitter configuration.
    pub jitter: JitterConfig,
    /// Snapshot cache configuration.
    pub cache: CacheConfig,
    /// Initial values for the map page filter widgets.
    pub filter: FilterDefaults,
    /// Chart configuration.
    pub charts: ChartConfig,
}

impl Config {
    /// Parse a configuration from a JSON string. Missing sections take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check that the numeric settings are usable.
    pub fn validate(&self) -> Result<()> {
        let cap = self.normalize.price_cap;
        if !cap.is_finite() || cap < 0.0 {
            return Err(Error::config(format!("price_cap must be finite and >= 0, got {cap}")));
        }

        let TierConfig { medium_min, high_min } = self.tiers;
        if !medium_min.is_finite() || !high_min.is_finite() || medium_min > high_min {
            return Err(Error::config(format!(
                "tier thresholds must be finite with medium_min <= high_min, got {medium_min} / {high_min}"
            )));
        }

        let magnitude = self.jitter.magnitude;
        if !magnitude.is_finite() || magnitude < 0.0 {
            return Err(Error::config(format!(
                "jitter magnitude must be finite and >= 0, got {magnitude}"
            )));
        }

        let ttl = self.cache.ttl_seconds;
        if ttl > MAX_CACHE_TTL_SECONDS {
            return Err(Error::config(format!(
                "cache ttl_seconds must be at most {MAX_CACHE_TTL_SECONDS}, got {ttl}"
            )));
        }

        if self.charts.price_histogram_bins == 0 || self.charts.column_histogram_bins == 0 {
            return Err(Error::config("histogram bin counts must be positive"));
        }

        Ok(())
    }
}

/// Column names of the listing source.
///
/// Defaults match the cleaned Bangkok rental dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    pub building_name: String,
    pub price: String,
    pub latitude: String,
    pub longitude: String,
    pub bedrooms: String,
    pub bathrooms: String,
    pub floor_area: String,
    pub rating: String,
    pub agent_name: String,
    pub agent_phone: String,
    pub distance_to_transit: String,
    pub address: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            building_name: "new_condo_name".to_string(),
            price: "rent_cd_price".to_string(),
            latitude: "latitude".to_string(),
            longitude: "longitude".to_string(),
            bedrooms: "rent_cd_bed".to_string(),
            bathrooms: "rent_cd_bath".to_string(),
            floor_area: "rent_cd_floorarea".to_string(),
            rating: "star".to_string(),
            agent_name: "rent_cd_agent".to_string(),
            agent_phone: "rent_cd_tel".to_string(),
            distance_to_transit: "near_rail_meter".to_string(),
            address: "rent_cd_address".to_string(),
        }
    }
}

/// Record normalization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Listings priced above this (THB) are discarded as outliers.
    pub price_cap: f64,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            price_cap: 1_000_000.0,
        }
    }
}

/// Price tier thresholds (THB). Each bound is inclusive on its own tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    /// Lowest price classified as Medium.
    pub medium_min: f64,
    /// Lowest price classified as High.
    pub high_min: f64,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            medium_min: 10_000.0,
            high_min: 20_000.0,
        }
    }
}

/// Marker jitter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JitterConfig {
    /// Maximum absolute offset per axis, in degrees.
    pub magnitude: f64,
    /// Fixed seed for reproducible marker placement.
    pub seed: Option<u64>,
}

impl Default for JitterConfig {
    fn default() -> Self {
        Self {
            magnitude: 0.0001,
            seed: None,
        }
    }
}

/// Snapshot cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds before a cached snapshot is reloaded.
    pub ttl_seconds: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_seconds: 600 }
    }
}

/// Initial filter widget values on the map page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterDefaults {
    pub min_price: f64,
    pub max_price: f64,
    pub min_area: f64,
    pub max_area: f64,
    pub min_rating: f64,
}

impl Default for FilterDefaults {
    fn default() -> Self {
        Self {
            min_price: 10_000.0,
            max_price: 30_000.0,
            min_area: 25.0,
            max_area: 80.0,
            min_rating: 4.0,
        }
    }
}

/// Chart configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Bins in the landing page price distribution.
    pub price_histogram_bins: usize,
    /// Bins in the per-column histogram on the analysis page.
    pub column_histogram_bins: usize,
    /// Rows in the dataset preview table.
    pub preview_rows: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            price_histogram_bins: 40,
            column_histogram_bins: 30,
            preview_rows: 5,
        }
    }
}
