//! Marker position jitter.
//!
//! Listings in one building share coordinates, so their markers would stack.
//! Each marker gets a small independent offset per axis. Only the marker copy
//! moves; listings keep their sourced coordinates for grouping.

use condo_core::config::JitterConfig;
use condo_core::{ClassifiedListing, MapPoint};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Applies uniform random offsets to marker coordinates.
pub struct PositionJitterer {
    /// Maximum absolute offset per axis, in degrees.
    magnitude: f64,
    rng: SmallRng,
}

impl PositionJitterer {
    /// Create a jitterer. With a seed the offsets are reproducible. A
    /// non-finite magnitude disables jitter.
    pub fn new(magnitude: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            magnitude: if magnitude.is_finite() { magnitude.abs() } else { 0.0 },
            rng,
        }
    }

    /// Create a jitterer from configuration.
    pub fn from_config(config: &JitterConfig) -> Self {
        Self::new(config.magnitude, config.seed)
    }

    /// Configured magnitude.
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    fn offset(&mut self) -> f64 {
        if self.magnitude == 0.0 {
            return 0.0;
        }
        self.rng.gen_range(-self.magnitude..=self.magnitude)
    }

    /// Jitter one (latitude, longitude) pair.
    pub fn jitter(&mut self, latitude: f64, longitude: f64) -> (f64, f64) {
        let lat = latitude + self.offset();
        let lon = longitude + self.offset();
        (lat, lon)
    }

    /// Build a marker for a classified listing. Unpriced listings get none.
    pub fn place(&mut self, classified: &ClassifiedListing) -> Option<MapPoint> {
        let tier = classified.tier?;
        let price = classified.listing.price?;
        let (latitude, longitude) =
            self.jitter(classified.listing.latitude, classified.listing.longitude);

        Some(MapPoint {
            building_name: classified.listing.building_name.clone(),
            price,
            tier,
            latitude,
            longitude,
        })
    }

    /// Build markers for many listings, preserving order.
    pub fn place_all<'a, I>(&mut self, listings: I) -> Vec<MapPoint>
    where
        I: IntoIterator<Item = &'a ClassifiedListing>,
    {
        listings.into_iter().filter_map(|c| self.place(c)).collect()
    }
}
