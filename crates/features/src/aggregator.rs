//! Building-level aggregation.
//!
//! Groups listings by exact (name, latitude, longitude) and summarizes each
//! group. Groups come out in first-seen order. Float statistics are rounded
//! to one decimal once, when the summary is produced.

use condo_core::{round_to_tenth, BuildingKey, BuildingSummary, Listing};
use std::collections::HashMap;
use tracing::debug;

/// Min/max/mean over the non-null values of one field.
#[derive(Debug, Clone, Default)]
struct FieldAccumulator {
    min: Option<f64>,
    max: Option<f64>,
    sum: f64,
    count: u64,
}

impl FieldAccumulator {
    fn push(&mut self, value: Option<f64>) {
        let Some(v) = value else { return };
        self.min = Some(self.min.map_or(v, |m| m.min(v)));
        self.max = Some(self.max.map_or(v, |m| m.max(v)));
        self.sum += v;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        if self.count > 0 {
            Some(self.sum / self.count as f64)
        } else {
            None
        }
    }
}

/// A building group being accumulated.
#[derive(Debug, Clone)]
struct GroupInProgress {
    building_name: String,
    latitude: f64,
    longitude: f64,
    price: FieldAccumulator,
    area: FieldAccumulator,
    rating: FieldAccumulator,
    transit: FieldAccumulator,
    bedrooms: Option<u32>,
    bathrooms: Option<u32>,
    listing_count: usize,
}

impl GroupInProgress {
    fn new(listing: &Listing) -> Self {
        Self {
            building_name: listing.building_name.clone(),
            latitude: listing.latitude,
            longitude: listing.longitude,
            price: FieldAccumulator::default(),
            area: FieldAccumulator::default(),
            rating: FieldAccumulator::default(),
            transit: FieldAccumulator::default(),
            bedrooms: None,
            bathrooms: None,
            listing_count: 0,
        }
    }

    fn add(&mut self, listing: &Listing) {
        self.price.push(listing.price);
        self.area.push(listing.floor_area);
        self.rating.push(listing.rating);
        self.transit.push(listing.distance_to_transit);
        self.bedrooms = self.bedrooms.max(listing.bedrooms);
        self.bathrooms = self.bathrooms.max(listing.bathrooms);
        self.listing_count += 1;
    }

    fn to_summary(&self) -> BuildingSummary {
        let round = |v: Option<f64>| v.map(round_to_tenth);
        BuildingSummary {
            building_name: self.building_name.clone(),
            latitude: round_to_tenth(self.latitude),
            longitude: round_to_tenth(self.longitude),
            min_price: round(self.price.min),
            max_price: round(self.price.max),
            avg_price: round(self.price.mean()),
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            min_area: round(self.area.min),
            max_area: round(self.area.max),
            avg_area: round(self.area.mean()),
            avg_rating: round(self.rating.mean()),
            transit_distance: round(self.transit.min),
            listing_count: self.listing_count,
        }
    }
}

/// Groups listings into building summaries.
#[derive(Debug, Default)]
pub struct BuildingAggregator {
    /// Groups in first-seen order.
    groups: Vec<GroupInProgress>,
    /// Position of each key in `groups`.
    index: HashMap<BuildingKey, usize>,
}

impl BuildingAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one listing to its building group.
    pub fn add(&mut self, listing: &Listing) {
        let key = listing.building_key();
        let idx = match self.index.get(&key) {
            Some(&idx) => idx,
            None => {
                self.groups.push(GroupInProgress::new(listing));
                self.index.insert(key, self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        self.groups[idx].add(listing);
    }

    /// Add many listings.
    pub fn add_all<'a, I>(&mut self, listings: I)
    where
        I: IntoIterator<Item = &'a Listing>,
    {
        for listing in listings {
            self.add(listing);
        }
    }

    /// Number of distinct buildings seen.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Produce rounded summaries in first-seen order.
    pub fn summaries(&self) -> Vec<BuildingSummary> {
        self.groups.iter().map(GroupInProgress::to_summary).collect()
    }

    /// Clear all groups.
    pub fn clear(&mut self) {
        self.groups.clear();
        self.index.clear();
    }
}

/// Aggregate listings into one summary per building.
pub fn aggregate(listings: &[Listing]) -> Vec<BuildingSummary> {
    let mut aggregator = BuildingAggregator::new();
    aggregator.add_all(listings);
    debug!(
        listings = listings.len(),
        buildings = aggregator.group_count(),
        "aggregated buildings"
    );
    aggregator.summaries()
}
