//! Core data types for the condo explorer pipeline.

use crate::config::{FilterDefaults, TierConfig};
use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// One untyped source row: a CSV line or a document-store document.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Round to one decimal place, ties to even.
#[inline]
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// One normalized rental listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Building (condominium project) name.
    pub building_name: String,
    /// Monthly rent in THB.
    pub price: Option<f64>,
    /// Latitude in degrees, exactly as sourced.
    pub latitude: f64,
    /// Longitude in degrees, exactly as sourced.
    pub longitude: f64,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    /// Floor area in square meters.
    pub floor_area: Option<f64>,
    /// Review rating, 0-5.
    pub rating: Option<f64>,
    pub agent_name: Option<String>,
    pub agent_phone: Option<String>,
    /// Distance to the nearest rail station in meters.
    pub distance_to_transit: Option<f64>,
    pub address: Option<String>,
}

impl Listing {
    /// Create a listing with only identity, location and price set.
    pub fn new(building_name: impl Into<String>, price: Option<f64>, latitude: f64, longitude: f64) -> Self {
        Self {
            building_name: building_name.into(),
            price,
            latitude,
            longitude,
            bedrooms: None,
            bathrooms: None,
            floor_area: None,
            rating: None,
            agent_name: None,
            agent_phone: None,
            distance_to_transit: None,
            address: None,
        }
    }

    /// Grouping key of the building this listing belongs to.
    pub fn building_key(&self) -> BuildingKey {
        BuildingKey {
            name: self.building_name.clone(),
            latitude: OrderedFloat(self.latitude),
            longitude: OrderedFloat(self.longitude),
        }
    }
}

/// Building identity: name plus unjittered coordinates, compared exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuildingKey {
    pub name: String,
    pub latitude: OrderedFloat<f64>,
    pub longitude: OrderedFloat<f64>,
}

/// Rental price class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PriceTier {
    Low,
    Medium,
    High,
}

impl PriceTier {
    /// All tiers, cheapest first.
    pub const ALL: [PriceTier; 3] = [PriceTier::Low, PriceTier::Medium, PriceTier::High];

    /// Classify a price. Anything below `medium_min`, negatives included, is Low.
    #[inline]
    pub fn from_price(price: f64, tiers: &TierConfig) -> Self {
        if price >= tiers.high_min {
            PriceTier::High
        } else if price >= tiers.medium_min {
            PriceTier::Medium
        } else {
            PriceTier::Low
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            PriceTier::Low => "Low",
            PriceTier::Medium => "Medium",
            PriceTier::High => "High",
        }
    }

    /// Numeric class code (0 = Low, 1 = Medium, 2 = High).
    pub fn code(self) -> u8 {
        match self {
            PriceTier::Low => 0,
            PriceTier::Medium => 1,
            PriceTier::High => 2,
        }
    }

    /// Parse a label, case-insensitively.
    pub fn from_label(label: &str) -> Option<Self> {
        PriceTier::ALL
            .into_iter()
            .find(|tier| tier.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl std::fmt::Display for PriceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A listing with its price tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedListing {
    pub listing: Listing,
    /// None when the listing has no price.
    pub tier: Option<PriceTier>,
}

/// A map marker for one listing. Coordinates are jittered copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub building_name: String,
    pub price: f64,
    pub tier: PriceTier,
    pub latitude: f64,
    pub longitude: f64,
}

/// Aggregate statistics over all listings of one building.
///
/// Float fields are rounded to one decimal place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingSummary {
    pub building_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub avg_price: Option<f64>,
    /// Largest bedroom count among the building's listings.
    pub bedrooms: Option<u32>,
    /// Largest bathroom count among the building's listings.
    pub bathrooms: Option<u32>,
    pub min_area: Option<f64>,
    pub max_area: Option<f64>,
    pub avg_area: Option<f64>,
    pub avg_rating: Option<f64>,
    /// Nearest rail station distance in meters.
    pub transit_distance: Option<f64>,
    /// Number of listings in the group.
    pub listing_count: usize,
}

/// User-selected constraints. `None` means no restriction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    /// Tiers shown on the classification map. An empty list selects nothing.
    pub tiers: Option<Vec<PriceTier>>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_area: Option<f64>,
    pub max_area: Option<f64>,
    pub min_rating: Option<f64>,
}

impl FilterCriteria {
    /// Criteria that restrict nothing.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Initial map page criteria: configured ranges plus the smallest
    /// bedroom and bathroom counts available among `summaries`.
    pub fn page_defaults(defaults: &FilterDefaults, summaries: &[BuildingSummary]) -> Self {
        Self {
            tiers: Some(PriceTier::ALL.to_vec()),
            bedrooms: summaries.iter().filter_map(|s| s.bedrooms).min(),
            bathrooms: summaries.iter().filter_map(|s| s.bathrooms).min(),
            min_price: Some(defaults.min_price),
            max_price: Some(defaults.max_price),
            min_area: Some(defaults.min_area),
            max_area: Some(defaults.max_area),
            min_rating: Some(defaults.min_rating),
        }
    }

    /// Whether a tier passes the tier selection.
    pub fn allows_tier(&self, tier: PriceTier) -> bool {
        self.tiers.as_ref().map_or(true, |tiers| tiers.contains(&tier))
    }
}

/// Listing-level query for the scatter pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingQuery {
    /// Accepted bedroom counts. None accepts all.
    pub bedrooms: Option<Vec<u32>>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

/// Provenance of a loaded snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotInfo {
    pub source_id: String,
    pub loaded_at: DateTime<Utc>,
    pub record_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        let tiers = TierConfig::default();
        assert_eq!(PriceTier::from_price(9_999.99, &tiers), PriceTier::Low);
        assert_eq!(PriceTier::from_price(10_000.0, &tiers), PriceTier::Medium);
        assert_eq!(PriceTier::from_price(19_999.99, &tiers), PriceTier::Medium);
        assert_eq!(PriceTier::from_price(20_000.0, &tiers), PriceTier::High);
    }

    #[test]
    fn test_negative_price_is_low() {
        assert_eq!(PriceTier::from_price(-500.0, &TierConfig::default()), PriceTier::Low);
    }

    #[test]
    fn test_tier_labels() {
        assert_eq!(PriceTier::from_label(" medium "), Some(PriceTier::Medium));
        assert_eq!(PriceTier::from_label("premium"), None);
        assert_eq!(PriceTier::High.to_string(), "High");
        assert_eq!(PriceTier::Low.code(), 0);
    }

    #[test]
    fn test_round_to_tenth() {
        assert_eq!(round_to_tenth(10_000.5), 10_000.5);
        assert_eq!(round_to_tenth(49_000.0 / 3.0), 16_333.3);
        assert_eq!(round_to_tenth(4.25), 4.2);
        assert_eq!(round_to_tenth(4.75), 4.8);
    }

    #[test]
    fn test_building_key_exact_equality() {
        let a = Listing::new("Tower A", Some(9_000.0), 13.7563, 100.5018);
        let b = Listing::new("Tower A", Some(15_000.0), 13.7563, 100.5018);
        let c = Listing::new("Tower A", Some(15_000.0), 13.75631, 100.5018);
        assert_eq!(a.building_key(), b.building_key());
        assert_ne!(a.building_key(), c.building_key());
    }

    #[test]
    fn test_page_defaults_pick_smallest_counts() {
        let mut summary = BuildingSummary {
            building_name: "A".into(),
            latitude: 0.0,
            longitude: 0.0,
            min_price: None,
            max_price: None,
            avg_price: None,
            bedrooms: Some(2),
            bathrooms: Some(2),
            min_area: None,
            max_area: None,
            avg_area: None,
            avg_rating: None,
            transit_distance: None,
            listing_count: 1,
        };
        let mut other = summary.clone();
        other.bedrooms = Some(1);
        summary.bathrooms = None;

        let criteria = FilterCriteria::page_defaults(&FilterDefaults::default(), &[summary, other]);
        assert_eq!(criteria.bedrooms, Some(1));
        assert_eq!(criteria.bathrooms, Some(2));
        assert_eq!(criteria.min_price, Some(10_000.0));
        assert_eq!(criteria.max_area, Some(80.0));
        assert!(criteria.allows_tier(PriceTier::High));
    }

    #[test]
    fn test_empty_tier_selection_allows_nothing() {
        let criteria = FilterCriteria {
            tiers: Some(Vec::new()),
            ..Default::default()
        };
        assert!(PriceTier::ALL.iter().all(|&t| !criteria.allows_tier(t)));
        assert!(FilterCriteria::unrestricted().allows_tier(PriceTier::Low));
    }
}
