//! Filter engine.
//!
//! Applies the conjunction of every active predicate in a
//! [`FilterCriteria`]. Building predicates compare against the rounded
//! summary values. A null value fails any active predicate on it. An empty
//! result is a normal outcome.

use condo_core::{BuildingSummary, ClassifiedListing, FilterCriteria, Listing, ListingQuery};
use std::collections::BTreeSet;
use tracing::debug;

/// Inclusive range check. With neither bound set, anything passes, null included.
fn within(value: Option<f64>, min: Option<f64>, max: Option<f64>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    match value {
        Some(v) => min.map_or(true, |lo| v >= lo) && max.map_or(true, |hi| v <= hi),
        None => false,
    }
}

/// Exact match on an optional count.
fn count_matches(value: Option<u32>, wanted: Option<u32>) -> bool {
    wanted.map_or(true, |w| value == Some(w))
}

/// Criteria-bound filter over listings and building summaries.
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    criteria: FilterCriteria,
}

impl FilterEngine {
    /// Create a filter for the given criteria.
    pub fn new(criteria: FilterCriteria) -> Self {
        Self { criteria }
    }

    /// The active criteria.
    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Whether a listing's tier is selected. Unclassified listings never are.
    pub fn matches_tier(&self, listing: &ClassifiedListing) -> bool {
        listing
            .tier
            .map_or(false, |tier| self.criteria.allows_tier(tier))
    }

    /// Whether a building summary passes every building-level predicate.
    pub fn matches_summary(&self, summary: &BuildingSummary) -> bool {
        let c = &self.criteria;
        count_matches(summary.bedrooms, c.bedrooms)
            && count_matches(summary.bathrooms, c.bathrooms)
            && within(summary.avg_price, c.min_price, c.max_price)
            && within(summary.avg_area, c.min_area, c.max_area)
            && within(summary.avg_rating, c.min_rating, None)
    }

    /// Listings in a selected tier, in input order.
    pub fn apply_tiers<'a>(&self, listings: &'a [ClassifiedListing]) -> Vec<&'a ClassifiedListing> {
        listings.iter().filter(|l| self.matches_tier(l)).collect()
    }

    /// Summaries passing every predicate, in input order.
    pub fn apply(&self, summaries: &[BuildingSummary]) -> Vec<BuildingSummary> {
        let filtered: Vec<BuildingSummary> = summaries
            .iter()
            .filter(|s| self.matches_summary(s))
            .cloned()
            .collect();
        debug!(
            input = summaries.len(),
            matched = filtered.len(),
            "filtered building summaries"
        );
        filtered
    }
}

/// Whether a listing passes a scatter-page query.
pub fn matches_listing(listing: &Listing, query: &ListingQuery) -> bool {
    let bedrooms_ok = match &query.bedrooms {
        Some(accepted) => listing.bedrooms.map_or(false, |b| accepted.contains(&b)),
        None => true,
    };
    bedrooms_ok && within(listing.price, query.min_price, query.max_price)
}

/// Listings passing a scatter-page query, in input order.
pub fn filter_listings<'a>(listings: &'a [Listing], query: &ListingQuery) -> Vec<&'a Listing> {
    listings.iter().filter(|l| matches_listing(l, query)).collect()
}

/// Every listing of the named building, for the detail table.
pub fn listings_for_building<'a>(listings: &'a [Listing], building_name: &str) -> Vec<&'a Listing> {
    listings
        .iter()
        .filter(|l| l.building_name == building_name)
        .collect()
}

/// Distinct building names in first-seen order, for the building picker.
pub fn building_names(listings: &[Listing]) -> Vec<&str> {
    let mut seen = BTreeSet::new();
    listings
        .iter()
        .map(|l| l.building_name.as_str())
        .filter(|name| !name.is_empty() && seen.insert(*name))
        .collect()
}

/// Sorted distinct bedroom counts among summaries.
pub fn bedroom_options(summaries: &[BuildingSummary]) -> Vec<u32> {
    summaries
        .iter()
        .filter_map(|s| s.bedrooms)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted distinct bathroom counts among summaries.
pub fn bathroom_options(summaries: &[BuildingSummary]) -> Vec<u32> {
    summaries
        .iter()
        .filter_map(|s| s.bathrooms)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted distinct bedroom counts among listings, for the scatter multiselect.
pub fn listing_bedroom_options(listings: &[Listing]) -> Vec<u32> {
    listings
        .iter()
        .filter_map(|l| l.bedrooms)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::aggregate;
    use condo_core::config::FilterDefaults;
    use condo_core::PriceTier;

    fn summary(name: &str, avg_price: f64, avg_area: f64, rating: f64, beds: u32, baths: u32) -> BuildingSummary {
        BuildingSummary {
            building_name: name.to_string(),
            latitude: 13.75,
            longitude: 100.52,
            min_price: Some(avg_price),
            max_price: Some(avg_price),
            avg_price: Some(avg_price),
            bedrooms: Some(beds),
            bathrooms: Some(baths),
            min_area: Some(avg_area),
            max_area: Some(avg_area),
            avg_area: Some(avg_area),
            avg_rating: Some(rating),
            transit_distance: None,
            listing_count: 1,
        }
    }

    fn fixture() -> Vec<BuildingSummary> {
        vec![
            summary("Tower A", 16_333.3, 35.0, 4.2, 1, 1),
            summary("Tower B", 28_000.0, 60.0, 4.6, 2, 2),
            summary("Tower C", 9_500.0, 24.0, 3.9, 1, 1),
            summary("Tower D", 45_000.0, 90.0, 4.8, 3, 2),
        ]
    }

    #[test]
    fn test_unrestricted_is_identity() {
        let summaries = fixture();
        let engine = FilterEngine::new(FilterCriteria::unrestricted());
        assert_eq!(engine.apply(&summaries), summaries);
    }

    #[test]
    fn test_widest_ranges_are_identity() {
        let summaries = fixture();
        let engine = FilterEngine::new(FilterCriteria {
            tiers: Some(PriceTier::ALL.to_vec()),
            min_price: Some(f64::NEG_INFINITY),
            max_price: Some(f64::INFINITY),
            min_area: Some(0.0),
            max_area: Some(f64::INFINITY),
            min_rating: Some(0.0),
            ..Default::default()
        });
        assert_eq!(engine.apply(&summaries), summaries);
    }

    #[test]
    fn test_impossible_price_range_is_empty() {
        let engine = FilterEngine::new(FilterCriteria {
            min_price: Some(30_000.0),
            max_price: Some(10_000.0),
            ..Default::default()
        });
        assert!(engine.apply(&fixture()).is_empty());
    }

    #[test]
    fn test_conjunction() {
        let engine = FilterEngine::new(FilterCriteria {
            bedrooms: Some(1),
            bathrooms: Some(1),
            min_price: Some(10_000.0),
            max_price: Some(30_000.0),
            min_area: Some(25.0),
            max_area: Some(80.0),
            min_rating: Some(4.0),
            ..Default::default()
        });
        let names: Vec<_> = engine
            .apply(&fixture())
            .into_iter()
            .map(|s| s.building_name)
            .collect();
        assert_eq!(names, vec!["Tower A"]);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let engine = FilterEngine::new(FilterCriteria {
            min_price: Some(28_000.0),
            max_price: Some(28_000.0),
            min_rating: Some(4.6),
            ..Default::default()
        });
        assert_eq!(engine.apply(&fixture()).len(), 1);
    }

    #[test]
    fn test_null_fails_active_predicate_only() {
        let mut s = summary("Tower E", 12_000.0, 30.0, 4.0, 1, 1);
        s.avg_rating = None;

        assert!(FilterEngine::new(FilterCriteria::unrestricted()).matches_summary(&s));
        let with_rating = FilterEngine::new(FilterCriteria {
            min_rating: Some(0.0),
            ..Default::default()
        });
        assert!(!with_rating.matches_summary(&s));
    }

    #[test]
    fn test_page_defaults() {
        let summaries = fixture();
        let criteria = FilterCriteria::page_defaults(&FilterDefaults::default(), &summaries);
        let names: Vec<_> = FilterEngine::new(criteria)
            .apply(&summaries)
            .into_iter()
            .map(|s| s.building_name)
            .collect();
        assert_eq!(names, vec!["Tower A"]);
    }

    #[test]
    fn test_tier_selection() {
        let listings: Vec<ClassifiedListing> = [
            (Some(9_000.0), Some(PriceTier::Low)),
            (Some(15_000.0), Some(PriceTier::Medium)),
            (Some(25_000.0), Some(PriceTier::High)),
            (None, None),
        ]
        .into_iter()
        .map(|(price, tier)| ClassifiedListing {
            listing: Listing::new("Tower A", price, 13.75, 100.52),
            tier,
        })
        .collect();

        let engine = FilterEngine::new(FilterCriteria {
            tiers: Some(vec![PriceTier::Low, PriceTier::High]),
            ..Default::default()
        });
        let prices: Vec<_> = engine
            .apply_tiers(&listings)
            .iter()
            .map(|l| l.listing.price)
            .collect();
        assert_eq!(prices, vec![Some(9_000.0), Some(25_000.0)]);

        let none = FilterEngine::new(FilterCriteria {
            tiers: Some(Vec::new()),
            ..Default::default()
        });
        assert!(none.apply_tiers(&listings).is_empty());
        assert_eq!(FilterEngine::default().apply_tiers(&listings).len(), 3);
    }

    #[test]
    fn test_listing_query() {
        let mut a = Listing::new("Tower A", Some(12_000.0), 13.75, 100.52);
        a.bedrooms = Some(1);
        let mut b = Listing::new("Tower B", Some(35_000.0), 13.76, 100.53);
        b.bedrooms = Some(2);
        let c = Listing::new("Tower A", Some(14_000.0), 13.75, 100.52);
        let listings = vec![a, b, c];

        let query = ListingQuery {
            bedrooms: Some(vec![1, 2]),
            min_price: Some(10_000.0),
            max_price: Some(30_000.0),
        };
        let hits = filter_listings(&listings, &query);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].building_name, "Tower A");

        assert_eq!(filter_listings(&listings, &ListingQuery::default()).len(), 3);
        assert_eq!(listings_for_building(&listings, "Tower A").len(), 2);
        assert_eq!(building_names(&listings), vec!["Tower A", "Tower B"]);
        assert_eq!(listing_bedroom_options(&listings), vec![1, 2]);
    }

    #[test]
    fn test_price_filter_uses_rounded_average() {
        let listings = vec![
            Listing::new("Tower A", Some(30_000.0), 13.75, 100.52),
            Listing::new("Tower A", Some(30_000.08), 13.75, 100.52),
        ];
        let raw_mean = (30_000.0 + 30_000.08) / 2.0;
        assert!(raw_mean > 30_000.0);

        let summaries = aggregate(&listings);
        assert_eq!(summaries[0].avg_price, Some(30_000.0));

        let engine = FilterEngine::new(FilterCriteria {
            max_price: Some(30_000.0),
            ..Default::default()
        });
        assert_eq!(engine.apply(&summaries).len(), 1);
    }

    #[test]
    fn test_area_filter_uses_rounded_average() {
        let mut a = Listing::new("Tower A", Some(12_000.0), 13.75, 100.52);
        a.floor_area = Some(25.0);
        let mut b = Listing::new("Tower A", Some(12_000.0), 13.75, 100.52);
        b.floor_area = Some(24.92);
        let raw_mean = (25.0 + 24.92) / 2.0;
        assert!(raw_mean < 25.0);

        let summaries = aggregate(&[a, b]);
        assert_eq!(summaries[0].avg_area, Some(25.0));

        let engine = FilterEngine::new(FilterCriteria {
            min_area: Some(25.0),
            ..Default::default()
        });
        assert_eq!(engine.apply(&summaries).len(), 1);
    }

    #[test]
    fn test_options_sorted_distinct() {
        let summaries = fixture();
        assert_eq!(bedroom_options(&summaries), vec![1, 2, 3]);
        assert_eq!(bathroom_options(&summaries), vec![1, 2]);
    }
}
