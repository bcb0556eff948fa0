//! Price tier classification.
//!
//! Assigns every priced listing a Low/Medium/High tier from fixed thresholds
//! and keeps per-tier counts for the map legend.

use condo_core::config::TierConfig;
use condo_core::{ClassifiedListing, Listing, PriceTier};
use serde::Serialize;

/// Statistics about tier classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TierStats {
    /// Total listings classified.
    pub total_listings: u64,
    /// Listings classified as Low.
    pub low: u64,
    /// Listings classified as Medium.
    pub medium: u64,
    /// Listings classified as High.
    pub high: u64,
    /// Listings with no price, left unclassified.
    pub unpriced: u64,
}

impl TierStats {
    /// Count for one tier.
    pub fn count(&self, tier: PriceTier) -> u64 {
        match tier {
            PriceTier::Low => self.low,
            PriceTier::Medium => self.medium,
            PriceTier::High => self.high,
        }
    }

    /// Fraction of priced listings in a tier.
    pub fn tier_frac(&self, tier: PriceTier) -> f64 {
        let priced = self.total_listings - self.unpriced;
        if priced > 0 {
            self.count(tier) as f64 / priced as f64
        } else {
            0.0
        }
    }

    /// Reset statistics.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Price classifier with per-tier counters.
pub struct PriceClassifier {
    /// Tier thresholds.
    tiers: TierConfig,
    /// Classification statistics.
    stats: TierStats,
}

impl PriceClassifier {
    /// Create a new classifier.
    pub fn new(tiers: TierConfig) -> Self {
        Self {
            tiers,
            stats: TierStats::default(),
        }
    }

    /// Classify a price. Pure; does not touch statistics.
    #[inline]
    pub fn tier_for(&self, price: f64) -> PriceTier {
        PriceTier::from_price(price, &self.tiers)
    }

    /// Classify a single listing.
    pub fn classify(&mut self, listing: Listing) -> ClassifiedListing {
        let tier = listing.price.map(|p| self.tier_for(p));

        self.stats.total_listings += 1;
        match tier {
            Some(PriceTier::Low) => self.stats.low += 1,
            Some(PriceTier::Medium) => self.stats.medium += 1,
            Some(PriceTier::High) => self.stats.high += 1,
            None => self.stats.unpriced += 1,
        }

        ClassifiedListing { listing, tier }
    }

    /// Classify multiple listings, preserving order.
    pub fn classify_batch(&mut self, listings: Vec<Listing>) -> Vec<ClassifiedListing> {
        listings.into_iter().map(|l| self.classify(l)).collect()
    }

    /// Get classification statistics.
    pub fn stats(&self) -> &TierStats {
        &self.stats
    }

    /// Reset statistics.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }
}

impl Default for PriceClassifier {
    fn default() -> Self {
        Self::new(TierConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_listing(price: Option<f64>) -> Listing {
        Listing::new("Tower A", price, 13.75, 100.52)
    }

    #[test]
    fn test_boundaries() {
        let classifier = PriceClassifier::default();
        assert_eq!(classifier.tier_for(9_999.99), PriceTier::Low);
        assert_eq!(classifier.tier_for(10_000.0), PriceTier::Medium);
        assert_eq!(classifier.tier_for(19_999.99), PriceTier::Medium);
        assert_eq!(classifier.tier_for(20_000.0), PriceTier::High);
        assert_eq!(classifier.tier_for(0.0), PriceTier::Low);
        assert_eq!(classifier.tier_for(-1.0), PriceTier::Low);
    }

    #[test]
    fn test_custom_thresholds() {
        let classifier = PriceClassifier::new(TierConfig {
            medium_min: 15_000.0,
            high_min: 40_000.0,
        });
        assert_eq!(classifier.tier_for(14_999.0), PriceTier::Low);
        assert_eq!(classifier.tier_for(39_999.0), PriceTier::Medium);
        assert_eq!(classifier.tier_for(40_000.0), PriceTier::High);
    }

    #[test]
    fn test_classify_batch() {
        let mut classifier = PriceClassifier::default();
        let classified = classifier.classify_batch(vec![
            make_listing(Some(9_000.0)),
            make_listing(Some(15_000.0)),
            make_listing(Some(25_000.0)),
        ]);

        let tiers: Vec<_> = classified.iter().map(|c| c.tier).collect();
        assert_eq!(
            tiers,
            vec![Some(PriceTier::Low), Some(PriceTier::Medium), Some(PriceTier::High)]
        );
    }

    #[test]
    fn test_unpriced_listing() {
        let mut classifier = PriceClassifier::default();
        let classified = classifier.classify(make_listing(None));
        assert_eq!(classified.tier, None);
        assert_eq!(classifier.stats().unpriced, 1);
    }

    #[test]
    fn test_stats() {
        let mut classifier = PriceClassifier::default();
        classifier.classify(make_listing(Some(5_000.0)));
        classifier.classify(make_listing(Some(8_000.0)));
        classifier.classify(make_listing(Some(12_000.0)));
        classifier.classify(make_listing(Some(30_000.0)));
        classifier.classify(make_listing(None));

        let stats = classifier.stats();
        assert_eq!(stats.total_listings, 5);
        assert_eq!(stats.low, 2);
        assert_eq!(stats.medium, 1);
        assert_eq!(stats.high, 1);
        assert!((stats.tier_frac(PriceTier::Low) - 0.5).abs() < 1e-10);

        classifier.reset_stats();
        assert_eq!(classifier.stats().total_listings, 0);
    }
}
