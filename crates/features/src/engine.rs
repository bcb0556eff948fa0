//! Dashboard pipeline engine.
//!
//! One run per page view: normalize, classify and jitter for the
//! classification map; aggregate and filter for the building explorer.

use crate::aggregator::aggregate;
use crate::describe::{analyze_column, Column, ColumnAnalysis, DatasetOverview, NumericChart};
use crate::filter::{self, FilterEngine};
use condo_core::{
    BuildingSummary, Config, FilterCriteria, Listing, ListingQuery, MapPoint, RawRecord, Result,
    SnapshotInfo,
};
use condo_ingestion::{
    NormalizationStats, PositionJitterer, PriceClassifier, RecordNormalizer, RecordSource,
    SnapshotCache, TierStats,
};
use serde::Serialize;
use tracing::{debug, info};

/// Everything a map page renders from one run.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    /// Source snapshot, when the run went through a cache.
    pub snapshot: Option<SnapshotInfo>,
    /// Normalized listings, unjittered.
    pub listings: Vec<Listing>,
    /// Markers for listings in the selected tiers.
    pub map_points: Vec<MapPoint>,
    /// One summary per building.
    pub summaries: Vec<BuildingSummary>,
    /// Summaries passing the building predicates.
    pub filtered: Vec<BuildingSummary>,
    pub tier_stats: TierStats,
    pub normalization: NormalizationStats,
}

impl DashboardView {
    /// Whether no building matched; the page shows its empty state.
    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }

    /// Re-filter the summaries with new criteria, reusing this run.
    pub fn refilter(&self, criteria: &FilterCriteria) -> Vec<BuildingSummary> {
        FilterEngine::new(criteria.clone()).apply(&self.summaries)
    }

    /// Listing detail rows for one building.
    pub fn listings_for_building(&self, building_name: &str) -> Vec<&Listing> {
        filter::listings_for_building(&self.listings, building_name)
    }

    pub fn bedroom_options(&self) -> Vec<u32> {
        filter::bedroom_options(&self.summaries)
    }

    pub fn bathroom_options(&self) -> Vec<u32> {
        filter::bathroom_options(&self.summaries)
    }
}

/// Pipeline engine.
pub struct DashboardEngine {
    config: Config,
    normalizer: RecordNormalizer,
    classifier: PriceClassifier,
    jitterer: PositionJitterer,
}

impl DashboardEngine {
    /// Create an engine from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            normalizer: RecordNormalizer::from_config(config),
            classifier: PriceClassifier::new(config.tiers),
            jitterer: PositionJitterer::from_config(&config.jitter),
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Normalize records only.
    pub fn normalize(&mut self, records: &[RawRecord]) -> Vec<Listing> {
        self.normalizer.reset_stats();
        self.normalizer.normalize_batch(records)
    }

    /// Full pipeline over an in-memory snapshot.
    pub fn run(&mut self, records: &[RawRecord], criteria: &FilterCriteria) -> DashboardView {
        let listings = self.normalize(records);

        self.classifier.reset_stats();
        let classified = self.classifier.classify_batch(listings.clone());

        let filter = FilterEngine::new(criteria.clone());
        let map_points = self.jitterer.place_all(filter.apply_tiers(&classified));
        debug!(markers = map_points.len(), "placed map markers");

        let summaries = aggregate(&listings);
        let filtered = filter.apply(&summaries);
        if filtered.is_empty() {
            info!(buildings = summaries.len(), "no buildings match the current filters");
        }

        DashboardView {
            snapshot: None,
            listings,
            map_points,
            summaries,
            filtered,
            tier_stats: self.classifier.stats().clone(),
            normalization: self.normalizer.stats().clone(),
        }
    }

    /// Load through the cache, then run. A source failure halts the run.
    pub fn run_source<S: RecordSource + ?Sized>(
        &mut self,
        cache: &mut SnapshotCache,
        source: &S,
        criteria: &FilterCriteria,
    ) -> Result<DashboardView> {
        let snapshot = cache.get_or_load(source)?;
        let mut view = self.run(&snapshot.records, criteria);
        view.snapshot = Some(snapshot.info);
        Ok(view)
    }

    /// Initial criteria for the map page, built from one run's summaries.
    pub fn page_defaults(&self, summaries: &[BuildingSummary]) -> FilterCriteria {
        FilterCriteria::page_defaults(&self.config.filter, summaries)
    }

    /// Landing page overview.
    pub fn overview(&self, listings: &[Listing]) -> DatasetOverview {
        DatasetOverview::build(listings, &self.config.charts)
    }

    /// Analysis page chart for one column.
    pub fn analyze(&self, listings: &[Listing], column: Column, chart: NumericChart) -> ColumnAnalysis {
        analyze_column(listings, column, chart, self.config.charts.column_histogram_bins)
    }

    /// Scatter page rows.
    pub fn scatter<'a>(&self, listings: &'a [Listing], query: &ListingQuery) -> Vec<&'a Listing> {
        filter::filter_listings(listings, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use condo_core::{Error, PriceTier};
    use condo_ingestion::InMemorySource;
    use serde_json::{json, Value};

    fn record(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    fn seeded_config() -> Config {
        let mut config = Config::default();
        config.jitter.seed = Some(11);
        config
    }

    fn tower_a() -> Vec<RawRecord> {
        ["9000", "15000", "25000"]
            .into_iter()
            .map(|price| {
                record(json!({
                    "new_condo_name": "Tower A",
                    "rent_cd_price": price,
                    "latitude": "13.7563",
                    "longitude": "100.5018",
                    "rent_cd_bed": "1",
                    "rent_cd_bath": "1",
                    "rent_cd_floorarea": "32",
                    "star": "4.5",
                    "near_rail_meter": "250"
                }))
            })
            .collect()
    }

    #[test]
    fn test_tower_a_end_to_end() {
        let mut engine = DashboardEngine::new(&seeded_config());
        let view = engine.run(&tower_a(), &FilterCriteria::unrestricted());

        let tiers: Vec<_> = view.map_points.iter().map(|p| p.tier).collect();
        assert_eq!(tiers, vec![PriceTier::Low, PriceTier::Medium, PriceTier::High]);

        assert_eq!(view.summaries.len(), 1);
        let s = &view.summaries[0];
        assert_eq!(s.min_price, Some(9_000.0));
        assert_eq!(s.max_price, Some(25_000.0));
        assert_eq!(s.avg_price, Some(16_333.3));
        assert_eq!((s.latitude, s.longitude), (13.8, 100.5));
        assert_eq!(view.filtered, view.summaries);
    }

    #[test]
    fn test_jitter_does_not_split_groups() {
        let mut engine = DashboardEngine::new(&seeded_config());
        let view = engine.run(&tower_a(), &FilterCriteria::unrestricted());

        assert!(view.map_points.iter().all(|p| (p.latitude - 13.7563).abs() <= 0.0001 + 1e-12));
        assert!(view.listings.iter().all(|l| l.latitude == 13.7563));
        assert_eq!(view.summaries.len(), 1);
    }

    #[test]
    fn test_tier_selection_limits_markers_not_summaries() {
        let mut engine = DashboardEngine::new(&seeded_config());
        let criteria = FilterCriteria {
            tiers: Some(vec![PriceTier::High]),
            ..Default::default()
        };
        let view = engine.run(&tower_a(), &criteria);

        assert_eq!(view.map_points.len(), 1);
        assert_eq!(view.map_points[0].price, 25_000.0);
        assert_eq!(view.summaries[0].listing_count, 3);
        assert_eq!(view.tier_stats.total_listings, 3);
    }

    #[test]
    fn test_empty_result_is_not_an_error() {
        let mut engine = DashboardEngine::new(&seeded_config());
        let criteria = FilterCriteria {
            min_price: Some(50_000.0),
            ..Default::default()
        };
        let view = engine.run(&tower_a(), &criteria);
        assert!(view.is_empty());
        assert_eq!(view.summaries.len(), 1);
    }

    #[test]
    fn test_page_defaults_flow() {
        let mut engine = DashboardEngine::new(&seeded_config());
        let view = engine.run(&tower_a(), &FilterCriteria::unrestricted());
        let defaults = engine.page_defaults(&view.summaries);

        assert_eq!(defaults.bedrooms, Some(1));
        let filtered = view.refilter(&defaults);
        assert_eq!(filtered.len(), 1);
        assert_eq!(view.bedroom_options(), vec![1]);
        assert_eq!(view.listings_for_building("Tower A").len(), 3);
    }

    #[test]
    fn test_bad_rows_do_not_abort_run() {
        let mut records = tower_a();
        records.push(record(json!({"new_condo_name": "Ghost", "latitude": "?", "longitude": "100.5"})));
        records.push(record(json!({"new_condo_name": "Palace", "rent_cd_price": "2500000", "latitude": "13.7", "longitude": "100.5"})));
        records.push(record(json!({"new_condo_name": "Tower B", "rent_cd_price": "ask", "latitude": "13.8", "longitude": "100.6"})));

        let mut engine = DashboardEngine::new(&seeded_config());
        let view = engine.run(&records, &FilterCriteria::unrestricted());

        assert_eq!(view.listings.len(), 4);
        assert_eq!(view.normalization.dropped_bad_coordinates, 1);
        assert_eq!(view.normalization.dropped_price_cap, 1);
        assert_eq!(view.map_points.len(), 3);
        assert_eq!(view.summaries.len(), 2);
        assert_eq!(view.tier_stats.unpriced, 1);
    }

    #[test]
    fn test_run_source_through_cache() {
        let mut engine = DashboardEngine::new(&seeded_config());
        let mut cache = SnapshotCache::new(600);
        let source = InMemorySource::new("tower-a", tower_a());

        let view = engine
            .run_source(&mut cache, &source, &FilterCriteria::unrestricted())
            .unwrap();
        assert_eq!(view.snapshot.as_ref().unwrap().record_count, 3);
        assert_eq!(cache.len(), 1);

        engine
            .run_source(&mut cache, &source, &FilterCriteria::unrestricted())
            .unwrap();
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_unavailable_source_halts() {
        struct Down;
        impl RecordSource for Down {
            fn source_id(&self) -> String {
                "mongo:data_cleaned".into()
            }
            fn load(&self) -> Result<Vec<RawRecord>> {
                Err(Error::source_unavailable(self.source_id(), "connection refused"))
            }
        }

        let mut engine = DashboardEngine::new(&seeded_config());
        let mut cache = SnapshotCache::default();
        let err = engine
            .run_source(&mut cache, &Down, &FilterCriteria::unrestricted())
            .unwrap_err();
        assert!(err.is_source_unavailable());
    }

    #[test]
    fn test_page_helpers() {
        let mut engine = DashboardEngine::new(&seeded_config());
        let listings = engine.normalize(&tower_a());

        let overview = engine.overview(&listings);
        assert_eq!(overview.preview.len(), 3);

        let query = ListingQuery {
            bedrooms: Some(vec![1]),
            min_price: Some(10_000.0),
            max_price: Some(20_000.0),
        };
        assert_eq!(engine.scatter(&listings, &query).len(), 1);

        match engine.analyze(&listings, Column::Price, NumericChart::Histogram) {
            ColumnAnalysis::Histogram { histogram, .. } => assert_eq!(histogram.bin_count(), 30),
            other => panic!("expected histogram, got {other:?}"),
        }
    }
}
