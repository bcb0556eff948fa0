//! PyO3 bindings for the condo explorer pipeline.
//!
//! Exposes the Rust pipeline to the Python dashboard:
//! - Price tier classification
//! - Building aggregation and filtering
//! - The full dashboard run over records or a CSV file

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;

use condo_core::{
    BuildingSummary as RustBuildingSummary, Config as RustConfig, Error as RustError,
    FilterCriteria as RustFilterCriteria, Listing as RustListing, MapPoint as RustMapPoint,
    PriceTier as RustPriceTier, RawRecord,
};
use condo_features::{aggregate, DashboardEngine, DashboardView, FilterEngine};
use condo_ingestion::{CsvFileSource, JsonDocumentSource, SnapshotCache};

fn to_py_err(e: RustError) -> PyErr {
    match e {
        RustError::SourceUnavailable { .. } | RustError::Io(_) => PyIOError::new_err(e.to_string()),
        other => PyValueError::new_err(other.to_string()),
    }
}

// ============================================================================
// Python-exposed Types
// ============================================================================

/// Price tier of a listing.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, PartialEq)]
pub enum PriceTier {
    Low = 0,
    Medium = 1,
    High = 2,
}

#[pymethods]
impl PriceTier {
    #[getter]
    fn label(&self) -> &'static str {
        RustPriceTier::from(*self).label()
    }

    fn __str__(&self) -> &'static str {
        self.label()
    }
}

impl From<RustPriceTier> for PriceTier {
    fn from(t: RustPriceTier) -> Self {
        match t {
            RustPriceTier::Low => PriceTier::Low,
            RustPriceTier::Medium => PriceTier::Medium,
            RustPriceTier::High => PriceTier::High,
        }
    }
}

impl From<PriceTier> for RustPriceTier {
    fn from(t: PriceTier) -> Self {
        match t {
            PriceTier::Low => RustPriceTier::Low,
            PriceTier::Medium => RustPriceTier::Medium,
            PriceTier::High => RustPriceTier::High,
        }
    }
}

/// One normalized listing.
#[pyclass]
#[derive(Clone)]
pub struct Listing {
    #[pyo3(get, set)]
    pub building_name: String,
    #[pyo3(get, set)]
    pub price: Option<f64>,
    #[pyo3(get, set)]
    pub latitude: f64,
    #[pyo3(get, set)]
    pub longitude: f64,
    #[pyo3(get, set)]
    pub bedrooms: Option<u32>,
    #[pyo3(get, set)]
    pub bathrooms: Option<u32>,
    #[pyo3(get, set)]
    pub floor_area: Option<f64>,
    #[pyo3(get, set)]
    pub rating: Option<f64>,
    #[pyo3(get, set)]
    pub agent_name: Option<String>,
    #[pyo3(get, set)]
    pub agent_phone: Option<String>,
    #[pyo3(get, set)]
    pub distance_to_transit: Option<f64>,
    #[pyo3(get, set)]
    pub address: Option<String>,
}

#[pymethods]
impl Listing {
    #[new]
    #[pyo3(signature = (building_name, price, latitude, longitude))]
    fn new(building_name: String, price: Option<f64>, latitude: f64, longitude: f64) -> Self {
        RustListing::new(building_name, price, latitude, longitude).into()
    }

    fn __repr__(&self) -> String {
        format!(
            "Listing(building_name={:?}, price={:?}, lat={}, lon={})",
            self.building_name, self.price, self.latitude, self.longitude
        )
    }
}

impl From<RustListing> for Listing {
    fn from(l: RustListing) -> Self {
        Listing {
            building_name: l.building_name,
            price: l.price,
            latitude: l.latitude,
            longitude: l.longitude,
            bedrooms: l.bedrooms,
            bathrooms: l.bathrooms,
            floor_area: l.floor_area,
            rating: l.rating,
            agent_name: l.agent_name,
            agent_phone: l.agent_phone,
            distance_to_transit: l.distance_to_transit,
            address: l.address,
        }
    }
}

impl From<Listing> for RustListing {
    fn from(l: Listing) -> Self {
        RustListing {
            building_name: l.building_name,
            price: l.price,
            latitude: l.latitude,
            longitude: l.longitude,
            bedrooms: l.bedrooms,
            bathrooms: l.bathrooms,
            floor_area: l.floor_area,
            rating: l.rating,
            agent_name: l.agent_name,
            agent_phone: l.agent_phone,
            distance_to_transit: l.distance_to_transit,
            address: l.address,
        }
    }
}

/// A jittered map marker.
#[pyclass]
#[derive(Clone)]
pub struct MapPoint {
    #[pyo3(get)]
    pub building_name: String,
    #[pyo3(get)]
    pub price: f64,
    #[pyo3(get)]
    pub tier: PriceTier,
    #[pyo3(get)]
    pub latitude: f64,
    #[pyo3(get)]
    pub longitude: f64,
}

impl From<RustMapPoint> for MapPoint {
    fn from(p: RustMapPoint) -> Self {
        MapPoint {
            building_name: p.building_name,
            price: p.price,
            tier: p.tier.into(),
            latitude: p.latitude,
            longitude: p.longitude,
        }
    }
}

/// Per-building statistics.
#[pyclass]
#[derive(Clone)]
pub struct BuildingSummary {
    #[pyo3(get)]
    pub building_name: String,
    #[pyo3(get)]
    pub latitude: f64,
    #[pyo3(get)]
    pub longitude: f64,
    #[pyo3(get)]
    pub min_price: Option<f64>,
    #[pyo3(get)]
    pub max_price: Option<f64>,
    #[pyo3(get)]
    pub avg_price: Option<f64>,
    #[pyo3(get)]
    pub bedrooms: Option<u32>,
    #[pyo3(get)]
    pub bathrooms: Option<u32>,
    #[pyo3(get)]
    pub min_area: Option<f64>,
    #[pyo3(get)]
    pub max_area: Option<f64>,
    #[pyo3(get)]
    pub avg_area: Option<f64>,
    #[pyo3(get)]
    pub avg_rating: Option<f64>,
    #[pyo3(get)]
    pub transit_distance: Option<f64>,
    #[pyo3(get)]
    pub listing_count: usize,
}

#[pymethods]
impl BuildingSummary {
    fn __repr__(&self) -> String {
        format!(
            "BuildingSummary(building_name={:?}, avg_price={:?}, listings={})",
            self.building_name, self.avg_price, self.listing_count
        )
    }
}

impl From<RustBuildingSummary> for BuildingSummary {
    fn from(s: RustBuildingSummary) -> Self {
        BuildingSummary {
            building_name: s.building_name,
            latitude: s.latitude,
            longitude: s.longitude,
            min_price: s.min_price,
            max_price: s.max_price,
            avg_price: s.avg_price,
            bedrooms: s.bedrooms,
            bathrooms: s.bathrooms,
            min_area: s.min_area,
            max_area: s.max_area,
            avg_area: s.avg_area,
            avg_rating: s.avg_rating,
            transit_distance: s.transit_distance,
            listing_count: s.listing_count,
        }
    }
}

impl From<BuildingSummary> for RustBuildingSummary {
    fn from(s: BuildingSummary) -> Self {
        RustBuildingSummary {
            building_name: s.building_name,
            latitude: s.latitude,
            longitude: s.longitude,
            min_price: s.min_price,
            max_price: s.max_price,
            avg_price: s.avg_price,
            bedrooms: s.bedrooms,
            bathrooms: s.bathrooms,
            min_area: s.min_area,
            max_area: s.max_area,
            avg_area: s.avg_area,
            avg_rating: s.avg_rating,
            transit_distance: s.transit_distance,
            listing_count: s.listing_count,
        }
    }
}

/// Filter selections. `None` restricts nothing.
#[pyclass]
#[derive(Clone, Default)]
pub struct FilterCriteria {
    #[pyo3(get, set)]
    pub tiers: Option<Vec<PriceTier>>,
    #[pyo3(get, set)]
    pub bedrooms: Option<u32>,
    #[pyo3(get, set)]
    pub bathrooms: Option<u32>,
    #[pyo3(get, set)]
    pub min_price: Option<f64>,
    #[pyo3(get, set)]
    pub max_price: Option<f64>,
    #[pyo3(get, set)]
    pub min_area: Option<f64>,
    #[pyo3(get, set)]
    pub max_area: Option<f64>,
    #[pyo3(get, set)]
    pub min_rating: Option<f64>,
}

#[pymethods]
impl FilterCriteria {
    #[new]
    #[pyo3(signature = (
        tiers=None, bedrooms=None, bathrooms=None, min_price=None, max_price=None,
        min_area=None, max_area=None, min_rating=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        tiers: Option<Vec<PriceTier>>,
        bedrooms: Option<u32>,
        bathrooms: Option<u32>,
        min_price: Option<f64>,
        max_price: Option<f64>,
        min_area: Option<f64>,
        max_area: Option<f64>,
        min_rating: Option<f64>,
    ) -> Self {
        FilterCriteria {
            tiers,
            bedrooms,
            bathrooms,
            min_price,
            max_price,
            min_area,
            max_area,
            min_rating,
        }
    }
}

impl From<FilterCriteria> for RustFilterCriteria {
    fn from(c: FilterCriteria) -> Self {
        RustFilterCriteria {
            tiers: c
                .tiers
                .map(|tiers| tiers.into_iter().map(RustPriceTier::from).collect()),
            bedrooms: c.bedrooms,
            bathrooms: c.bathrooms,
            min_price: c.min_price,
            max_price: c.max_price,
            min_area: c.min_area,
            max_area: c.max_area,
            min_rating: c.min_rating,
        }
    }
}

impl From<RustFilterCriteria> for FilterCriteria {
    fn from(c: RustFilterCriteria) -> Self {
        FilterCriteria {
            tiers: c
                .tiers
                .map(|tiers| tiers.into_iter().map(PriceTier::from).collect()),
            bedrooms: c.bedrooms,
            bathrooms: c.bathrooms,
            min_price: c.min_price,
            max_price: c.max_price,
            min_area: c.min_area,
            max_area: c.max_area,
            min_rating: c.min_rating,
        }
    }
}

// ============================================================================
// Python-exposed Engine Classes
// ============================================================================

/// Result of one dashboard run.
#[pyclass]
pub struct PyDashboardView {
    inner: DashboardView,
}

#[pymethods]
impl PyDashboardView {
    #[getter]
    fn listings(&self) -> Vec<Listing> {
        self.inner.listings.iter().cloned().map(Into::into).collect()
    }

    #[getter]
    fn map_points(&self) -> Vec<MapPoint> {
        self.inner.map_points.iter().cloned().map(Into::into).collect()
    }

    #[getter]
    fn summaries(&self) -> Vec<BuildingSummary> {
        self.inner.summaries.iter().cloned().map(Into::into).collect()
    }

    #[getter]
    fn filtered(&self) -> Vec<BuildingSummary> {
        self.inner.filtered.iter().cloned().map(Into::into).collect()
    }

    /// Whether no building passed the filters.
    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Re-filter this run's summaries.
    fn refilter(&self, criteria: FilterCriteria) -> Vec<BuildingSummary> {
        self.inner
            .refilter(&criteria.into())
            .into_iter()
            .map(Into::into)
            .collect()
    }

    /// Listing rows of one building.
    fn listings_for_building(&self, building_name: &str) -> Vec<Listing> {
        self.inner
            .listings_for_building(building_name)
            .into_iter()
            .cloned()
            .map(Into::into)
            .collect()
    }

    fn bedroom_options(&self) -> Vec<u32> {
        self.inner.bedroom_options()
    }

    fn bathroom_options(&self) -> Vec<u32> {
        self.inner.bathroom_options()
    }

    /// Tier counts as (total, low, medium, high, unpriced).
    fn tier_stats(&self) -> (u64, u64, u64, u64, u64) {
        let s = &self.inner.tier_stats;
        (s.total_listings, s.low, s.medium, s.high, s.unpriced)
    }

    /// Whole view serialized as JSON.
    fn to_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.inner).map_err(|e| PyValueError::new_err(e.to_string()))
    }
}

/// Dashboard pipeline engine with a snapshot cache.
#[pyclass]
pub struct PyDashboardEngine {
    inner: DashboardEngine,
    cache: SnapshotCache,
}

#[pymethods]
impl PyDashboardEngine {
    #[new]
    #[pyo3(signature = (config_json=None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        let config = match config_json {
            Some(json) => RustConfig::from_json_str(json).map_err(to_py_err)?,
            None => RustConfig::default(),
        };
        config.validate().map_err(to_py_err)?;
        Ok(PyDashboardEngine {
            inner: DashboardEngine::new(&config),
            cache: SnapshotCache::from_config(&config.cache),
        })
    }

    /// Run over records given as a JSON array of objects.
    #[pyo3(signature = (records_json, criteria=None))]
    fn run(&mut self, records_json: &str, criteria: Option<FilterCriteria>) -> PyResult<PyDashboardView> {
        let records: Vec<RawRecord> = JsonDocumentSource::parse_documents(records_json).map_err(to_py_err)?;
        let criteria: RustFilterCriteria = criteria.unwrap_or_default().into();
        Ok(PyDashboardView {
            inner: self.inner.run(&records, &criteria),
        })
    }

    /// Run over a CSV file, through the snapshot cache.
    #[pyo3(signature = (path, criteria=None))]
    fn load_csv(&mut self, path: &str, criteria: Option<FilterCriteria>) -> PyResult<PyDashboardView> {
        let source = CsvFileSource::new(path);
        let criteria: RustFilterCriteria = criteria.unwrap_or_default().into();
        let view = self
            .inner
            .run_source(&mut self.cache, &source, &criteria)
            .map_err(to_py_err)?;
        Ok(PyDashboardView { inner: view })
    }

    /// Initial map page criteria for a view.
    fn page_defaults(&self, view: &PyDashboardView) -> FilterCriteria {
        self.inner.page_defaults(&view.inner.summaries).into()
    }

    /// Drop cached snapshots so the next load rereads its source.
    fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

// ============================================================================
// Free Functions
// ============================================================================

/// Classify one price.
#[pyfunction]
#[pyo3(signature = (price, medium_min=10_000.0, high_min=20_000.0))]
fn classify_price(price: f64, medium_min: f64, high_min: f64) -> PriceTier {
    let tiers = condo_core::config::TierConfig { medium_min, high_min };
    RustPriceTier::from_price(price, &tiers).into()
}

/// Aggregate listings into building summaries.
#[pyfunction]
fn aggregate_listings(listings: Vec<Listing>) -> Vec<BuildingSummary> {
    let listings: Vec<RustListing> = listings.into_iter().map(Into::into).collect();
    aggregate(&listings).into_iter().map(Into::into).collect()
}

/// Filter building summaries by criteria.
#[pyfunction]
fn filter_summaries(summaries: Vec<BuildingSummary>, criteria: FilterCriteria) -> Vec<BuildingSummary> {
    let summaries: Vec<RustBuildingSummary> = summaries.into_iter().map(Into::into).collect();
    FilterEngine::new(criteria.into())
        .apply(&summaries)
        .into_iter()
        .map(Into::into)
        .collect()
}

// ============================================================================
// Module Definition
// ============================================================================

/// Condo Explorer Core - Rust pipeline for the rental listings dashboard.
#[pymodule]
fn condo_explorer_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Types
    m.add_class::<PriceTier>()?;
    m.add_class::<Listing>()?;
    m.add_class::<MapPoint>()?;
    m.add_class::<BuildingSummary>()?;
    m.add_class::<FilterCriteria>()?;

    // Engine classes
    m.add_class::<PyDashboardEngine>()?;
    m.add_class::<PyDashboardView>()?;

    // Functions
    m.add_function(wrap_pyfunction!(classify_price, m)?)?;
    m.add_function(wrap_pyfunction!(aggregate_listings, m)?)?;
    m.add_function(wrap_pyfunction!(filter_summaries, m)?)?;

    Ok(())
}
