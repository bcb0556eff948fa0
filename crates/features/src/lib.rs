//! Building analytics for the condo explorer pipeline.
//!
//! This crate handles:
//! - Building aggregation (min/max/mean per building)
//! - Criteria filtering over summaries and listings
//! - Distribution histograms and column statistics
//! - The dashboard engine tying ingestion and analytics together

pub mod aggregator;
pub mod describe;
pub mod engine;
pub mod filter;
pub mod histogram;

pub use aggregator::{aggregate, BuildingAggregator};
pub use describe::{
    analyze_column, value_counts, BoxStats, Column, ColumnAnalysis, DatasetOverview, NumericChart,
    ValueCount,
};
pub use engine::{DashboardEngine, DashboardView};
pub use filter::FilterEngine;
pub use histogram::{Histogram, HistogramBin};
