//! Descriptive statistics for the analysis pages.
//!
//! Numeric columns get a histogram or box-plot summary, categorical columns a
//! value count table.

use crate::histogram::Histogram;
use condo_core::config::ChartConfig;
use condo_core::Listing;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Distribution, OrderStatistics};
use std::collections::HashMap;

/// A listing column available for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Price,
    Bedrooms,
    Bathrooms,
    FloorArea,
    Rating,
    TransitDistance,
    BuildingName,
    AgentName,
}

impl Column {
    pub const ALL: [Column; 8] = [
        Column::Price,
        Column::Bedrooms,
        Column::Bathrooms,
        Column::FloorArea,
        Column::Rating,
        Column::TransitDistance,
        Column::BuildingName,
        Column::AgentName,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Price => "price",
            Column::Bedrooms => "bedrooms",
            Column::Bathrooms => "bathrooms",
            Column::FloorArea => "floor_area",
            Column::Rating => "rating",
            Column::TransitDistance => "transit_distance",
            Column::BuildingName => "building_name",
            Column::AgentName => "agent_name",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Column::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, Column::BuildingName | Column::AgentName)
    }

    /// Non-null numeric values of this column. Empty for categorical columns.
    pub fn numeric_values(self, listings: &[Listing]) -> Vec<f64> {
        let pick = |l: &Listing| -> Option<f64> {
            match self {
                Column::Price => l.price,
                Column::Bedrooms => l.bedrooms.map(f64::from),
                Column::Bathrooms => l.bathrooms.map(f64::from),
                Column::FloorArea => l.floor_area,
                Column::Rating => l.rating,
                Column::TransitDistance => l.distance_to_transit,
                Column::BuildingName | Column::AgentName => None,
            }
        };
        listings.iter().filter_map(pick).collect()
    }

    /// Non-null values of this column rendered as text.
    pub fn text_values(self, listings: &[Listing]) -> Vec<String> {
        match self {
            Column::BuildingName => listings
                .iter()
                .filter(|l| !l.building_name.is_empty())
                .map(|l| l.building_name.clone())
                .collect(),
            Column::AgentName => listings.iter().filter_map(|l| l.agent_name.clone()).collect(),
            _ => self
                .numeric_values(listings)
                .into_iter()
                .map(|v| v.to_string())
                .collect(),
        }
    }
}

/// Five-number summary plus mean, for box plots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub count: usize,
    pub min: f64,
    pub lower_quartile: f64,
    pub median: f64,
    pub upper_quartile: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: Option<f64>,
}

impl BoxStats {
    /// Summarize values. Returns `None` when there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if values.is_empty() {
            return None;
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let count = values.len();
        let mut data = Data::new(values);

        Some(Self {
            count,
            min,
            lower_quartile: data.lower_quartile(),
            median: data.median(),
            upper_quartile: data.upper_quartile(),
            max,
            mean: data.mean()?,
            std_dev: data.std_dev().filter(|sd| sd.is_finite()),
        })
    }

    pub fn interquartile_range(&self) -> f64 {
        self.upper_quartile - self.lower_quartile
    }
}

/// One row of a value count table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Count occurrences of each value, most frequent first, ties by value.
pub fn value_counts(values: &[String]) -> Vec<ValueCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values {
        *counts.entry(v.as_str()).or_insert(0) += 1;
    }

    let mut rows: Vec<ValueCount> = counts
        .into_iter()
        .map(|(value, count)| ValueCount {
            value: value.to_string(),
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    rows
}

/// Requested chart for a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericChart {
    #[default]
    Histogram,
    BoxPlot,
}

/// Result of analyzing one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnAnalysis {
    Histogram { column: Column, histogram: Histogram },
    BoxPlot { column: Column, stats: Option<BoxStats> },
    Counts { column: Column, counts: Vec<ValueCount> },
}

/// Analyze a column: numeric columns get the requested chart, categorical
/// columns always get value counts.
pub fn analyze_column(
    listings: &[Listing],
    column: Column,
    chart: NumericChart,
    bins: usize,
) -> ColumnAnalysis {
    if !column.is_numeric() {
        return ColumnAnalysis::Counts {
            column,
            counts: value_counts(&column.text_values(listings)),
        };
    }

    let values = column.numeric_values(listings);
    match chart {
        NumericChart::Histogram => ColumnAnalysis::Histogram {
            column,
            histogram: Histogram::from_values(values, bins),
        },
        NumericChart::BoxPlot => ColumnAnalysis::BoxPlot {
            column,
            stats: BoxStats::from_values(&values),
        },
    }
}

/// Landing page content: size, preview rows and price distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetOverview {
    pub total_listings: usize,
    pub preview: Vec<Listing>,
    pub price_histogram: Histogram,
}

impl DatasetOverview {
    pub fn build(listings: &[Listing], charts: &ChartConfig) -> Self {
        Self {
            total_listings: listings.len(),
            preview: listings.iter().take(charts.preview_rows).cloned().collect(),
            price_histogram: Histogram::from_values(
                Column::Price.numeric_values(listings),
                charts.price_histogram_bins,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn listings() -> Vec<Listing> {
        let specs = [
            ("Tower A", Some(9_000.0), Some(1), Some("Somchai")),
            ("Tower A", Some(15_000.0), Some(2), Some("Malee")),
            ("Tower B", Some(25_000.0), Some(2), Some("Somchai")),
            ("Tower C", None, None, None),
            ("Tower A", Some(11_000.0), Some(1), Some("Somchai")),
        ];
        specs
            .into_iter()
            .map(|(name, price, beds, agent)| {
                let mut l = Listing::new(name, price, 13.75, 100.52);
                l.bedrooms = beds;
                l.agent_name = agent.map(String::from);
                l
            })
            .collect()
    }

    #[test]
    fn test_column_names_roundtrip() {
        for column in Column::ALL {
            assert_eq!(Column::from_name(column.name()), Some(column));
        }
        assert!(Column::Price.is_numeric());
        assert!(!Column::AgentName.is_numeric());
    }

    #[test]
    fn test_numeric_values_skip_nulls() {
        let values = Column::Price.numeric_values(&listings());
        assert_eq!(values, vec![9_000.0, 15_000.0, 25_000.0, 11_000.0]);
        assert!(Column::BuildingName.numeric_values(&listings()).is_empty());
    }

    #[test]
    fn test_box_stats() {
        let stats = BoxStats::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(stats.count, 5);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
        assert_relative_eq!(stats.median, 3.0);
        assert_relative_eq!(stats.mean, 3.0);
        assert!(stats.lower_quartile <= stats.median && stats.median <= stats.upper_quartile);
        assert!(stats.interquartile_range() > 0.0);
        assert!(BoxStats::from_values(&[]).is_none());
    }

    #[test]
    fn test_single_value_box_stats() {
        let stats = BoxStats::from_values(&[7.0]).unwrap();
        assert_eq!(stats.median, 7.0);
        assert_eq!(stats.std_dev, None);
    }

    #[test]
    fn test_value_counts_ordering() {
        let counts = value_counts(&Column::AgentName.text_values(&listings()));
        assert_eq!(
            counts,
            vec![
                ValueCount { value: "Somchai".into(), count: 3 },
                ValueCount { value: "Malee".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_analyze_column() {
        let data = listings();

        match analyze_column(&data, Column::BuildingName, NumericChart::BoxPlot, 30) {
            ColumnAnalysis::Counts { counts, .. } => {
                assert_eq!(counts[0], ValueCount { value: "Tower A".into(), count: 3 });
            }
            other => panic!("expected counts, got {other:?}"),
        }

        match analyze_column(&data, Column::Price, NumericChart::Histogram, 4) {
            ColumnAnalysis::Histogram { histogram, .. } => assert_eq!(histogram.total, 4),
            other => panic!("expected histogram, got {other:?}"),
        }

        match analyze_column(&data, Column::Bedrooms, NumericChart::BoxPlot, 4) {
            ColumnAnalysis::BoxPlot { stats, .. } => assert_eq!(stats.unwrap().max, 2.0),
            other => panic!("expected box plot, got {other:?}"),
        }
    }

    #[test]
    fn test_overview() {
        let overview = DatasetOverview::build(&listings(), &ChartConfig::default());
        assert_eq!(overview.total_listings, 5);
        assert_eq!(overview.preview.len(), 5);
        assert_eq!(overview.price_histogram.total, 4);
        assert_eq!(overview.price_histogram.bin_count(), 40);
    }
}
