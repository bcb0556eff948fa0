//! Equal-width histograms for distribution charts.

use serde::Serialize;

/// One histogram bin, `[lower, upper)`; the last bin also includes `upper`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
}

/// Histogram over a set of values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Histogram {
    /// Bins in ascending order.
    pub bins: Vec<HistogramBin>,
    /// Values counted (non-finite inputs are skipped).
    pub total: u64,
}

impl Histogram {
    /// Build a histogram with `bin_count` equal-width bins spanning the data.
    ///
    /// When every value is equal there is a single zero-width bin.
    pub fn from_values<I>(values: I, bin_count: usize) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let values: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if values.is_empty() || bin_count == 0 {
            return Self::default();
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let total = values.len() as u64;

        if max == min {
            return Self {
                bins: vec![HistogramBin {
                    lower: min,
                    upper: max,
                    count: total,
                }],
                total,
            };
        }

        let width = (max - min) / bin_count as f64;
        let mut bins: Vec<HistogramBin> = (0..bin_count)
            .map(|i| HistogramBin {
                lower: min + width * i as f64,
                upper: if i + 1 == bin_count { max } else { min + width * (i + 1) as f64 },
                count: 0,
            })
            .collect();

        for v in values {
            let idx = (((v - min) / width).floor() as usize).min(bin_count - 1);
            bins[idx].count += 1;
        }

        Self { bins, total }
    }

    /// Bin width (zero for a single-value histogram).
    pub fn bin_width(&self) -> f64 {
        self.bins.first().map_or(0.0, |b| b.upper - b.lower)
    }

    /// Number of bins.
    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    /// The bin holding the most values. Ties go to the lowest bin.
    pub fn mode_bin(&self) -> Option<&HistogramBin> {
        self.bins
            .iter()
            .fold(None, |best: Option<&HistogramBin>, bin| match best {
                Some(b) if b.count >= bin.count => Some(b),
                _ => Some(bin),
            })
    }
}
