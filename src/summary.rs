//! Summary statistics for the loaded series.

use crate::data::SeriesSet;
use crate::error::Result;
use crate::stats::{mean, quantile};

/// Six-number summary of a series: min, first quartile, median, mean,
/// third quartile, max.
#[derive(Debug, Clone)]
pub struct SummaryStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub mean: f64,
    pub q3: f64,
    pub max: f64,
}

impl SummaryStats {
    pub fn from_values(values: &[f64]) -> Result<Self> {
        Ok(Self {
            min: quantile(values, 0.0)?,
            q1: quantile(values, 0.25)?,
            median: quantile(values, 0.5)?,
            mean: mean(values),
            q3: quantile(values, 0.75)?,
            max: quantile(values, 1.0)?,
        })
    }
}

/// Summary table over all three count series.
#[derive(Debug, Clone)]
pub struct SummaryTable {
    rows: Vec<(String, SummaryStats)>,
}

impl SummaryTable {
    pub fn from_series_set(set: &SeriesSet) -> Result<Self> {
        let mut rows = Vec::with_capacity(3);
        for series in set.count_series() {
            rows.push((series.name.clone(), SummaryStats::from_values(&series.values)?));
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[(String, SummaryStats)] {
        &self.rows
    }
}

impl std::fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{:<20} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "Series", "Min", "1Q", "Median", "Mean", "3Q", "Max"
        )?;
        writeln!(f, "{:-<84}", "")?;
        for (name, stats) in &self.rows {
            writeln!(
                f,
                "{:<20} {:>10.1} {:>10.1} {:>10.1} {:>10.1} {:>10.1} {:>10.1}",
                name, stats.min, stats.q1, stats.median, stats.mean, stats.q3, stats.max
            )?;
        }
        Ok(())
    }
}
