//! Forecast comparison table: the three per-series forecasts aligned by
//! forecast date.

use crate::error::Result;
use crate::models::Forecast;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// One row of the comparison table. A column is `None` when that series'
/// fit failed and the pipeline continued without it.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Forecasted_Cases")]
    pub forecasted_cases: Option<f64>,
    #[serde(rename = "Forecasted_Hospitalizations")]
    pub forecasted_hospitalizations: Option<f64>,
    #[serde(rename = "Forecasted_Deaths")]
    pub forecasted_deaths: Option<f64>,
}

/// The three forecasts merged into one date-aligned table.
#[derive(Debug, Clone)]
pub struct ComparisonTable {
    rows: Vec<ComparisonRow>,
    /// Number of rows shown by Display
    preview_rows: usize,
}

impl ComparisonTable {
    /// Build the table from whichever forecasts succeeded. All forecasts
    /// share the same horizon and start date, so alignment is by date
    /// with no interpolation or resampling.
    pub fn build(
        cases: Option<&Forecast>,
        hospitalizations: Option<&Forecast>,
        deaths: Option<&Forecast>,
    ) -> Self {
        #[derive(Default, Clone)]
        struct Cells {
            cases: Option<f64>,
            hospitalizations: Option<f64>,
            deaths: Option<f64>,
        }

        let mut by_date: BTreeMap<NaiveDate, Cells> = BTreeMap::new();
        if let Some(forecast) = cases {
            for (date, point) in forecast.dates.iter().zip(forecast.points.iter()) {
                by_date.entry(*date).or_default().cases = Some(*point);
            }
        }
        if let Some(forecast) = hospitalizations {
            for (date, point) in forecast.dates.iter().zip(forecast.points.iter()) {
                by_date.entry(*date).or_default().hospitalizations = Some(*point);
            }
        }
        if let Some(forecast) = deaths {
            for (date, point) in forecast.dates.iter().zip(forecast.points.iter()) {
                by_date.entry(*date).or_default().deaths = Some(*point);
            }
        }

        let rows = by_date
            .into_iter()
            .map(|(date, cells)| ComparisonRow {
                date,
                forecasted_cases: cells.cases,
                forecasted_hospitalizations: cells.hospitalizations,
                forecasted_deaths: cells.deaths,
            })
            .collect();

        Self {
            rows,
            preview_rows: 10,
        }
    }

    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }

    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Serialize the full table to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.rows)?)
    }
}

fn cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}", v),
        None => "-".to_string(),
    }
}

impl std::fmt::Display for ComparisonTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{:<12} {:>18} {:>28} {:>18}",
            "Date", "Forecasted_Cases", "Forecasted_Hospitalizations", "Forecasted_Deaths"
        )?;
        writeln!(f, "{:-<80}", "")?;
        for row in self.rows.iter().take(self.preview_rows) {
            writeln!(
                f,
                "{:<12} {:>18} {:>28} {:>18}",
                row.date.format("%Y-%m-%d").to_string(),
                cell(row.forecasted_cases),
                cell(row.forecasted_hospitalizations),
                cell(row.forecasted_deaths)
            )?;
        }
        Ok(())
    }
}
