//! Surveillance data loading and the in-memory series types.
//!
//! The input is a static CSV of daily COVID-19 counts: a
//! `date_of_interest` column in `MM/DD/YYYY` format, the three integer
//! count columns, and three precomputed 7-day-average columns that are
//! consumed directly by the plotting layer (never recomputed).

use crate::error::{PipelineError, Result};
use chrono::NaiveDate;
use std::io::Read;
use std::path::Path;

const DATE_COLUMN: &str = "date_of_interest";
const DATE_FORMAT: &str = "%m/%d/%Y";

const COUNT_COLUMNS: [&str; 3] = ["CASE_COUNT", "HOSPITALIZED_COUNT", "DEATH_COUNT"];
const AVG_COLUMNS: [&str; 3] = [
    "CASE_COUNT_7DAY_AVG",
    "HOSP_COUNT_7DAY_AVG",
    "DEATH_COUNT_7DAY_AVG",
];

/// A named daily series: ordered (date, value) pairs, one per calendar
/// day with no gaps.
#[derive(Debug, Clone)]
pub struct Series {
    pub name: String,
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(name: impl Into<String>, dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(PipelineError::Load(format!(
                "series has {} dates but {} values",
                dates.len(),
                values.len()
            )));
        }
        Ok(Self {
            name: name.into(),
            dates,
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The last observed date, if any.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

/// The cleaned, date-sorted set of all six series from the input file.
/// Invariant: every series has the same length and date range.
#[derive(Debug, Clone)]
pub struct SeriesSet {
    pub cases: Series,
    pub hospitalizations: Series,
    pub deaths: Series,
    pub cases_7day_avg: Series,
    pub hospitalizations_7day_avg: Series,
    pub deaths_7day_avg: Series,
}

impl SeriesSet {
    /// The three raw count series in pipeline order.
    pub fn count_series(&self) -> [&Series; 3] {
        [&self.cases, &self.hospitalizations, &self.deaths]
    }

    /// Raw count series paired with their 7-day-average companions.
    pub fn count_series_with_averages(&self) -> [(&Series, &Series); 3] {
        [
            (&self.cases, &self.cases_7day_avg),
            (&self.hospitalizations, &self.hospitalizations_7day_avg),
            (&self.deaths, &self.deaths_7day_avg),
        ]
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Loader for the surveillance CSV.
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load and clean the surveillance CSV at `path`.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<SeriesSet> {
        let file = std::fs::File::open(path.as_ref()).map_err(|e| {
            PipelineError::Load(format!(
                "cannot open {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_reader(file)
    }

    /// Load and clean surveillance data from any reader.
    ///
    /// Rows are sorted by date; duplicate or missing date rows are load
    /// errors. A missing numeric cell becomes 0; there is no
    /// interpolation.
    pub fn from_reader<R: Read>(reader: R) -> Result<SeriesSet> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let date_idx = find_column(&headers, DATE_COLUMN)?;
        let count_idx: Vec<usize> = COUNT_COLUMNS
            .iter()
            .map(|c| find_column(&headers, c))
            .collect::<Result<_>>()?;
        let avg_idx: Vec<usize> = AVG_COLUMNS
            .iter()
            .map(|c| find_column(&headers, c))
            .collect::<Result<_>>()?;

        // (date, three counts, three averages) per row
        let mut rows: Vec<(NaiveDate, [f64; 3], [f64; 3])> = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let raw_date = record.get(date_idx).unwrap_or("");
            let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).map_err(|_| {
                PipelineError::Load(format!(
                    "column {} has unparseable date {:?} (expected MM/DD/YYYY)",
                    DATE_COLUMN, raw_date
                ))
            })?;

            let mut counts = [0.0; 3];
            for (slot, (&idx, name)) in count_idx.iter().zip(COUNT_COLUMNS.iter()).enumerate() {
                counts[slot] = parse_cell(record.get(idx), name, date)?;
            }
            let mut avgs = [0.0; 3];
            for (slot, (&idx, name)) in avg_idx.iter().zip(AVG_COLUMNS.iter()).enumerate() {
                avgs[slot] = parse_cell(record.get(idx), name, date)?;
            }
            rows.push((date, counts, avgs));
        }

        if rows.is_empty() {
            return Err(PipelineError::Load("input file has no data rows".to_string()));
        }

        rows.sort_by_key(|(date, _, _)| *date);

        // Contiguity: one row per calendar day, no duplicates, no gaps.
        for pair in rows.windows(2) {
            let (prev, next) = (pair[0].0, pair[1].0);
            if next == prev {
                return Err(PipelineError::Load(format!("duplicate date row {}", next)));
            }
            let expected = prev.succ_opt().ok_or_else(|| {
                PipelineError::Load(format!("date {} out of calendar range", prev))
            })?;
            if next != expected {
                return Err(PipelineError::Load(format!(
                    "missing date row {} (series jumps from {} to {})",
                    expected, prev, next
                )));
            }
        }

        let dates: Vec<NaiveDate> = rows.iter().map(|(d, _, _)| *d).collect();
        let column = |extract: fn(&(NaiveDate, [f64; 3], [f64; 3])) -> f64| -> Vec<f64> {
            rows.iter().map(extract).collect()
        };

        Ok(SeriesSet {
            cases: Series::new("cases", dates.clone(), column(|r| r.1[0]))?,
            hospitalizations: Series::new("hospitalizations", dates.clone(), column(|r| r.1[1]))?,
            deaths: Series::new("deaths", dates.clone(), column(|r| r.1[2]))?,
            cases_7day_avg: Series::new("cases_7day_avg", dates.clone(), column(|r| r.2[0]))?,
            hospitalizations_7day_avg: Series::new(
                "hospitalizations_7day_avg",
                dates.clone(),
                column(|r| r.2[1]),
            )?,
            deaths_7day_avg: Series::new("deaths_7day_avg", dates, column(|r| r.2[2]))?,
        })
    }
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .ok_or_else(|| PipelineError::Load(format!("input file is missing column {}", name)))
}

/// Parse a numeric cell. Empty cells become 0 (the documented zero-fill
/// policy); non-empty cells that fail to parse name the offending column.
/// `NaN`/`inf` literals parse as f64 but are not counts, so they are
/// rejected the same way.
fn parse_cell(raw: Option<&str>, column: &str, date: NaiveDate) -> Result<f64> {
    let raw = raw.unwrap_or("").trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(PipelineError::Load(format!(
            "column {} has non-numeric value {:?} on {}",
            column, raw, date
        ))),
    }
}
