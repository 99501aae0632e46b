//! Forecasting models for daily surveillance series.

use crate::data::Series;
use crate::error::{PipelineError, Result};
use chrono::NaiveDate;
use std::fmt::Debug;

pub mod arima;
pub mod auto;
pub mod optimize;

pub use arima::{ArimaModel, ArimaOrder, SeasonalOrder, TrainedArimaModel};
pub use auto::AutoArima;

/// A confidence band around the point forecast at one confidence level.
#[derive(Debug, Clone)]
pub struct ForecastBand {
    /// Confidence level as a fraction in (0, 1), e.g. 0.95
    pub level: f64,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

/// An ordered h-step forecast: one date, point estimate and per-level
/// interval per step. Owned solely by the caller that requested it.
#[derive(Debug, Clone)]
pub struct Forecast {
    pub dates: Vec<NaiveDate>,
    pub points: Vec<f64>,
    pub bands: Vec<ForecastBand>,
}

impl Forecast {
    pub fn new(dates: Vec<NaiveDate>, points: Vec<f64>, bands: Vec<ForecastBand>) -> Result<Self> {
        if dates.len() != points.len() {
            return Err(PipelineError::Forecast(format!(
                "forecast has {} dates but {} points",
                dates.len(),
                points.len()
            )));
        }
        for band in &bands {
            if band.lower.len() != points.len() || band.upper.len() != points.len() {
                return Err(PipelineError::Forecast(format!(
                    "{}% band length does not match the {}-step horizon",
                    (band.level * 100.0).round(),
                    points.len()
                )));
            }
        }
        Ok(Self {
            dates,
            points,
            bands,
        })
    }

    /// Number of forecast steps.
    pub fn horizon(&self) -> usize {
        self.points.len()
    }

    /// The band at the given confidence level, if one was computed.
    pub fn band(&self, level: f64) -> Option<&ForecastBand> {
        self.bands
            .iter()
            .find(|b| (b.level - level).abs() < 1e-9)
    }

    /// The widest band, used for chart shading.
    pub fn widest_band(&self) -> Option<&ForecastBand> {
        self.bands
            .iter()
            .max_by(|a, b| a.level.partial_cmp(&b.level).expect("non-finite level"))
    }
}

/// A model specification that can be fit to a series.
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Fit the model to a series snapshot
    fn train(&self, series: &Series) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> String;
}

/// A fitted, immutable model that can forecast and report its in-sample
/// fit.
pub trait TrainedForecastModel: Debug {
    /// Forecast `horizon` steps ahead with intervals at the given
    /// confidence levels (fractions in (0, 1)).
    fn forecast(&self, horizon: usize, levels: &[f64]) -> Result<Forecast>;

    /// One-step-ahead fitted values on the original scale, aligned with
    /// the tail of the training series that survives differencing.
    fn fitted_values(&self) -> &[f64];

    /// Name of the fitted model, e.g. `ARIMA(2,1,1)`
    fn name(&self) -> String;
}
