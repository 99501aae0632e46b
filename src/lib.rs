//! # Epi Forecast
//!
//! A Rust library for epidemic surveillance time series analysis:
//! loading daily case/hospitalization/death counts, summary statistics,
//! classical trend/seasonal/residual decomposition, automatic ARIMA
//! forecasting and chart rendering.
//!
//! ## Features
//!
//! - CSV ingestion of daily surveillance counts with contiguity checks
//! - Six-number summary statistics per series
//! - Classical additive decomposition with a configurable period
//! - Automatic ARIMA order selection (ADF differencing, AICc grid search)
//!   with conditional-sum-of-squares estimation
//! - 30-day forecasts with 80%/95% confidence bands
//! - In-sample accuracy metrics and a merged forecast comparison table
//! - PNG chart rendering via the plotters bitmap backend
//!
//! ## Quick Start
//!
//! ```no_run
//! use epi_forecast::data::DataLoader;
//! use epi_forecast::models::{AutoArima, TrainedForecastModel};
//!
//! # fn main() -> epi_forecast::error::Result<()> {
//! // Load data
//! let set = DataLoader::from_csv("data/covid_daily.csv")?;
//!
//! // Select and fit an ARIMA model for the case counts
//! let selector = AutoArima::default();
//! let trained = selector.select(&set.cases)?;
//!
//! // Forecast 30 days ahead with 80% and 95% intervals
//! let forecast = trained.forecast(30, &[0.80, 0.95])?;
//! println!("day 1 point forecast: {}", forecast.points[0]);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod decompose;
pub mod error;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod plot;
pub mod stationarity;
pub mod stats;
pub mod summary;
pub mod table;

// Re-export commonly used types
pub use crate::config::PipelineConfig;
pub use crate::data::{DataLoader, Series, SeriesSet};
pub use crate::decompose::{decompose, Decomposition};
pub use crate::error::{PipelineError, Result};
pub use crate::models::{ArimaModel, AutoArima, Forecast, ForecastModel, TrainedForecastModel};
pub use crate::summary::SummaryTable;
pub use crate::table::ComparisonTable;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
