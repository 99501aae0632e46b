//! Error types for the epi_forecast crate

use thiserror::Error;

/// Custom error types for the epi_forecast crate
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Error while loading or validating input data
    #[error("Load error: {0}")]
    Load(String),

    /// Error while estimating a model (degenerate or too-short series)
    #[error("Fit error: {0}")]
    Fit(String),

    /// Error while producing a forecast from a fitted model
    #[error("Forecast error: {0}")]
    Forecast(String),

    /// Error while rendering charts or tables (non-fatal, skippable)
    #[error("Render error: {0}")]
    Render(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from CSV parsing
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from JSON serialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    /// Whether the error is a render failure, which the pipeline logs
    /// and skips instead of aborting.
    pub fn is_render(&self) -> bool {
        matches!(self, PipelineError::Render(_))
    }
}
