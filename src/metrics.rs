//! Accuracy metrics for fitted forecasts.
//!
//! The evaluator compares in-sample fitted values against observed values
//! over the training window. There is no holdout split; the metrics
//! describe fit quality, not out-of-sample accuracy.

use crate::error::{PipelineError, Result};

/// Forecast accuracy metrics
#[derive(Debug, Clone)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error
    pub mape: f64,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
}

/// Calculate accuracy metrics for fitted values against observed values.
///
/// MAPE skips pairs whose actual value is zero but still divides by the
/// full observation count, so zero-actual days pull the average down
/// rather than blowing it up. SMAPE handles those days via its symmetric
/// denominator.
pub fn evaluate_forecast(fitted: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    if fitted.len() != actual.len() || fitted.is_empty() {
        return Err(PipelineError::Forecast(
            "fitted and actual values must have the same non-zero length".to_string(),
        ));
    }

    let n = fitted.len() as f64;

    let errors: Vec<f64> = fitted
        .iter()
        .zip(actual.iter())
        .map(|(&f, &a)| a - f)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;
    let rmse = mse.sqrt();

    let mape = actual
        .iter()
        .zip(errors.iter())
        .filter(|(&a, _)| a != 0.0)
        .map(|(&a, &e)| (e.abs() / a.abs()) * 100.0)
        .sum::<f64>()
        / n;

    let smape = actual
        .iter()
        .zip(fitted.iter())
        .map(|(&a, &f)| {
            let denom = a.abs() + f.abs();
            if denom == 0.0 {
                0.0
            } else {
                200.0 * (a - f).abs() / denom
            }
        })
        .sum::<f64>()
        / n;

    Ok(ForecastAccuracy {
        mae,
        mse,
        rmse,
        mape,
        smape,
    })
}

impl std::fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "In-sample Accuracy Metrics:")?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:  {:.4}%", self.mape)?;
        writeln!(f, "  SMAPE: {:.4}%", self.smape)?;
        Ok(())
    }
}
