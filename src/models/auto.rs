//! Automatic ARIMA order selection.
//!
//! Differencing order d comes from repeated augmented unit-root testing;
//! p and q (plus seasonal P and Q when a seasonal cycle is detected) are
//! searched over small integer grids and scored by corrected AIC.
//! Candidates that fail to estimate (non-convergence, near-unit-root or
//! near-non-invertible fits) are skipped, so a convergence failure falls
//! back to the next-best candidate automatically.

use crate::config::PipelineConfig;
use crate::data::Series;
use crate::error::{PipelineError, Result};
use crate::models::arima::{ArimaModel, ArimaOrder, TrainedArimaModel};
use crate::models::ForecastModel;
use crate::stationarity::{choose_differencing, detect_seasonal_period, is_constant};
use crate::stats::difference;
use tracing::debug;

/// Automatic ARIMA order search.
#[derive(Debug, Clone)]
pub struct AutoArima {
    pub max_p: usize,
    pub max_q: usize,
    pub max_d: usize,
    pub max_seasonal_p: usize,
    pub max_seasonal_q: usize,
    /// Candidate seasonal period checked by the detector
    pub seasonal_period: usize,
}

impl Default for AutoArima {
    fn default() -> Self {
        Self {
            max_p: 5,
            max_q: 5,
            max_d: 2,
            max_seasonal_p: 2,
            max_seasonal_q: 2,
            seasonal_period: 7,
        }
    }
}

impl AutoArima {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            max_p: config.max_p,
            max_q: config.max_q,
            max_d: config.max_d,
            max_seasonal_p: config.max_seasonal_p,
            max_seasonal_q: config.max_seasonal_q,
            seasonal_period: config.seasonal_period,
        }
    }

    /// Select, fit and return the best ARIMA model for the series.
    pub fn select(&self, series: &Series) -> Result<TrainedArimaModel> {
        let values = &series.values;
        if is_constant(values) {
            return Err(PipelineError::Fit(format!(
                "degenerate series {}: all {} values are identical",
                series.name,
                values.len()
            )));
        }
        let largest_order = (self.max_p + self.seasonal_period * self.max_seasonal_p)
            .max(self.max_q + self.seasonal_period * self.max_seasonal_q);
        if values.len() < 2 * largest_order {
            return Err(PipelineError::Fit(format!(
                "series {} has {} observations, fewer than twice the maximum candidate order {}",
                series.name,
                values.len(),
                largest_order
            )));
        }

        let d = choose_differencing(values, self.max_d)?;
        let diffed = difference(values, d)?;
        let seasonal_period = detect_seasonal_period(&diffed.values, self.seasonal_period);
        debug!(
            series = %series.name,
            d,
            seasonal_period,
            "order search starting"
        );

        let seasonal_grid: Vec<(usize, usize)> = match seasonal_period {
            Some(_) => (0..=self.max_seasonal_p)
                .flat_map(|sp| (0..=self.max_seasonal_q).map(move |sq| (sp, sq)))
                .collect(),
            None => vec![(0, 0)],
        };

        let mut best: Option<TrainedArimaModel> = None;
        for p in 0..=self.max_p {
            for q in 0..=self.max_q {
                for &(sp, sq) in &seasonal_grid {
                    let order = ArimaOrder::new(p, d, q).with_seasonal(
                        sp,
                        sq,
                        seasonal_period.unwrap_or(0),
                    );
                    match ArimaModel::with_order(order).train(series) {
                        Ok(candidate) => {
                            if !candidate.aicc().is_finite() {
                                continue;
                            }
                            let replace = match &best {
                                None => true,
                                Some(current) => {
                                    candidate.aicc() < current.aicc() - 1e-9
                                        || ((candidate.aicc() - current.aicc()).abs() <= 1e-9
                                            && order.param_count()
                                                < current.order().param_count())
                                }
                            };
                            if replace {
                                best = Some(candidate);
                            }
                        }
                        Err(e) => {
                            debug!(series = %series.name, order = %order.label(), error = %e, "candidate skipped");
                        }
                    }
                }
            }
        }

        best.ok_or_else(|| {
            PipelineError::Fit(format!(
                "no ARIMA candidate could be estimated for series {}",
                series.name
            ))
        })
    }
}

impl ForecastModel for AutoArima {
    type Trained = TrainedArimaModel;

    fn train(&self, series: &Series) -> Result<TrainedArimaModel> {
        self.select(series)
    }

    fn name(&self) -> String {
        "auto-ARIMA".to_string()
    }
}
