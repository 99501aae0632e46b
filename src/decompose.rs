//! Classical additive decomposition into trend, seasonal and residual
//! components.
//!
//! The trend is a centered moving average of window `period` (with
//! half-weight end terms when the period is even), the seasonal
//! component is the zero-centered mean of the detrended values at each
//! phase position, and the residual is what remains. Trend and residual
//! are undefined in the first and last `period / 2` slots.

use crate::error::{PipelineError, Result};

/// Result of an additive decomposition. All three component vectors are
/// the same length as the input series.
#[derive(Debug, Clone)]
pub struct Decomposition {
    /// Centered-moving-average trend; `None` at the boundary slots
    pub trend: Vec<Option<f64>>,
    /// Zero-centered seasonal pattern, repeated across the series
    pub seasonal: Vec<f64>,
    /// observed - trend - seasonal; `None` wherever trend is
    pub residual: Vec<Option<f64>>,
    /// The period the decomposition was computed at
    pub period: usize,
}

impl Decomposition {
    /// The seasonal pattern over a single period, starting at phase 0.
    pub fn seasonal_pattern(&self) -> &[f64] {
        &self.seasonal[..self.period.min(self.seasonal.len())]
    }
}

/// Decompose a series additively at the given period.
///
/// Requires at least two full periods of data.
pub fn decompose(values: &[f64], period: usize) -> Result<Decomposition> {
    let n = values.len();
    if period < 2 {
        return Err(PipelineError::Fit(format!(
            "decomposition period {} must be at least 2",
            period
        )));
    }
    if n < 2 * period {
        return Err(PipelineError::Fit(format!(
            "series of length {} is shorter than two periods ({})",
            n,
            2 * period
        )));
    }

    let trend = centered_moving_average(values, period);

    // Mean detrended value at each phase position modulo period.
    let mut phase_sums = vec![0.0; period];
    let mut phase_counts = vec![0usize; period];
    for (i, t) in trend.iter().enumerate() {
        if let Some(t) = t {
            phase_sums[i % period] += values[i] - t;
            phase_counts[i % period] += 1;
        }
    }
    let mut phase_means: Vec<f64> = phase_sums
        .iter()
        .zip(phase_counts.iter())
        .map(|(&s, &c)| if c > 0 { s / c as f64 } else { 0.0 })
        .collect();

    // Center so the seasonal component sums to zero over one period.
    let offset = phase_means.iter().sum::<f64>() / period as f64;
    for m in phase_means.iter_mut() {
        *m -= offset;
    }

    let seasonal: Vec<f64> = (0..n).map(|i| phase_means[i % period]).collect();

    let residual: Vec<Option<f64>> = trend
        .iter()
        .enumerate()
        .map(|(i, t)| t.map(|t| values[i] - t - seasonal[i]))
        .collect();

    Ok(Decomposition {
        trend,
        seasonal,
        residual,
        period,
    })
}

/// Centered moving average of window `period`. For an even period the
/// window is `period + 1` wide with half weights on both end terms, so
/// the average stays centered on the slot. Undefined at the first and
/// last `period / 2` slots.
fn centered_moving_average(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let half = period / 2;
    let mut out = vec![None; n];

    if period % 2 == 0 {
        for t in half..n.saturating_sub(half) {
            let mut sum = 0.5 * values[t - half] + 0.5 * values[t + half];
            for v in &values[t - half + 1..t + half] {
                sum += v;
            }
            out[t] = Some(sum / period as f64);
        }
    } else {
        for t in half..n.saturating_sub(half) {
            let sum: f64 = values[t - half..=t + half].iter().sum();
            out[t] = Some(sum / period as f64);
        }
    }
    out
}
