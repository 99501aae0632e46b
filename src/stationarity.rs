//! Unit-root testing and differencing-order selection.
//!
//! The forecaster decides the ARIMA differencing order d by repeated
//! augmented Dickey-Fuller testing: test, difference if non-stationary,
//! retest, up to a configured maximum.

use crate::error::{PipelineError, Result};
use crate::stats::{self, ols};

/// 5% critical value for the ADF t-statistic with a constant term.
const ADF_CRITICAL_5PCT: f64 = -2.86;

/// Result of an augmented Dickey-Fuller unit-root test.
#[derive(Debug, Clone)]
pub struct AdfTest {
    /// The t-statistic on the lagged level term
    pub statistic: f64,
    /// Number of augmenting lag terms used
    pub lags: usize,
    /// True when the unit-root null is rejected at the 5% level
    pub is_stationary: bool,
}

/// Augmented Dickey-Fuller test with a constant term.
///
/// Regresses the first difference on the lagged level and `lags`
/// augmenting difference terms; the null hypothesis is a unit root.
/// When `lags` is `None` the Schwert-style default `floor(cbrt(n - 1))`
/// is used.
pub fn adf_test(series: &[f64], lags: Option<usize>) -> Result<AdfTest> {
    let n = series.len();
    let lags = lags.unwrap_or_else(|| ((n.saturating_sub(1)) as f64).cbrt().floor() as usize);

    if n < lags + 10 {
        return Err(PipelineError::Fit(format!(
            "series of length {} is too short for an ADF test with {} lags",
            n, lags
        )));
    }

    let diffs: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    // Rows start where all augmenting lags are available.
    let mut y = Vec::new();
    let mut x = Vec::new();
    for t in lags..diffs.len() {
        y.push(diffs[t]);
        let mut row = Vec::with_capacity(lags + 2);
        row.push(1.0);
        row.push(series[t]); // lagged level: y_{t} precedes diff at t
        for i in 1..=lags {
            row.push(diffs[t - i]);
        }
        x.push(row);
    }

    let fit = ols(&y, &x)?;
    let statistic = if fit.std_errors[1] > 0.0 {
        fit.coefficients[1] / fit.std_errors[1]
    } else {
        0.0
    };

    Ok(AdfTest {
        statistic,
        lags,
        is_stationary: statistic < ADF_CRITICAL_5PCT,
    })
}

/// Choose the ARIMA differencing order by repeated unit-root testing.
///
/// Differences until the ADF test rejects the unit root or `max_d` is
/// reached. A constant series short-circuits to 0 since there is nothing
/// left to difference away.
pub fn choose_differencing(series: &[f64], max_d: usize) -> Result<usize> {
    let mut current = series.to_vec();
    for d in 0..max_d {
        if is_constant(&current) {
            return Ok(d);
        }
        let test = adf_test(&current, None)?;
        if test.is_stationary {
            return Ok(d);
        }
        current = current.windows(2).map(|w| w[1] - w[0]).collect();
    }
    Ok(max_d)
}

/// Detect a seasonal cycle by inspecting the autocorrelation at the
/// candidate period. Returns the period when its autocorrelation is a
/// clear spike (|acf| >= 0.3 and larger than its neighbours).
pub fn detect_seasonal_period(series: &[f64], candidate: usize) -> Option<usize> {
    if candidate < 2 || series.len() < 3 * candidate {
        return None;
    }
    let r = stats::acf(series, candidate + 1);
    if r.len() <= candidate + 1 {
        return None;
    }
    let at = r[candidate];
    if at.abs() >= 0.3 && at.abs() > r[candidate - 1].abs() && at.abs() > r[candidate + 1].abs() {
        Some(candidate)
    } else {
        None
    }
}

/// Whether every value of the series equals the first.
pub fn is_constant(series: &[f64]) -> bool {
    series
        .first()
        .map(|&first| series.iter().all(|&v| (v - first).abs() < f64::EPSILON))
        .unwrap_or(true)
}
