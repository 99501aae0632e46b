//! Shared numeric routines: moments, quantiles, autocorrelation,
//! ordinary least squares and the differencing/integration pair used by
//! the ARIMA machinery.

use crate::error::{PipelineError, Result};

/// Arithmetic mean. Returns 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance. Returns 0.0 for an empty slice.
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Linear-interpolation (type-7) quantile, the default convention of
/// most statistics environments.
///
/// `q` must be in [0, 1]; the input does not need to be sorted.
pub fn quantile(values: &[f64], q: f64) -> Result<f64> {
    if values.is_empty() {
        return Err(PipelineError::Fit(
            "cannot take a quantile of an empty series".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&q) {
        return Err(PipelineError::Fit(format!(
            "quantile {} outside [0, 1]",
            q
        )));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    Ok(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}

/// Sample autocorrelation function up to `max_lag` (inclusive).
/// Index 0 is always 1.0.
pub fn acf(values: &[f64], max_lag: usize) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let m = mean(values);
    let c0: f64 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n as f64;
    if c0 == 0.0 {
        return vec![1.0; max_lag.min(n - 1) + 1];
    }

    (0..=max_lag.min(n - 1))
        .map(|lag| {
            let ck: f64 = values[lag..]
                .iter()
                .zip(values.iter())
                .map(|(a, b)| (a - m) * (b - m))
                .sum::<f64>()
                / n as f64;
            ck / c0
        })
        .collect()
}

/// Result of an ordinary least squares regression.
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Estimated coefficients, one per regressor column
    pub coefficients: Vec<f64>,
    /// Residuals, one per observation
    pub residuals: Vec<f64>,
    /// Coefficient standard errors
    pub std_errors: Vec<f64>,
}

/// Ordinary least squares of `y` on the rows of `x` (each row is one
/// observation's regressor values). Solves the normal equations by
/// Gaussian elimination with partial pivoting.
pub fn ols(y: &[f64], x: &[Vec<f64>]) -> Result<OlsFit> {
    let n = y.len();
    if n == 0 || x.len() != n {
        return Err(PipelineError::Fit(
            "regression needs matching, non-empty y and x".to_string(),
        ));
    }
    let k = x[0].len();
    if k == 0 || n <= k {
        return Err(PipelineError::Fit(format!(
            "regression with {} observations and {} regressors is underdetermined",
            n, k
        )));
    }

    // Normal equations: (X'X) b = X'y
    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &yi) in x.iter().zip(y.iter()) {
        if row.len() != k {
            return Err(PipelineError::Fit(
                "ragged regressor matrix".to_string(),
            ));
        }
        for i in 0..k {
            xty[i] += row[i] * yi;
            for j in i..k {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..k {
        for j in 0..i {
            xtx[i][j] = xtx[j][i];
        }
    }

    let coefficients = solve_linear(&xtx, &xty)?;

    let residuals: Vec<f64> = x
        .iter()
        .zip(y.iter())
        .map(|(row, &yi)| {
            yi - row
                .iter()
                .zip(coefficients.iter())
                .map(|(xi, b)| xi * b)
                .sum::<f64>()
        })
        .collect();

    let sse: f64 = residuals.iter().map(|e| e * e).sum();
    let sigma2 = sse / (n - k) as f64;

    // Diagonal of (X'X)^-1, one solve per unit vector; k is small here.
    let mut std_errors = Vec::with_capacity(k);
    for j in 0..k {
        let mut unit = vec![0.0; k];
        unit[j] = 1.0;
        let col = solve_linear(&xtx, &unit)?;
        std_errors.push((sigma2 * col[j]).max(0.0).sqrt());
    }

    Ok(OlsFit {
        coefficients,
        residuals,
        std_errors,
    })
}

/// Solve `a x = b` by Gaussian elimination with partial pivoting.
fn solve_linear(a: &[Vec<f64>], b: &[f64]) -> Result<Vec<f64>> {
    let k = b.len();
    let mut m: Vec<Vec<f64>> = a
        .iter()
        .zip(b.iter())
        .map(|(row, &bi)| {
            let mut r = row.clone();
            r.push(bi);
            r
        })
        .collect();

    for col in 0..k {
        let pivot = (col..k)
            .max_by(|&i, &j| {
                m[i][col]
                    .abs()
                    .partial_cmp(&m[j][col].abs())
                    .expect("non-finite pivot")
            })
            .unwrap_or(col);
        if m[pivot][col].abs() < 1e-12 {
            return Err(PipelineError::Fit(
                "singular regressor matrix".to_string(),
            ));
        }
        m.swap(col, pivot);
        for row in col + 1..k {
            let factor = m[row][col] / m[col][col];
            for j in col..=k {
                m[row][j] -= factor * m[col][j];
            }
        }
    }

    let mut x = vec![0.0; k];
    for row in (0..k).rev() {
        let mut acc = m[row][k];
        for j in row + 1..k {
            acc -= m[row][j] * x[j];
        }
        x[row] = acc / m[row][row];
    }
    Ok(x)
}

/// A series differenced `d` times, together with the last observed value
/// at each differencing level, which anchors the inverse operation.
#[derive(Debug, Clone)]
pub struct Differenced {
    /// The d-times-differenced values (length shrinks by d)
    pub values: Vec<f64>,
    /// `tails[k]` is the last value of the k-times-differenced series,
    /// for k in 0..d
    pub tails: Vec<f64>,
}

/// Difference a series `d` times, recording the integration anchors.
pub fn difference(series: &[f64], d: usize) -> Result<Differenced> {
    if series.len() <= d {
        return Err(PipelineError::Fit(format!(
            "series of length {} cannot be differenced {} times",
            series.len(),
            d
        )));
    }

    let mut values = series.to_vec();
    let mut tails = Vec::with_capacity(d);
    for _ in 0..d {
        tails.push(*values.last().expect("non-empty by construction"));
        values = values.windows(2).map(|w| w[1] - w[0]).collect();
    }
    Ok(Differenced { values, tails })
}

/// Integrate a continuation of a d-times-differenced series back to the
/// original scale. `tails` must be the anchors recorded by [`difference`].
///
/// The round trip is exact: integrating the differenced continuation of a
/// series reproduces the original values.
pub fn integrate(deltas: &[f64], tails: &[f64]) -> Vec<f64> {
    let mut current = deltas.to_vec();
    for &anchor in tails.iter().rev() {
        let mut acc = anchor;
        for v in current.iter_mut() {
            acc += *v;
            *v = acc;
        }
    }
    current
}
