//! ARIMA models estimated by conditional-sum-of-squares Gaussian
//! likelihood.
//!
//! The model for the d-times-differenced, mean-centered series w is the
//! ARMA recursion
//!
//! ```text
//! w_t = phi_1 w_{t-1} + ... + phi_p w_{t-p}
//!     + e_t + theta_1 e_{t-1} + ... + theta_q e_{t-q}
//! ```
//!
//! optionally multiplied by seasonal AR/MA polynomials at the seasonal
//! period. Coefficients are estimated by minimizing the conditional sum
//! of squared innovations with Nelder-Mead, starting from Hannan-Rissanen
//! estimates. Forecast intervals come from the cumulative psi-weight
//! variance of the integrated process under Gaussian innovations.

use crate::data::Series;
use crate::error::{PipelineError, Result};
use crate::models::optimize::NelderMead;
use crate::models::{Forecast, ForecastBand, ForecastModel, TrainedForecastModel};
use crate::stats::{self, difference, integrate, ols};
use crate::stationarity::is_constant;
use chrono::NaiveDate;
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;

/// Candidates with an AR or MA polynomial root inside this radius are
/// rejected as near-unit-root / near-non-invertible.
const ROOT_MARGIN: f64 = 1.02;

/// Objective value returned for inadmissible coefficient vectors.
const PENALTY: f64 = 1e12;

/// Seasonal part of an ARIMA order: multiplicative AR/MA polynomials at
/// the seasonal period (no seasonal differencing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonalOrder {
    pub p: usize,
    pub q: usize,
    pub period: usize,
}

/// An ARIMA(p,d,q) order, optionally with a seasonal part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub seasonal: Option<SeasonalOrder>,
}

impl ArimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self {
            p,
            d,
            q,
            seasonal: None,
        }
    }

    pub fn with_seasonal(mut self, p: usize, q: usize, period: usize) -> Self {
        if p > 0 || q > 0 {
            self.seasonal = Some(SeasonalOrder { p, q, period });
        }
        self
    }

    /// Number of estimated ARMA coefficients.
    pub fn param_count(&self) -> usize {
        let seasonal = self.seasonal.map(|s| s.p + s.q).unwrap_or(0);
        self.p + self.q + seasonal
    }

    /// Largest lag the model reaches back to, in observations.
    pub fn max_lag(&self) -> usize {
        let (sp, sq, s) = self
            .seasonal
            .map(|so| (so.p, so.q, so.period))
            .unwrap_or((0, 0, 1));
        (self.p + s * sp).max(self.q + s * sq)
    }

    /// Human-readable label, e.g. `ARIMA(2,1,1)` or `ARIMA(1,1,1)(1,0,1)[7]`.
    pub fn label(&self) -> String {
        match self.seasonal {
            Some(s) => format!(
                "ARIMA({},{},{})({},0,{})[{}]",
                self.p, self.d, self.q, s.p, s.q, s.period
            ),
            None => format!("ARIMA({},{},{})", self.p, self.d, self.q),
        }
    }
}

/// An ARIMA model specification, ready to fit.
#[derive(Debug, Clone)]
pub struct ArimaModel {
    order: ArimaOrder,
}

impl ArimaModel {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self {
            order: ArimaOrder::new(p, d, q),
        }
    }

    pub fn with_order(order: ArimaOrder) -> Self {
        Self { order }
    }

    pub fn order(&self) -> ArimaOrder {
        self.order
    }
}

/// A fitted ARIMA model. Immutable once fit; discarded after
/// forecasting and evaluation.
#[derive(Debug, Clone)]
pub struct TrainedArimaModel {
    order: ArimaOrder,
    /// Expanded AR coefficients (seasonal polynomial multiplied through)
    phi: Vec<f64>,
    /// Expanded MA coefficients
    theta: Vec<f64>,
    /// Mean of the differenced series (estimated only when d = 0)
    mean: f64,
    sigma2: f64,
    log_likelihood: f64,
    aic: f64,
    aicc: f64,
    bic: f64,
    converged: bool,
    /// Centered, differenced training values
    w: Vec<f64>,
    /// One-step innovations on the differenced scale
    residuals: Vec<f64>,
    /// Integration anchors from differencing
    tails: Vec<f64>,
    /// One-step fitted values on the original scale, aligned with the
    /// training series from index d onward
    fitted: Vec<f64>,
    last_date: NaiveDate,
}

impl ForecastModel for ArimaModel {
    type Trained = TrainedArimaModel;

    fn train(&self, series: &Series) -> Result<TrainedArimaModel> {
        let order = self.order;
        let values = &series.values;
        let last_date = series.last_date().ok_or_else(|| {
            PipelineError::Fit(format!("series {} has no observations", series.name))
        })?;

        if is_constant(values) {
            return Err(PipelineError::Fit(format!(
                "degenerate series {}: all {} values are identical",
                series.name,
                values.len()
            )));
        }
        let min_len = 2 * order.max_lag().max(1) + order.d + 2;
        if values.len() < min_len {
            return Err(PipelineError::Fit(format!(
                "series {} has {} observations, fewer than the {} required for {}",
                series.name,
                values.len(),
                min_len,
                order.label()
            )));
        }

        let diffed = difference(values, order.d)?;
        let mean = if order.d == 0 {
            stats::mean(&diffed.values)
        } else {
            0.0
        };
        let w: Vec<f64> = diffed.values.iter().map(|v| v - mean).collect();
        if is_constant(&w) {
            return Err(PipelineError::Fit(format!(
                "degenerate series {}: constant after differencing {} times",
                series.name, order.d
            )));
        }

        let start = starting_values(&w, order);
        let mut objective = |params: &[f64]| css_objective(&w, order, params);
        let start = if objective(&start) >= PENALTY {
            vec![0.05; order.param_count()]
        } else {
            start
        };

        let result = NelderMead::default().minimize(&mut objective, &start);
        if !result.converged {
            return Err(PipelineError::Fit(format!(
                "{} estimation did not converge on series {}",
                order.label(),
                series.name
            )));
        }

        let (phi, theta) = expand_coefficients(order, &result.point);
        if has_root_inside(&ar_polynomial(&phi), ROOT_MARGIN) {
            return Err(PipelineError::Fit(format!(
                "{} rejected: AR polynomial has a near-unit root",
                order.label()
            )));
        }
        if has_root_inside(&ma_polynomial(&theta), ROOT_MARGIN) {
            return Err(PipelineError::Fit(format!(
                "{} rejected: MA polynomial is near-non-invertible",
                order.label()
            )));
        }

        let eval = css(&w, &phi, &theta);
        if !eval.sigma2.is_finite() || eval.sigma2 <= 0.0 {
            return Err(PipelineError::Fit(format!(
                "{} has zero innovation variance on series {}",
                order.label(),
                series.name
            )));
        }

        // Parameter count for the information criteria: ARMA coefficients
        // plus the innovation variance, plus the mean when one was estimated.
        let k = (order.param_count() + 1 + usize::from(order.d == 0)) as f64;
        let nobs = eval.nobs as f64;
        let aic = 2.0 * k - 2.0 * eval.log_likelihood;
        let aicc = if nobs > k + 1.0 {
            aic + 2.0 * k * (k + 1.0) / (nobs - k - 1.0)
        } else {
            f64::INFINITY
        };
        let bic = k * nobs.ln() - 2.0 * eval.log_likelihood;

        // One-step fitted values on the original scale: differencing is
        // linear, so the one-step innovation on the differenced series is
        // the one-step innovation on the original series.
        let fitted: Vec<f64> = eval
            .residuals
            .iter()
            .enumerate()
            .map(|(i, e)| values[i + order.d] - e)
            .collect();

        Ok(TrainedArimaModel {
            order,
            phi,
            theta,
            mean,
            sigma2: eval.sigma2,
            log_likelihood: eval.log_likelihood,
            aic,
            aicc,
            bic,
            converged: result.converged,
            w,
            residuals: eval.residuals,
            tails: diffed.tails,
            fitted,
            last_date,
        })
    }

    fn name(&self) -> String {
        self.order.label()
    }
}

impl TrainedArimaModel {
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// Expanded AR coefficients (phi).
    pub fn ar(&self) -> &[f64] {
        &self.phi
    }

    /// Expanded MA coefficients (theta).
    pub fn ma(&self) -> &[f64] {
        &self.theta
    }

    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    pub fn aic(&self) -> f64 {
        self.aic
    }

    /// Corrected AIC, the criterion the order search minimizes.
    pub fn aicc(&self) -> f64 {
        self.aicc
    }

    pub fn bic(&self) -> f64 {
        self.bic
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    /// One-step innovations on the differenced scale.
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }
}

impl TrainedForecastModel for TrainedArimaModel {
    fn forecast(&self, horizon: usize, levels: &[f64]) -> Result<Forecast> {
        if horizon == 0 {
            return Err(PipelineError::Forecast(
                "forecast horizon must be at least 1".to_string(),
            ));
        }
        for &level in levels {
            if level <= 0.0 || level >= 1.0 {
                return Err(PipelineError::Forecast(format!(
                    "confidence level {} must be between 0 and 1",
                    level
                )));
            }
        }

        // Point forecasts: run the recursion forward with future
        // innovations at their expected value 0, then integrate back
        // through the differencing operations.
        let n = self.w.len();
        let mut extended = self.w.clone();
        for h in 0..horizon {
            let t = n + h;
            let mut value = 0.0;
            for (i, &phi) in self.phi.iter().enumerate() {
                if t >= i + 1 {
                    value += phi * extended[t - 1 - i];
                }
            }
            for (j, &theta) in self.theta.iter().enumerate() {
                if t >= j + 1 && t - 1 - j < n {
                    value += theta * self.residuals[t - 1 - j];
                }
            }
            extended.push(value);
        }
        let deltas: Vec<f64> = extended[n..].iter().map(|v| v + self.mean).collect();
        let points = integrate(&deltas, &self.tails);

        // Forecast-error variance from the psi weights of the integrated
        // process: psi recursion on phi(B) * (1 - B)^d.
        let phi_star = integrated_ar(&self.phi, self.order.d);
        let mut psi = vec![0.0; horizon];
        psi[0] = 1.0;
        for j in 1..horizon {
            let mut value = if j <= self.theta.len() {
                self.theta[j - 1]
            } else {
                0.0
            };
            for (i, &phi) in phi_star.iter().enumerate() {
                if j >= i + 1 {
                    value += phi * psi[j - 1 - i];
                }
            }
            psi[j] = value;
        }
        let mut cumulative = 0.0;
        let std_devs: Vec<f64> = psi
            .iter()
            .map(|p| {
                cumulative += p * p;
                (cumulative * self.sigma2).sqrt()
            })
            .collect();

        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| PipelineError::Forecast(format!("normal quantile unavailable: {}", e)))?;
        let mut bands = Vec::with_capacity(levels.len());
        for &level in levels {
            let z = normal.inverse_cdf(0.5 + level / 2.0);
            let lower: Vec<f64> = points
                .iter()
                .zip(std_devs.iter())
                .map(|(p, s)| p - z * s)
                .collect();
            let upper: Vec<f64> = points
                .iter()
                .zip(std_devs.iter())
                .map(|(p, s)| p + z * s)
                .collect();
            bands.push(ForecastBand {
                level,
                lower,
                upper,
            });
        }

        let dates: Vec<NaiveDate> = (1..=horizon)
            .map(|h| self.last_date + chrono::Duration::days(h as i64))
            .collect();

        Forecast::new(dates, points, bands)
    }

    fn fitted_values(&self) -> &[f64] {
        &self.fitted
    }

    fn name(&self) -> String {
        self.order.label()
    }
}

/// Result of evaluating the CSS recursion at fixed coefficients.
struct CssEval {
    residuals: Vec<f64>,
    sigma2: f64,
    log_likelihood: f64,
    nobs: usize,
}

/// Run the ARMA innovation recursion on the centered, differenced series
/// with pre-sample values treated as zero (conditional sum of squares).
fn css(w: &[f64], phi: &[f64], theta: &[f64]) -> CssEval {
    let n = w.len();
    let burn = phi.len().max(theta.len());
    let mut residuals = vec![0.0; n];
    for t in 0..n {
        let mut pred = 0.0;
        for (i, &ph) in phi.iter().enumerate() {
            if t >= i + 1 {
                pred += ph * w[t - 1 - i];
            }
        }
        for (j, &th) in theta.iter().enumerate() {
            if t >= j + 1 {
                pred += th * residuals[t - 1 - j];
            }
        }
        residuals[t] = w[t] - pred;
    }

    let nobs = n.saturating_sub(burn).max(1);
    let sse: f64 = residuals[n - nobs..].iter().map(|e| e * e).sum();
    let sigma2 = sse / nobs as f64;
    let log_likelihood = if sigma2 > 0.0 && sigma2.is_finite() {
        -0.5 * nobs as f64 * ((2.0 * PI * sigma2).ln() + 1.0)
    } else {
        f64::NEG_INFINITY
    };
    CssEval {
        residuals,
        sigma2,
        log_likelihood,
        nobs,
    }
}

/// CSS objective for the optimizer: sum of squared innovations, with a
/// large penalty outside the stationary/invertible region.
fn css_objective(w: &[f64], order: ArimaOrder, params: &[f64]) -> f64 {
    if params.iter().any(|p| !p.is_finite()) {
        return PENALTY;
    }
    let (phi, theta) = expand_coefficients(order, params);
    if has_root_inside(&ar_polynomial(&phi), ROOT_MARGIN)
        || has_root_inside(&ma_polynomial(&theta), ROOT_MARGIN)
    {
        return PENALTY;
    }
    let eval = css(w, &phi, &theta);
    let sse = eval.sigma2 * eval.nobs as f64;
    if sse.is_finite() {
        sse
    } else {
        PENALTY
    }
}

/// Split the flat parameter vector [phi, theta, seasonal phi, seasonal
/// theta] and multiply the seasonal polynomials through, producing the
/// expanded coefficient vectors the recursion runs on.
fn expand_coefficients(order: ArimaOrder, params: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut cursor = 0;
    let phi_ns = &params[cursor..cursor + order.p];
    cursor += order.p;
    let theta_ns = &params[cursor..cursor + order.q];
    cursor += order.q;

    let (sphi, stheta, period) = match order.seasonal {
        Some(s) => {
            let sphi = &params[cursor..cursor + s.p];
            cursor += s.p;
            let stheta = &params[cursor..cursor + s.q];
            (sphi, stheta, s.period)
        }
        None => (&params[0..0], &params[0..0], 1),
    };

    // Full lag polynomials: AR uses 1 - sum(phi_i B^i), MA uses
    // 1 + sum(theta_j B^j).
    let ar_full = convolve(
        &lag_polynomial(phi_ns, 1, -1.0),
        &lag_polynomial(sphi, period, -1.0),
    );
    let ma_full = convolve(
        &lag_polynomial(theta_ns, 1, 1.0),
        &lag_polynomial(stheta, period, 1.0),
    );

    let phi: Vec<f64> = ar_full[1..].iter().map(|c| -c).collect();
    let theta: Vec<f64> = ma_full[1..].to_vec();
    (phi, theta)
}

/// Build the full polynomial 1 + sign * (c_1 z^step + c_2 z^{2 step} + ...).
fn lag_polynomial(coeffs: &[f64], step: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coeffs.len() * step + 1];
    poly[0] = 1.0;
    for (i, &c) in coeffs.iter().enumerate() {
        poly[(i + 1) * step] = sign * c;
    }
    poly
}

fn convolve(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &ai) in a.iter().enumerate() {
        for (j, &bj) in b.iter().enumerate() {
            out[i + j] += ai * bj;
        }
    }
    out
}

/// Full AR polynomial 1 - sum(phi_i z^i) from expanded coefficients.
fn ar_polynomial(phi: &[f64]) -> Vec<f64> {
    let mut poly = Vec::with_capacity(phi.len() + 1);
    poly.push(1.0);
    poly.extend(phi.iter().map(|c| -c));
    poly
}

/// Full MA polynomial 1 + sum(theta_j z^j) from expanded coefficients.
fn ma_polynomial(theta: &[f64]) -> Vec<f64> {
    let mut poly = Vec::with_capacity(theta.len() + 1);
    poly.push(1.0);
    poly.extend_from_slice(theta);
    poly
}

/// Coefficients of the AR recursion for the integrated process, from
/// phi(B) * (1 - B)^d.
fn integrated_ar(phi: &[f64], d: usize) -> Vec<f64> {
    let mut poly = ar_polynomial(phi);
    for _ in 0..d {
        poly = convolve(&poly, &[1.0, -1.0]);
    }
    poly[1..].iter().map(|c| -c).collect()
}

/// Count whether the polynomial has any root with modulus at most
/// `radius`, by the winding number of its image of the circle.
fn has_root_inside(poly: &[f64], radius: f64) -> bool {
    let degree = match poly.iter().rposition(|c| c.abs() > 1e-12) {
        Some(0) | None => return false,
        Some(d) => d,
    };
    let samples = 256 * degree.max(4);
    let mut winding = 0.0;
    let mut prev_arg = 0.0;
    for k in 0..=samples {
        let theta = 2.0 * PI * k as f64 / samples as f64;
        let (zr, zi) = (radius * theta.cos(), radius * theta.sin());
        // Horner evaluation in complex arithmetic
        let (mut re, mut im) = (0.0, 0.0);
        for &c in poly[..=degree].iter().rev() {
            let new_re = re * zr - im * zi + c;
            let new_im = re * zi + im * zr;
            re = new_re;
            im = new_im;
        }
        let arg = im.atan2(re);
        if k > 0 {
            let mut delta = arg - prev_arg;
            if delta > PI {
                delta -= 2.0 * PI;
            } else if delta < -PI {
                delta += 2.0 * PI;
            }
            winding += delta;
        }
        prev_arg = arg;
    }
    (winding / (2.0 * PI)).round().abs() >= 1.0
}

/// Hannan-Rissanen starting values: a long autoregression supplies
/// preliminary innovations, then the ARMA coefficients come from one
/// least-squares pass on lagged values and lagged innovations. Falls back
/// to small constants when the regression is infeasible.
fn starting_values(w: &[f64], order: ArimaOrder) -> Vec<f64> {
    let k = order.param_count();
    if k == 0 {
        return Vec::new();
    }
    hannan_rissanen(w, order).unwrap_or_else(|_| vec![0.05; k])
}

fn hannan_rissanen(w: &[f64], order: ArimaOrder) -> Result<Vec<f64>> {
    let n = w.len();
    let (sp, sq, period) = order
        .seasonal
        .map(|s| (s.p, s.q, s.period))
        .unwrap_or((0, 0, 1));

    // Stage 1: long AR for preliminary innovations, only needed when the
    // model has MA terms.
    let needs_innovations = order.q > 0 || sq > 0;
    let long = (order.max_lag() + 3).clamp(4, 20).min(n / 4);
    let mut innovations = vec![0.0; n];
    let mut innovations_from = 0;
    if needs_innovations {
        if long == 0 || n <= 2 * long {
            return Err(PipelineError::Fit(
                "series too short for Hannan-Rissanen stage 1".to_string(),
            ));
        }
        let y: Vec<f64> = w[long..].to_vec();
        let x: Vec<Vec<f64>> = (long..n)
            .map(|t| (1..=long).map(|lag| w[t - lag]).collect())
            .collect();
        let fit = ols(&y, &x)?;
        for (i, r) in fit.residuals.iter().enumerate() {
            innovations[long + i] = *r;
        }
        innovations_from = long;
    }

    // Stage 2: regress w_t on its own lags and lagged innovations.
    let max_w_lag = order.p.max(sp * period);
    let max_e_lag = order.q.max(sq * period);
    let start_t = max_w_lag.max(innovations_from + max_e_lag).max(1);
    if n <= start_t + order.param_count() + 2 {
        return Err(PipelineError::Fit(
            "series too short for Hannan-Rissanen stage 2".to_string(),
        ));
    }

    let mut y = Vec::with_capacity(n - start_t);
    let mut x = Vec::with_capacity(n - start_t);
    for t in start_t..n {
        y.push(w[t]);
        let mut row = Vec::with_capacity(order.param_count());
        for lag in 1..=order.p {
            row.push(w[t - lag]);
        }
        for lag in 1..=order.q {
            row.push(innovations[t - lag]);
        }
        for lag in 1..=sp {
            row.push(w[t - lag * period]);
        }
        for lag in 1..=sq {
            row.push(innovations[t - lag * period]);
        }
        x.push(row);
    }

    let fit = ols(&y, &x)?;
    Ok(fit.coefficients)
}
