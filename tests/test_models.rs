use approx::assert_relative_eq;
use chrono::NaiveDate;
use epi_forecast::data::Series;
use epi_forecast::models::{ArimaModel, ArimaOrder, AutoArima, ForecastModel, TrainedForecastModel};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()
}

fn daily_series(name: &str, values: Vec<f64>) -> Series {
    let dates = (0..values.len())
        .map(|i| start_date() + chrono::Duration::days(i as i64))
        .collect();
    Series::new(name, dates, values).unwrap()
}

fn ar1(n: usize, phi: f64, sigma: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, sigma).unwrap();
    let mut values = Vec::with_capacity(n);
    let mut prev = 0.0;
    for _ in 0..n {
        prev = phi * prev + normal.sample(&mut rng);
        values.push(prev);
    }
    values
}

#[test]
fn test_ar1_coefficient_recovery() {
    let series = daily_series("cases", ar1(400, 0.7, 1.0, 42));
    let trained = ArimaModel::new(1, 0, 0).train(&series).unwrap();

    assert!(trained.converged());
    assert_eq!(trained.ar().len(), 1);
    assert!(
        (trained.ar()[0] - 0.7).abs() < 0.2,
        "estimated phi = {}",
        trained.ar()[0]
    );
    assert!(trained.sigma2() > 0.0);
    assert!(trained.aicc().is_finite());
    assert!(trained.aicc() >= trained.aic());
}

#[test]
fn test_random_walk_forecast_is_flat_at_last_value() {
    // ARIMA(0,1,0) with no mean: every point forecast equals the last
    // observed value.
    let values: Vec<f64> = ar1(200, 0.5, 1.0, 7)
        .iter()
        .scan(100.0, |acc, e| {
            *acc += e;
            Some(*acc)
        })
        .collect();
    let last = *values.last().unwrap();
    let series = daily_series("cases", values);

    let trained = ArimaModel::new(0, 1, 0).train(&series).unwrap();
    let forecast = trained.forecast(10, &[0.95]).unwrap();

    for point in &forecast.points {
        assert_relative_eq!(*point, last, epsilon = 1e-9);
    }
}

#[test]
fn test_forecast_dates_and_lengths() {
    let series = daily_series("cases", ar1(150, 0.5, 1.0, 3));
    let trained = ArimaModel::new(1, 0, 1).train(&series).unwrap();
    let forecast = trained.forecast(30, &[0.80, 0.95]).unwrap();

    assert_eq!(forecast.horizon(), 30);
    assert_eq!(forecast.dates.len(), 30);
    assert_eq!(forecast.bands.len(), 2);
    let day_after = series.last_date().unwrap() + chrono::Duration::days(1);
    assert_eq!(forecast.dates[0], day_after);
    assert_eq!(
        forecast.dates[29],
        series.last_date().unwrap() + chrono::Duration::days(30)
    );
}

#[test]
fn test_interval_widths_are_monotone_and_nested() {
    let series = daily_series("cases", ar1(250, 0.6, 2.0, 11));
    let trained = ArimaModel::new(1, 0, 0).train(&series).unwrap();
    let forecast = trained.forecast(20, &[0.80, 0.95]).unwrap();

    let band80 = forecast.band(0.80).unwrap();
    let band95 = forecast.band(0.95).unwrap();

    let mut prev_width = 0.0;
    for h in 0..20 {
        let w80 = band80.upper[h] - band80.lower[h];
        let w95 = band95.upper[h] - band95.lower[h];
        assert!(w80 > 0.0);
        // 95% band contains the 80% band
        assert!(w95 > w80);
        assert!(band95.lower[h] <= band80.lower[h]);
        assert!(band95.upper[h] >= band80.upper[h]);
        // widths never shrink with the horizon
        assert!(w95 >= prev_width - 1e-9);
        prev_width = w95;
    }
}

#[test]
fn test_fitted_values_align_with_training_series() {
    let series = daily_series("cases", ar1(120, 0.5, 1.0, 5));
    let trained = ArimaModel::new(1, 1, 0).train(&series).unwrap();
    // d = 1 drops one observation
    assert_eq!(trained.fitted_values().len(), series.len() - 1);

    let trained = ArimaModel::new(1, 0, 0).train(&series).unwrap();
    assert_eq!(trained.fitted_values().len(), series.len());
}

#[test]
fn test_constant_series_is_degenerate() {
    let series = daily_series("deaths", vec![797.0; 60]);
    let err = AutoArima::default().select(&series).unwrap_err();
    assert!(err.to_string().contains("degenerate series deaths"));
}

#[test]
fn test_too_short_series_is_rejected() {
    let series = daily_series("cases", ar1(10, 0.5, 1.0, 1));
    let err = AutoArima::default().select(&series).unwrap_err();
    assert!(err.to_string().contains("fewer than twice"));
}

#[test]
fn test_auto_selects_within_bounds() {
    let selector = AutoArima {
        max_p: 2,
        max_q: 2,
        max_seasonal_p: 0,
        max_seasonal_q: 0,
        ..AutoArima::default()
    };
    let series = daily_series("cases", ar1(300, 0.7, 1.0, 23));
    let trained = selector.select(&series).unwrap();

    let order = trained.order();
    assert!(order.p <= 2);
    assert!(order.q <= 2);
    assert!(order.d <= 2);
    assert!(trained.aicc().is_finite());

    let forecast = trained.forecast(30, &[0.80, 0.95]).unwrap();
    assert_eq!(forecast.horizon(), 30);
}

#[test]
fn test_auto_beats_worst_candidate_on_aicc() {
    let selector = AutoArima {
        max_p: 2,
        max_q: 2,
        max_seasonal_p: 0,
        max_seasonal_q: 0,
        ..AutoArima::default()
    };
    let series = daily_series("cases", ar1(300, 0.7, 1.0, 29));
    let best = selector.select(&series).unwrap();
    // The search space contains the pure-noise model at the same d, so
    // the winner can never score worse than it.
    let baseline = ArimaModel::with_order(ArimaOrder::new(0, best.order().d, 0))
        .train(&series)
        .unwrap();
    assert!(best.aicc() <= baseline.aicc() + 1e-9);
}

#[test]
fn test_forecast_rejects_bad_arguments() {
    let series = daily_series("cases", ar1(100, 0.5, 1.0, 31));
    let trained = ArimaModel::new(0, 0, 0).train(&series).unwrap();
    assert!(trained.forecast(0, &[0.95]).is_err());
    assert!(trained.forecast(10, &[1.5]).is_err());
    assert!(trained.forecast(10, &[0.0]).is_err());
}

#[test]
fn test_order_labels() {
    assert_eq!(ArimaOrder::new(2, 1, 1).label(), "ARIMA(2,1,1)");
    assert_eq!(
        ArimaOrder::new(1, 1, 1).with_seasonal(1, 0, 7).label(),
        "ARIMA(1,1,1)(1,0,0)[7]"
    );
    // A (0,0) seasonal part collapses to the non-seasonal label.
    assert_eq!(
        ArimaOrder::new(1, 0, 0).with_seasonal(0, 0, 7).label(),
        "ARIMA(1,0,0)"
    );
}
