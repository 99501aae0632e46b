use epi_forecast::stationarity::{
    adf_test, choose_differencing, detect_seasonal_period, is_constant,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

fn white_noise(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    (0..n).map(|_| normal.sample(&mut rng)).collect()
}

#[test]
fn test_adf_rejects_unit_root_for_white_noise() {
    let series = white_noise(300, 7);
    let test = adf_test(&series, None).unwrap();
    assert!(test.is_stationary, "statistic was {}", test.statistic);
    assert!(test.statistic < -2.86);
}

#[test]
fn test_adf_default_lag_rule() {
    let series = white_noise(217, 11);
    let test = adf_test(&series, None).unwrap();
    // floor(cbrt(216)) = 6
    assert_eq!(test.lags, 6);
}

#[test]
fn test_adf_rejects_short_series() {
    assert!(adf_test(&[1.0, 2.0, 3.0], Some(2)).is_err());
}

#[test]
fn test_choose_differencing_trending_series_needs_one() {
    // Steep drift with small noise: the level regression cannot reject,
    // the first difference is stationary.
    let noise = white_noise(300, 13);
    let series: Vec<f64> = noise
        .iter()
        .enumerate()
        .map(|(t, e)| 5.0 * t as f64 + 0.2 * e)
        .collect();
    let d = choose_differencing(&series, 2).unwrap();
    assert!(d >= 1);
    assert!(d <= 2);
}

#[test]
fn test_choose_differencing_stationary_series_needs_none() {
    let series = white_noise(300, 17);
    assert_eq!(choose_differencing(&series, 2).unwrap(), 0);
}

#[test]
fn test_choose_differencing_constant_series_short_circuits() {
    let series = vec![42.0; 100];
    assert_eq!(choose_differencing(&series, 2).unwrap(), 0);
}

#[test]
fn test_detect_seasonal_period_finds_weekly_cycle() {
    let series: Vec<f64> = (0..140)
        .map(|t| 10.0 * (2.0 * PI * t as f64 / 7.0).sin())
        .collect();
    assert_eq!(detect_seasonal_period(&series, 7), Some(7));
}

#[test]
fn test_detect_seasonal_period_rejects_noise_and_short_input() {
    let series = white_noise(300, 19);
    assert_eq!(detect_seasonal_period(&series, 7), None);
    assert_eq!(detect_seasonal_period(&series[..15], 7), None);
}

#[test]
fn test_is_constant() {
    assert!(is_constant(&[3.0, 3.0, 3.0]));
    assert!(is_constant(&[]));
    assert!(!is_constant(&[3.0, 3.0, 3.1]));
}
