use approx::assert_relative_eq;
use epi_forecast::stats::{acf, difference, integrate, mean, ols, quantile, variance};
use rstest::rstest;

#[test]
fn test_mean_and_variance() {
    let values = vec![2.0, 4.0, 6.0, 8.0];
    assert_relative_eq!(mean(&values), 5.0);
    assert_relative_eq!(variance(&values), 5.0);
    assert_eq!(mean(&[]), 0.0);
}

#[rstest]
#[case(0.0, 1.0)]
#[case(0.25, 2.0)]
#[case(0.5, 3.0)]
#[case(0.75, 4.0)]
#[case(1.0, 5.0)]
fn test_quantile_type7(#[case] q: f64, #[case] expected: f64) {
    // Unsorted on purpose; quantile sorts internally.
    let values = vec![3.0, 1.0, 5.0, 2.0, 4.0];
    assert_relative_eq!(quantile(&values, q).unwrap(), expected);
}

#[test]
fn test_quantile_interpolates() {
    let values = vec![1.0, 2.0, 3.0, 4.0];
    assert_relative_eq!(quantile(&values, 0.5).unwrap(), 2.5);
    assert_relative_eq!(quantile(&values, 0.25).unwrap(), 1.75);
}

#[test]
fn test_quantile_rejects_bad_input() {
    assert!(quantile(&[], 0.5).is_err());
    assert!(quantile(&[1.0], 1.5).is_err());
}

#[test]
fn test_acf_alternating_series() {
    let values: Vec<f64> = (0..40).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
    let r = acf(&values, 2);
    assert_relative_eq!(r[0], 1.0);
    assert!(r[1] < -0.9);
    assert!(r[2] > 0.9);
}

#[test]
fn test_ols_exact_line() {
    let x: Vec<Vec<f64>> = (0..20).map(|i| vec![1.0, i as f64]).collect();
    let y: Vec<f64> = (0..20).map(|i| 2.0 + 3.0 * i as f64).collect();
    let fit = ols(&y, &x).unwrap();
    assert_relative_eq!(fit.coefficients[0], 2.0, epsilon = 1e-8);
    assert_relative_eq!(fit.coefficients[1], 3.0, epsilon = 1e-8);
    for r in &fit.residuals {
        assert_relative_eq!(*r, 0.0, epsilon = 1e-8);
    }
}

#[test]
fn test_ols_rejects_singular_matrix() {
    // Two identical columns.
    let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64, i as f64]).collect();
    let y: Vec<f64> = (0..10).map(|i| i as f64).collect();
    assert!(ols(&y, &x).is_err());
}

#[test]
fn test_difference_records_tails() {
    let y = vec![0.0, 1.0, 4.0, 9.0, 16.0, 25.0];
    let diffed = difference(&y, 2).unwrap();
    assert_eq!(diffed.values.len(), 4);
    // tails[0] is the last original value, tails[1] the last first difference
    assert_relative_eq!(diffed.tails[0], 25.0);
    assert_relative_eq!(diffed.tails[1], 9.0);
    // Second differences of squares are constant 2.
    for v in &diffed.values {
        assert_relative_eq!(*v, 2.0);
    }
}

#[test]
fn test_difference_integrate_round_trip_d1() {
    let y = vec![3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
    let diffed = difference(&y, 1).unwrap();
    let rebuilt = integrate(&diffed.values, &[y[0]]);
    assert_eq!(rebuilt, y[1..].to_vec());
}

#[test]
fn test_difference_integrate_round_trip_d2() {
    let y = vec![3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
    let diffed = difference(&y, 2).unwrap();
    // Anchors: last level-0 and level-1 values before the continuation.
    let rebuilt = integrate(&diffed.values, &[y[1], y[1] - y[0]]);
    assert_eq!(rebuilt, y[2..].to_vec());
}

#[test]
fn test_difference_too_short() {
    assert!(difference(&[1.0, 2.0], 2).is_err());
}
