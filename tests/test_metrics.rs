use approx::assert_relative_eq;
use epi_forecast::metrics::evaluate_forecast;

#[test]
fn test_known_errors() {
    let fitted = vec![1.0, 2.0, 3.0];
    let actual = vec![2.0, 2.0, 4.0];
    let m = evaluate_forecast(&fitted, &actual).unwrap();

    assert_relative_eq!(m.mae, 2.0 / 3.0);
    assert_relative_eq!(m.mse, 2.0 / 3.0);
    assert_relative_eq!(m.rmse, (2.0f64 / 3.0).sqrt());
}

#[test]
fn test_perfect_fit_is_zero_error() {
    let values = vec![10.0, 20.0, 30.0, 40.0];
    let m = evaluate_forecast(&values, &values).unwrap();
    assert_relative_eq!(m.mae, 0.0);
    assert_relative_eq!(m.rmse, 0.0);
    assert_relative_eq!(m.mape, 0.0);
    assert_relative_eq!(m.smape, 0.0);
}

#[test]
fn test_mape_skips_zero_actuals() {
    let fitted = vec![1.0, 5.0];
    let actual = vec![0.0, 10.0];
    let m = evaluate_forecast(&fitted, &actual).unwrap();
    // Only the second pair contributes: |5| / 10 * 100 over n = 2.
    assert_relative_eq!(m.mape, 25.0);
    // SMAPE handles the zero pair via its symmetric denominator.
    assert!(m.smape.is_finite());
}

#[test]
fn test_rejects_mismatched_or_empty_input() {
    assert!(evaluate_forecast(&[1.0], &[1.0, 2.0]).is_err());
    assert!(evaluate_forecast(&[], &[]).is_err());
}

#[test]
fn test_display_lists_all_metrics() {
    let m = evaluate_forecast(&[1.0, 2.0], &[2.0, 2.0]).unwrap();
    let text = format!("{}", m);
    for label in ["MAE", "MSE", "RMSE", "MAPE", "SMAPE"] {
        assert!(text.contains(label), "missing {}", label);
    }
}
