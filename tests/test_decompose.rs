use approx::assert_relative_eq;
use epi_forecast::decompose::decompose;
use std::f64::consts::PI;

/// Linear trend plus a pure weekly sinusoid, no noise.
fn trend_plus_weekly(n: usize) -> Vec<f64> {
    (0..n)
        .map(|t| 2.0 * t as f64 + 10.0 * (2.0 * PI * t as f64 / 7.0).sin())
        .collect()
}

#[test]
fn test_recovers_linear_trend_and_weekly_pattern() {
    let values = trend_plus_weekly(140);
    let d = decompose(&values, 7).unwrap();

    // A centered moving average over a full period removes the sinusoid
    // exactly and preserves the linear trend exactly.
    for t in 10..130 {
        let trend = d.trend[t].unwrap();
        assert_relative_eq!(trend, 2.0 * t as f64, epsilon = 1e-8);
    }
    for (i, &s) in d.seasonal_pattern().iter().enumerate() {
        assert_relative_eq!(s, 10.0 * (2.0 * PI * i as f64 / 7.0).sin(), epsilon = 1e-6);
    }
    for r in d.residual.iter().flatten() {
        assert_relative_eq!(*r, 0.0, epsilon = 1e-6);
    }
}

#[test]
fn test_components_reconstruct_observed() {
    let values: Vec<f64> = (0..60)
        .map(|t| 100.0 + 0.5 * t as f64 + ((t * 7919) % 13) as f64)
        .collect();
    let d = decompose(&values, 7).unwrap();

    for (i, &observed) in values.iter().enumerate() {
        if let (Some(trend), Some(residual)) = (d.trend[i], d.residual[i]) {
            assert_relative_eq!(observed, trend + d.seasonal[i] + residual, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_seasonal_sums_to_zero_over_one_period() {
    let values = trend_plus_weekly(70);
    let d = decompose(&values, 7).unwrap();
    let sum: f64 = d.seasonal_pattern().iter().sum();
    assert_relative_eq!(sum, 0.0, epsilon = 1e-9);
    // The pattern repeats verbatim across the series.
    for i in 0..d.seasonal.len() {
        assert_relative_eq!(d.seasonal[i], d.seasonal_pattern()[i % 7]);
    }
}

#[test]
fn test_boundary_slots_are_undefined() {
    let values = trend_plus_weekly(50);
    let d = decompose(&values, 7).unwrap();
    // period 7: first and last 3 slots have no centered window
    for i in 0..3 {
        assert!(d.trend[i].is_none());
        assert!(d.residual[i].is_none());
        assert!(d.trend[49 - i].is_none());
        assert!(d.residual[49 - i].is_none());
    }
    assert!(d.trend[3].is_some());
    assert!(d.trend[46].is_some());
}

#[test]
fn test_even_period_uses_half_weight_ends() {
    // For a linear series the centered MA reproduces the line exactly,
    // even period included; without the half-weight end terms it would
    // be shifted by half a slot.
    let values: Vec<f64> = (0..30).map(|t| 3.0 * t as f64).collect();
    let d = decompose(&values, 4).unwrap();
    for t in 2..28 {
        assert_relative_eq!(d.trend[t].unwrap(), 3.0 * t as f64, epsilon = 1e-9);
    }
}

#[test]
fn test_rejects_short_series_and_bad_period() {
    let values = trend_plus_weekly(13);
    let err = decompose(&values, 7).unwrap_err();
    assert!(err.to_string().contains("shorter than two periods"));
    assert!(decompose(&values, 1).is_err());
}
