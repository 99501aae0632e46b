//! Chart rendering for the analysis report.
//!
//! Charts are drawn with the plotters bitmap backend and saved as fixed
//! 1200x800 PNG files, which works in headless environments. Every
//! failure maps to a `Render` error; the pipeline logs and skips those
//! instead of aborting, since charts do not affect downstream data.

use crate::data::Series;
use crate::decompose::Decomposition;
use crate::error::{PipelineError, Result};
use crate::models::Forecast;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

const CHART_SIZE: (u32, u32) = (1200, 800);

fn render_err<E: std::fmt::Display>(e: E) -> PipelineError {
    PipelineError::Render(e.to_string())
}

/// Padded y-axis range over a set of values.
fn y_range<'a>(values: impl Iterator<Item = &'a f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.05).max(1.0);
    (min - pad, max + pad)
}

/// Line chart of the raw daily counts with the precomputed 7-day moving
/// average overlaid.
pub fn raw_and_average_chart(series: &Series, average: &Series, path: &Path) -> Result<()> {
    if series.is_empty() {
        return Err(PipelineError::Render(format!(
            "series {} has no data to plot",
            series.name
        )));
    }

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let n = series.len();
    let (y_min, y_max) = y_range(series.values.iter().chain(average.values.iter()));

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Daily {}", series.name), ("sans-serif", 36))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0f64..n as f64, y_min..y_max)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc("Day index")
        .y_desc("Count")
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(LineSeries::new(
            series.values.iter().enumerate().map(|(i, &v)| (i as f64, v)),
            &BLUE.mix(0.5),
        ))
        .map_err(render_err)?
        .label("daily count")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.mix(0.5)));

    chart
        .draw_series(LineSeries::new(
            average
                .values
                .iter()
                .enumerate()
                .map(|(i, &v)| (i as f64, v)),
            &RED,
        ))
        .map_err(render_err)?
        .label("7-day average")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// Four-panel decomposition chart: observed, trend, seasonal, residual.
pub fn decomposition_chart(
    series: &Series,
    decomposition: &Decomposition,
    path: &Path,
) -> Result<()> {
    if series.is_empty() {
        return Err(PipelineError::Render(format!(
            "series {} has no data to plot",
            series.name
        )));
    }

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let panels = root.split_evenly((4, 1));

    let observed: Vec<(f64, f64)> = series
        .values
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64, v))
        .collect();
    let trend: Vec<(f64, f64)> = decomposition
        .trend
        .iter()
        .enumerate()
        .filter_map(|(i, t)| t.map(|t| (i as f64, t)))
        .collect();
    let seasonal: Vec<(f64, f64)> = decomposition
        .seasonal
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64, v))
        .collect();
    let residual: Vec<(f64, f64)> = decomposition
        .residual
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.map(|r| (i as f64, r)))
        .collect();

    let x_max = series.len() as f64;
    draw_line_panel(&panels[0], &format!("{} observed", series.name), &observed, x_max)?;
    draw_line_panel(&panels[1], "trend", &trend, x_max)?;
    draw_line_panel(&panels[2], "seasonal", &seasonal, x_max)?;
    draw_line_panel(&panels[3], "residual", &residual, x_max)?;

    root.present().map_err(render_err)?;
    Ok(())
}

fn draw_line_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    caption: &str,
    points: &[(f64, f64)],
    x_max: f64,
) -> Result<()> {
    if points.is_empty() {
        return Err(PipelineError::Render(format!(
            "panel {} has no defined points",
            caption
        )));
    }
    let (y_min, y_max) = y_range(points.iter().map(|(_, y)| y));

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 20))
        .margin(8)
        .x_label_area_size(24)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..x_max, y_min..y_max)
        .map_err(render_err)?;

    chart.configure_mesh().draw().map_err(render_err)?;
    chart
        .draw_series(LineSeries::new(points.iter().copied(), &BLUE))
        .map_err(render_err)?;
    Ok(())
}

/// Forecast chart: recent observed values, the point forecast and the
/// shaded confidence bands.
pub fn forecast_chart(series: &Series, forecast: &Forecast, path: &Path) -> Result<()> {
    if series.is_empty() || forecast.horizon() == 0 {
        return Err(PipelineError::Render(format!(
            "nothing to plot for series {}",
            series.name
        )));
    }

    // Show the last 120 observed days for context.
    let tail_start = series.len().saturating_sub(120);
    let observed: Vec<(f64, f64)> = series.values[tail_start..]
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64, v))
        .collect();
    let offset = observed.len() as f64;
    let horizon = forecast.horizon();

    let band_values = forecast
        .bands
        .iter()
        .flat_map(|b| b.lower.iter().chain(b.upper.iter()));
    let (y_min, y_max) = y_range(
        observed
            .iter()
            .map(|(_, y)| y)
            .chain(forecast.points.iter())
            .chain(band_values),
    );

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} forecast ({} days)", series.name, horizon),
            ("sans-serif", 36),
        )
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0f64..offset + horizon as f64, y_min..y_max)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc("Day index")
        .y_desc("Count")
        .draw()
        .map_err(render_err)?;

    // Confidence bands, widest first so narrower levels stay visible.
    let mut bands: Vec<_> = forecast.bands.iter().collect();
    bands.sort_by(|a, b| b.level.partial_cmp(&a.level).expect("non-finite level"));
    for band in bands {
        let mut polygon: Vec<(f64, f64)> = band
            .upper
            .iter()
            .enumerate()
            .map(|(i, &v)| (offset + i as f64, v))
            .collect();
        polygon.extend(
            band.lower
                .iter()
                .enumerate()
                .rev()
                .map(|(i, &v)| (offset + i as f64, v)),
        );
        chart
            .draw_series(std::iter::once(Polygon::new(polygon, BLUE.mix(0.15))))
            .map_err(render_err)?;
    }

    chart
        .draw_series(LineSeries::new(observed.iter().copied(), &BLACK))
        .map_err(render_err)?
        .label("observed")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));

    chart
        .draw_series(LineSeries::new(
            forecast
                .points
                .iter()
                .enumerate()
                .map(|(i, &v)| (offset + i as f64, v)),
            &RED,
        ))
        .map_err(render_err)?
        .label("forecast")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}
