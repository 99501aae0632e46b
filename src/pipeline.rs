//! The end-to-end batch pipeline: load, summarize, plot, decompose,
//! forecast, evaluate, tabulate.
//!
//! Single-threaded and batch-oriented: load once, process once, render
//! once. Fit errors abort only the affected series; the others continue
//! independently. Render and decomposition-chart failures are logged and
//! skipped since they do not affect downstream data.

use crate::config::PipelineConfig;
use crate::data::{DataLoader, Series, SeriesSet};
use crate::decompose::decompose;
use crate::error::Result;
use crate::metrics::{evaluate_forecast, ForecastAccuracy};
use crate::models::{AutoArima, Forecast, TrainedForecastModel};
use crate::plot;
use crate::summary::SummaryTable;
use crate::table::ComparisonTable;
use std::fmt::Write as _;
use tracing::{info, warn};

/// Per-series results: the selected model, its in-sample accuracy and
/// the forecast.
#[derive(Debug)]
pub struct SeriesReport {
    pub name: String,
    pub model: String,
    pub aicc: f64,
    pub accuracy: ForecastAccuracy,
    pub forecast: Forecast,
}

/// Everything the pipeline produced.
#[derive(Debug)]
pub struct PipelineReport {
    pub summary: SummaryTable,
    pub series: Vec<SeriesReport>,
    /// Series that failed to fit, with the error text
    pub failures: Vec<(String, String)>,
    pub table: ComparisonTable,
}

/// Load the configured input file and run the full pipeline.
pub fn run(config: &PipelineConfig) -> Result<PipelineReport> {
    config.validate()?;
    info!(path = %config.input_path.display(), "loading surveillance data");
    let set = DataLoader::from_csv(&config.input_path)?;
    info!(rows = set.len(), "loaded and cleaned");
    run_with_data(config, &set)
}

/// Run the pipeline on already-loaded data.
pub fn run_with_data(config: &PipelineConfig, set: &SeriesSet) -> Result<PipelineReport> {
    config.validate()?;
    if config.render_charts {
        std::fs::create_dir_all(&config.output_dir)?;
    }

    let summary = SummaryTable::from_series_set(set)?;

    if config.render_charts {
        for (series, average) in set.count_series_with_averages() {
            let path = config.output_dir.join(format!("{}_daily.png", series.name));
            if let Err(e) = plot::raw_and_average_chart(series, average, &path) {
                warn!(series = %series.name, error = %e, "skipping daily chart");
            }
        }
    }

    let selector = AutoArima::from_config(config);
    let mut reports = Vec::new();
    let mut failures = Vec::new();
    for series in set.count_series() {
        // Decomposition feeds only the exploratory chart; its failure
        // does not block forecasting.
        match decompose(&series.values, config.period) {
            Ok(decomposition) => {
                if config.render_charts {
                    let path = config
                        .output_dir
                        .join(format!("{}_decomposition.png", series.name));
                    if let Err(e) = plot::decomposition_chart(series, &decomposition, &path) {
                        warn!(series = %series.name, error = %e, "skipping decomposition chart");
                    }
                }
            }
            Err(e) => {
                warn!(series = %series.name, period = config.period, error = %e, "decomposition skipped");
            }
        }

        match forecast_series(config, &selector, series) {
            Ok(report) => {
                if config.render_charts {
                    let path = config
                        .output_dir
                        .join(format!("{}_forecast.png", series.name));
                    if let Err(e) = plot::forecast_chart(series, &report.forecast, &path) {
                        warn!(series = %series.name, error = %e, "skipping forecast chart");
                    }
                }
                reports.push(report);
            }
            Err(e) => {
                warn!(series = %series.name, error = %e, "series aborted");
                failures.push((series.name.clone(), e.to_string()));
            }
        }
    }

    let find = |name: &str| -> Option<&Forecast> {
        reports
            .iter()
            .find(|r| r.name == name)
            .map(|r| &r.forecast)
    };
    let table = ComparisonTable::build(
        find("cases"),
        find("hospitalizations"),
        find("deaths"),
    )
    .with_preview_rows(config.table_rows);

    Ok(PipelineReport {
        summary,
        series: reports,
        failures,
        table,
    })
}

fn forecast_series(
    config: &PipelineConfig,
    selector: &AutoArima,
    series: &Series,
) -> Result<SeriesReport> {
    let trained = selector.select(series)?;
    let order = trained.order();
    info!(
        series = %series.name,
        model = %order.label(),
        aicc = trained.aicc(),
        "model selected"
    );

    let forecast = trained.forecast(config.horizon, &config.confidence_levels)?;
    let accuracy = evaluate_forecast(trained.fitted_values(), &series.values[order.d..])?;

    Ok(SeriesReport {
        name: series.name.clone(),
        model: order.label(),
        aicc: trained.aicc(),
        accuracy,
        forecast,
    })
}

/// Render the report as plain text.
pub fn format_report(report: &PipelineReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Summary statistics");
    let _ = writeln!(out, "{}", report.summary);
    for series in &report.series {
        let _ = writeln!(
            out,
            "{}: {} (AICc {:.2})",
            series.name, series.model, series.aicc
        );
        let _ = writeln!(out, "{}", series.accuracy);
    }
    for (name, error) in &report.failures {
        let _ = writeln!(out, "{}: fit failed: {}", name, error);
    }
    let _ = writeln!(out, "Forecast comparison");
    let _ = writeln!(out, "{}", report.table);
    out
}

/// Write the plain-text report and the JSON forecast table into the
/// configured output directory.
pub fn write_report(config: &PipelineConfig, report: &PipelineReport) -> Result<()> {
    std::fs::create_dir_all(&config.output_dir)?;
    std::fs::write(config.output_dir.join("report.txt"), format_report(report))?;
    std::fs::write(
        config.output_dir.join("forecast_table.json"),
        report.table.to_json()?,
    )?;
    Ok(())
}
