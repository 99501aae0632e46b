//! Batch report runner: load the surveillance CSV, run the full
//! analysis pipeline and write the report into the output directory.
//!
//! Usage: `epi_forecast [input.csv] [output_dir]`
//! Everything else is configuration, not flags; set `EPI_CONFIG` to a
//! JSON config file to override the defaults.

use epi_forecast::config::PipelineConfig;
use epi_forecast::pipeline;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = match std::env::var("EPI_CONFIG") {
        Ok(path) => match PipelineConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("invalid config file {}: {}", path, e);
                std::process::exit(1);
            }
        },
        Err(_) => PipelineConfig::default(),
    };

    let mut args = std::env::args().skip(1);
    if let Some(input) = args.next() {
        config.input_path = input.into();
    }
    if let Some(output) = args.next() {
        config.output_dir = output.into();
    }

    let report = match pipeline::run(&config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("pipeline aborted: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = pipeline::write_report(&config, &report) {
        eprintln!("failed to write report: {}", e);
        std::process::exit(1);
    }

    print!("{}", pipeline::format_report(&report));
}
