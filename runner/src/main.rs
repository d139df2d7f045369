mod collector;
mod config;
mod pipeline;


use clap::Parser;
use config::ReportConfig;
use std::{path::PathBuf, process::exit};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Extract perf context, energy histograms and run timings from the logs of
/// a RocksDB benchmark sweep into a single CSV report
#[derive(Parser, Debug)]
#[command(name = "rdbstat", version)]
struct Cli {
    /// YAML configuration file, flags below take precedence over it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the run logs [default: .]
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory the report is written to [default: input directory]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Glob narrowing down candidate file names [default: *.txt]
    #[arg(short, long)]
    glob: Option<String>,

    /// Do not print the per run summary
    #[arg(short, long)]
    quiet: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<ReportConfig, config::ConfigErrors> {
        let mut config = match &self.config {
            Some(path) => ReportConfig::load(path)?,
            None => ReportConfig::default(),
        };

        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(output) = self.output {
            config.output = Some(output);
        }
        if let Some(glob) = self.glob {
            config.glob = glob;
        }
        if self.quiet {
            config.console = false;
        }

        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {e}");
            exit(1)
        }
    };
    debug!(config = ?config, "Using configuration");

    if config.preflight_checks() {
        error!("Configuration contains errors, aborting");
        exit(1)
    }

    match pipeline::run(&config) {
        Ok(emitted) => debug!(rows = emitted.report.len(), path = ?emitted.path, "Done"),
        Err(e) => {
            error!(error = ?e, "{e}");
            exit(1)
        }
    }
}
