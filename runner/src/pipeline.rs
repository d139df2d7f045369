use crate::{
    collector::{Collector, CollectorError},
    config::ReportConfig,
};
use chrono::{Local, NaiveDateTime};
use rdbstat_analysis::{LatencyTotals, Report, ReportError, RunRecord};
use rdbstat_ingest::{
    extract_counters, extract_histograms, read_log, IngestError, RunConfig, RunSummary,
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to collect run logs")]
    Collect(#[from] CollectorError),
    #[error("Failed to ingest run log")]
    Ingest(#[from] IngestError),
    #[error("Failed to write report")]
    Report(#[from] ReportError),
}

/// Result of one invocation
#[derive(Debug)]
pub struct Emitted {
    pub report: Report,
    /// `None` if no run log was found
    pub path: Option<PathBuf>,
}

impl Emitted {
    /// what is printed to stdout for this invocation when console output is on
    pub fn console_text(&self, input: &Path) -> String {
        match &self.path {
            Some(path) => format!(
                "{}Report written to {}\n",
                self.report.render(),
                path.to_string_lossy()
            ),
            None => format!("No run logs found in {}\n", input.to_string_lossy()),
        }
    }
}

/// Extract everything from a single log, `None` if the file name does not
/// follow the run naming scheme.
#[instrument(level = "debug")]
pub fn process_file(path: &Path) -> Result<Option<RunRecord>, IngestError> {
    let Some(file) = path.file_name().and_then(|name| name.to_str()) else {
        debug!("Skipped path without a valid file name");

        return Ok(None);
    };

    let Some(config) = RunConfig::from_file_name(file) else {
        debug!("Skipped file outside the run naming scheme");

        return Ok(None);
    };

    let text = read_log(path)?;

    let latency = match extract_counters(&text) {
        Some(counters) => {
            debug!(counters = counters.len(), "Parsed perf context");

            Some(LatencyTotals::from_counters(&counters))
        }
        None => {
            warn!(file = file, "Run log lacks the closing perf context, latencies are left empty");

            None
        }
    };

    let histograms = extract_histograms(&text);
    let summary = RunSummary::extract(&text);

    info!(
        file = file,
        histograms = histograms.len(),
        "Processed run log for {config}"
    );

    Ok(Some(RunRecord::new(
        file.to_string(),
        config,
        histograms,
        latency,
        summary,
    )))
}

/// Build the report of all run logs the collector hands out
pub fn collect(collector: Collector) -> Result<Report, PipelineError> {
    let mut report = Report::new();
    let total = collector.len();

    for path in collector {
        if let Some(record) = process_file(&path)? {
            report.push(record);
        }
    }

    info!("Accepted {}/{} candidate files", report.len(), total);

    Ok(report)
}

/// Collect and process the input directory and write the report into the
/// output directory, nothing is written if no run log was found.
pub fn run(config: &ReportConfig) -> Result<Emitted, PipelineError> {
    run_at(config, Local::now().naive_local())
}

pub fn run_at(config: &ReportConfig, generated: NaiveDateTime) -> Result<Emitted, PipelineError> {
    let report = collect(Collector::load(config)?)?;

    let path = if report.is_empty() {
        info!(input = ?config.input, "No run logs found, no report written");

        None
    } else {
        Some(report.save(config.output_dir(), generated)?)
    };

    let emitted = Emitted { report, path };

    if config.console {
        print!("{}", emitted.console_text(&config.input));
    }

    Ok(emitted)
}
