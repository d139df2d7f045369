use crate::{
    latency::LatencyTotals,
    row::{Cell, ReportRow, CANONICAL_HISTOGRAMS, NOT_APPLICABLE},
};
use chrono::NaiveDateTime;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, CellAlignment, Table};
use itertools::Itertools;
use rdbstat_ingest::{HistogramMap, HistogramRecord, RunConfig, RunSummary};
use std::{
    fmt,
    fs::File,
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to create report file")]
    Io(#[from] io::Error),
    #[error("Failed to write report")]
    Csv(#[from] csv::Error),
}

/// Everything extracted from a single run log
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub file: String,
    pub config: RunConfig,
    pub histograms: HistogramMap,
    pub latency: Option<LatencyTotals>,
    pub summary: RunSummary,
    pub row: ReportRow,
}

impl RunRecord {
    pub fn new(
        file: String,
        config: RunConfig,
        histograms: HistogramMap,
        latency: Option<LatencyTotals>,
        summary: RunSummary,
    ) -> Self {
        let row = ReportRow::assemble(
            &file,
            &config,
            Some(&histograms),
            latency.as_ref(),
            Some(&summary),
        );

        Self {
            file,
            config,
            histograms,
            latency,
            summary,
            row,
        }
    }
}

/// Accumulator for all runs of one invocation
#[derive(Debug, Clone, Default)]
pub struct Report {
    records: Vec<RunRecord>,
}

/// `rocksdb_stats_<YYYYMMDD_HHMMSS>.csv`
pub fn report_file_name(generated: NaiveDateTime) -> String {
    format!("rocksdb_stats_{}.csv", generated.format("%Y%m%d_%H%M%S"))
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: RunRecord) {
        debug!(file = %record.file, columns = record.row.len(), "Added row to report");
        self.records.push(record);
    }

    pub fn rows(&self) -> impl Iterator<Item = &ReportRow> {
        self.records.iter().map(|record| &record.row)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// union of the columns of all rows, in order of first appearance
    pub fn columns(&self) -> Vec<&str> {
        self.rows().flat_map(|row| row.columns()).unique().collect_vec()
    }

    /// write all rows as CSV, missing cells are written as `N/A`
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), ReportError> {
        let columns = self.columns();
        let mut writer = csv::Writer::from_writer(writer);

        writer.write_record(&columns)?;

        for row in self.rows() {
            writer.write_record(columns.iter().map(|column| {
                row.get(column)
                    .map(Cell::to_string)
                    .unwrap_or_else(|| NOT_APPLICABLE.to_string())
            }))?;
        }

        writer.flush()?;

        Ok(())
    }

    /// write the report into `directory`, named after `generated`
    pub fn save(
        &self,
        directory: &Path,
        generated: NaiveDateTime,
    ) -> Result<PathBuf, ReportError> {
        let path = directory.join(report_file_name(generated));

        self.write_csv(File::create(&path)?)?;
        info!(path = ?path, rows = self.len(), "Wrote report");

        Ok(path)
    }

    /// plain text summary of every run, one block per run
    pub fn render(&self) -> String {
        self.records
            .iter()
            .map(|record| format!("{record}\n"))
            .collect()
    }
}

impl fmt::Display for RunRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File: {}", self.file)?;
        writeln!(f, "  Configuration: {}", self.config)?;
        writeln!(f, "{}", histogram_table(&self.histograms))?;

        match &self.latency {
            Some(latency) => writeln!(f, "{}", latency_table(latency)),
            None => writeln!(f, "  No perf context found, latencies unavailable"),
        }
    }
}

fn histogram_table(histograms: &HistogramMap) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Histogram", "Count / Average / Min / Median / Max"]);

    for name in CANONICAL_HISTOGRAMS {
        if let Some(record) = histograms.get(name) {
            table.add_row(vec![name.to_string(), format_histogram(record)]);
        }
    }

    table
}

fn format_histogram(record: &HistogramRecord) -> String {
    fn field<T: ToString>(value: Option<T>) -> String {
        value
            .map(|value| value.to_string())
            .unwrap_or_else(|| NOT_APPLICABLE.to_string())
    }

    format!(
        "{} / {} / {} / {} / {}",
        field(record.count),
        field(record.average.map(|average| format!("{average:.4}"))),
        field(record.min),
        field(record.median.map(|median| format!("{median:.4}"))),
        field(record.max),
    )
}

fn latency_table(latency: &LatencyTotals) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Latency", "Seconds"]);

    for (column, seconds) in latency.columns() {
        table.add_row(vec![column.to_string(), format!("{seconds:.6}")]);
    }

    if let Some(seconds) = table.column_mut(1) {
        seconds.set_cell_alignment(CellAlignment::Right);
    }

    table
}
