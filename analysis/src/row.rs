use crate::latency::LatencyTotals;
use indexmap::IndexMap;
use rdbstat_ingest::{BloomBeforeLevel, HistogramMap, HistogramRecord, RunConfig, RunSummary};
use std::fmt;

/// marker written for columns a row has no value for
pub const NOT_APPLICABLE: &str = "N/A";

/// Energy histograms reported as columns, in column order. The benchmark may
/// print others (e.g. `DB_GET_RET1_CORE_JOULES`), those are not reported.
pub const CANONICAL_HISTOGRAMS: [&str; 12] = [
    "DB_GET_CORE_JOULES",
    "DB_GET_FILTER_CORE_JOULES",
    "DB_GET_INDEX_CORE_JOULES",
    "DB_GET_DISK_CORE_JOULES",
    "DB_GET_PACKAGE_JOULES",
    "DB_GET_FILTER_PACKAGE_JOULES",
    "DB_GET_INDEX_PACKAGE_JOULES",
    "DB_GET_DISK_PACKAGE_JOULES",
    "DB_GET_DRAM_JOULES",
    "DB_GET_FILTER_DRAM_JOULES",
    "DB_GET_INDEX_DRAM_JOULES",
    "DB_GET_DISK_DRAM_JOULES",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Int(value) => Some(*value as f64),
            Self::Bool(_) | Self::Text(_) => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<u64> for Cell {
    fn from(value: u64) -> Self {
        // counts beyond i64 are not produced by the benchmark
        i64::try_from(value)
            .map(Self::Int)
            .unwrap_or(Self::Float(value as f64))
    }
}

/// One report record per run, columns keep insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportRow {
    cells: IndexMap<String, Cell>,
}

impl ReportRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge everything known about a run. Inputs that are `None` leave their
    /// columns out of the row.
    pub fn assemble(
        file: &str,
        config: &RunConfig,
        histograms: Option<&HistogramMap>,
        latency: Option<&LatencyTotals>,
        summary: Option<&RunSummary>,
    ) -> Self {
        let mut row = Self::new();

        row.set("File", Cell::Text(file.to_string()));
        row.set("Direct_IO", Cell::Bool(config.direct_io));
        row.set("Cache_Size_MB", Cell::from(config.cache_size_mb));
        row.set("Filter_Type", Cell::Text(config.filter_type.to_string()));
        row.set("Bits_Per_Key", Cell::Int(i64::from(config.bits_per_key)));
        row.set(
            "Bloom_Before_Level",
            match config.bloom_before_level {
                BloomBeforeLevel::Level(level) => Cell::Int(level),
                BloomBeforeLevel::NotApplicable => Cell::Text(NOT_APPLICABLE.to_string()),
            },
        );

        if let Some(histograms) = histograms {
            for name in CANONICAL_HISTOGRAMS {
                if let Some(record) = histograms.get(name) {
                    row.push_histogram(name, record);
                }
            }
        }

        if let Some(latency) = latency {
            for (column, seconds) in latency.columns() {
                row.set(column, Cell::Float(seconds));
            }
        }

        if let Some(summary) = summary {
            if let Some(seconds) = summary.bulk_load_seconds {
                row.set("Bulk_Load_Seconds", Cell::Float(seconds));
            }
            if let Some(seconds) = summary.query_seconds {
                row.set("Query_Seconds", Cell::Float(seconds));
            }
            if let Some(count) = summary.queries_ok {
                row.set("Queries_Ok", Cell::from(count));
            }
            if let Some(count) = summary.queries_not_found {
                row.set("Queries_Not_Found", Cell::from(count));
            }
        }

        row
    }

    fn push_histogram(&mut self, name: &str, record: &HistogramRecord) {
        if let Some(count) = record.count {
            self.set(format!("{name}_Count"), Cell::from(count));
        }
        if let Some(average) = record.average {
            self.set(format!("{name}_Average"), Cell::Float(average));
        }
        if let Some(min) = record.min {
            self.set(format!("{name}_Min"), Cell::from(min));
        }
        if let Some(median) = record.median {
            self.set(format!("{name}_Median"), Cell::Float(median));
        }
        if let Some(max) = record.max {
            self.set(format!("{name}_Max"), Cell::from(max));
        }
    }

    /// set a column, replacing an existing value in place
    pub fn set(&mut self, column: impl Into<String>, cell: Cell) {
        self.cells.insert(column.into(), cell);
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdbstat_ingest::extract_histograms;

    fn config() -> RunConfig {
        RunConfig::from_file_name("direct_io_disabled_cache_0MB_bloom_b10.txt").unwrap()
    }

    #[test]
    fn config_only_row() {
        let row = ReportRow::assemble("run.txt", &config(), None, None, None);

        assert_eq!(
            row.columns().collect::<Vec<_>>(),
            [
                "File",
                "Direct_IO",
                "Cache_Size_MB",
                "Filter_Type",
                "Bits_Per_Key",
                "Bloom_Before_Level"
            ]
        );
        assert_eq!(row.get("Direct_IO"), Some(&Cell::Bool(false)));
        assert_eq!(row.get("Filter_Type"), Some(&Cell::Text("Bloom".into())));
        assert_eq!(row.get("Bloom_Before_Level"), Some(&Cell::Text("N/A".into())));
        assert_eq!(row.get("CPU_Latency"), None);
    }

    #[test]
    fn histograms_follow_canonical_order() {
        let histograms = extract_histograms(
            "DB_GET_DRAM_JOULES\nCount: 3 Average: 0.5\n-----\n\
             DB_GET_RET2_CORE_JOULES\nCount: 9 Average: 9.0\n-----\n\
             DB_GET_CORE_JOULES\nCount: 10 Average: 2.5\nMin: 1 Median: 2.0 Max: 5\n-----\n",
        );
        let row = ReportRow::assemble("run.txt", &config(), Some(&histograms), None, None);
        let histogram_columns = row.columns().skip(6).collect::<Vec<_>>();

        assert_eq!(
            histogram_columns,
            [
                "DB_GET_CORE_JOULES_Count",
                "DB_GET_CORE_JOULES_Average",
                "DB_GET_CORE_JOULES_Min",
                "DB_GET_CORE_JOULES_Median",
                "DB_GET_CORE_JOULES_Max",
                "DB_GET_DRAM_JOULES_Count",
                "DB_GET_DRAM_JOULES_Average",
            ]
        );
        assert_eq!(
            row.get("DB_GET_CORE_JOULES_Average"),
            Some(&Cell::Float(2.5))
        );
        assert!(row.columns().all(|column| !column.contains("RET2")));
    }

    #[test]
    fn latency_and_summary_columns_are_appended() {
        let latency = LatencyTotals {
            cpu_seconds: 0.25,
            index_io_seconds: 0.1,
            filter_io_seconds: 0.0,
            disk_io_seconds: 0.5,
        };
        let summary = RunSummary {
            query_seconds: Some(1.5),
            queries_ok: Some(10),
            ..RunSummary::default()
        };
        let row = ReportRow::assemble("run.txt", &config(), None, Some(&latency), Some(&summary));

        assert_eq!(
            row.columns().skip(6).collect::<Vec<_>>(),
            [
                "CPU_Latency",
                "Index_IO_Latency",
                "Filter_IO_Latency",
                "Disk_IO_Latency",
                "Query_Seconds",
                "Queries_Ok"
            ]
        );
        // present but zero is still reported
        assert_eq!(row.get("Filter_IO_Latency"), Some(&Cell::Float(0.0)));
        assert_eq!(row.get("Queries_Ok"), Some(&Cell::Int(10)));
    }

    #[test]
    fn huge_counts_do_not_wrap() {
        assert_eq!(Cell::from(u64::MAX), Cell::Float(u64::MAX as f64));
        assert_eq!(Cell::from(7u64), Cell::Int(7));
    }

    #[test]
    fn overwritten_column_keeps_its_position() {
        let mut row = ReportRow::new();
        row.set("File", Cell::Text("a.txt".into()));
        row.set("Query_Seconds", Cell::Float(1.0));
        row.set("File", Cell::Text("b.txt".into()));

        assert_eq!(row.columns().collect::<Vec<_>>(), ["File", "Query_Seconds"]);
        assert_eq!(row.get("File"), Some(&Cell::Text("b.txt".into())));
        assert_eq!(row.len(), 2);
    }
}
