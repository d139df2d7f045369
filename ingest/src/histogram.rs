use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::str::FromStr;
use tracing::trace;
use tracing_unwrap::ResultExt;

/// A histogram name at the start of a line, followed by the statistics rocksdb
/// prints for it and terminated by a line of dashes.
static HISTOGRAM_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?ms)^(DB_[A-Z0-9_]+)\r?\n(Count.*?)\n-+").unwrap_or_log()
});

static COUNT_AVERAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Count:[ \t]*(\d+)[ \t]+Average:[ \t]*([-+]?\d+(?:\.\d+)?(?:[eE][-+]?\d+)?)")
        .unwrap_or_log()
});

static MIN_MEDIAN_MAX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"Min:[ \t]*(\d+)[ \t]+Median:[ \t]*([-+]?\d+(?:\.\d+)?(?:[eE][-+]?\d+)?)[ \t]+Max:[ \t]*(\d+)",
    )
    .unwrap_or_log()
});

/// Summary statistics of one histogram, every field is optional since a block
/// may lack either of its statistic lines
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistogramRecord {
    pub count: Option<u64>,
    pub average: Option<f64>,
    pub min: Option<u64>,
    pub median: Option<f64>,
    pub max: Option<u64>,
}

impl HistogramRecord {
    /// parse the statistics region of a single block
    pub fn parse(stats: &str) -> Self {
        let mut record = Self::default();

        if let Some(captures) = COUNT_AVERAGE.captures(stats) {
            record.count = group(&captures, 1);
            record.average = group(&captures, 2);
        }

        if let Some(captures) = MIN_MEDIAN_MAX.captures(stats) {
            record.min = group(&captures, 1);
            record.median = group(&captures, 2);
            record.max = group(&captures, 3);
        }

        record
    }
}

fn group<T: FromStr>(captures: &Captures, index: usize) -> Option<T> {
    captures
        .get(index)
        .and_then(|value| value.as_str().parse().ok())
}

/// histogram name -> record, in order of first appearance. A repeated name
/// replaces the earlier record.
pub type HistogramMap = IndexMap<String, HistogramRecord>;

/// collect every `DB_*` histogram block of a run log
pub fn extract_histograms(text: &str) -> HistogramMap {
    let mut histograms = HistogramMap::new();

    for captures in HISTOGRAM_BLOCK.captures_iter(text) {
        let (Some(name), Some(stats)) = (captures.get(1), captures.get(2)) else {
            continue;
        };
        let record = HistogramRecord::parse(stats.as_str());

        trace!(name = name.as_str(), record = ?record, "Parsed histogram");
        histograms.insert(name.as_str().to_string(), record);
    }

    histograms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_block() {
        let histograms = extract_histograms(
            "DB_GET_CORE_JOULES\nCount: 10 Average: 2.5\nMin: 1 Median: 2.0 Max: 5\n-----",
        );

        assert_eq!(
            histograms.get("DB_GET_CORE_JOULES"),
            Some(&HistogramRecord {
                count: Some(10),
                average: Some(2.5),
                min: Some(1),
                median: Some(2.0),
                max: Some(5),
            })
        );
    }

    #[test]
    fn parses_rocksdb_histogram_string() {
        let text = "Number of oks\n12\n\
                    DB_GET_FILTER_CORE_JOULES\n\
                    Count: 1500 Average: 0.0412  StdDev: 0.01\n\
                    Min: 0  Median: 0.0380  Max: 3\n\
                    Percentiles: P50: 0.04 P75: 0.05 P99: 0.09 P99.9: 0.30 P99.99: 1.20\n\
                    ------------------------------------------------------\n\
                    [       0,       1 ]     1490  99.333%  99.333% ####################\n\
                    DB_GET_RET1_CORE_JOULES\n\
                    Count: 0 Average: 0.0000  StdDev: 0.00\n\
                    Min: 0  Median: 0.0000  Max: 0\n\
                    Percentiles: P50: 0.00 P75: 0.00 P99: 0.00 P99.9: 0.00 P99.99: 0.00\n\
                    ------------------------------------------------------\n";
        let histograms = extract_histograms(text);
        let names = histograms.keys().map(String::as_str).collect::<Vec<_>>();

        assert_eq!(names, ["DB_GET_FILTER_CORE_JOULES", "DB_GET_RET1_CORE_JOULES"]);

        let filter = histograms.get("DB_GET_FILTER_CORE_JOULES").unwrap();
        assert_eq!(filter.count, Some(1500));
        assert_eq!(filter.average, Some(0.0412));
        assert_eq!(filter.min, Some(0));
        assert_eq!(filter.median, Some(0.038));
        assert_eq!(filter.max, Some(3));

        assert_eq!(
            histograms.get("DB_GET_RET1_CORE_JOULES").unwrap().count,
            Some(0)
        );
    }

    #[test]
    fn missing_lines_leave_fields_unset() {
        let text = "DB_GET_INDEX_CORE_JOULES\nCount: 7 Average: 1.25\nsomething else\n-----\n\
                    DB_GET_DISK_CORE_JOULES\nCount is unknown\nMin: 2 Median: 3.5 Max: 9\n-----\n";
        let histograms = extract_histograms(text);

        let index = histograms.get("DB_GET_INDEX_CORE_JOULES").unwrap();
        assert_eq!((index.count, index.average), (Some(7), Some(1.25)));
        assert_eq!((index.min, index.median, index.max), (None, None, None));

        let disk = histograms.get("DB_GET_DISK_CORE_JOULES").unwrap();
        assert_eq!((disk.count, disk.average), (None, None));
        assert_eq!(
            (disk.min, disk.median, disk.max),
            (Some(2), Some(3.5), Some(9))
        );
    }

    #[test]
    fn repeated_name_last_wins() {
        let text = "DB_GET_CORE_JOULES\nCount: 1 Average: 1.0\n-----\n\
                    DB_GET_DRAM_JOULES\nCount: 4 Average: 4.0\n-----\n\
                    DB_GET_CORE_JOULES\nCount: 2 Average: 2.0\n-----\n";
        let histograms = extract_histograms(text);

        assert_eq!(histograms.len(), 2);
        assert_eq!(histograms.get("DB_GET_CORE_JOULES").unwrap().count, Some(2));
        assert_eq!(
            histograms.keys().map(String::as_str).collect::<Vec<_>>(),
            ["DB_GET_CORE_JOULES", "DB_GET_DRAM_JOULES"]
        );
    }

    #[test]
    fn blocks_without_count_line_are_not_histograms() {
        let text = "DB_GET_CORE_JOULES\nnot available\n-----\nLSM-tree structure:\n-------------------\n";

        assert!(extract_histograms(text).is_empty());
    }

    #[test]
    fn names_must_start_a_line() {
        let text = "xDB_GET_CORE_JOULES\nCount: 1 Average: 1.0\n-----\n\
                    rocksdb.DB_GET_DRAM_JOULES\nCount: 2 Average: 2.0\n-----\n\
                    DB_GET_PACKAGE_JOULES\nCount: 3 Average: 3.0\n-----\n";
        let histograms = extract_histograms(text);

        assert_eq!(
            histograms.keys().map(String::as_str).collect::<Vec<_>>(),
            ["DB_GET_PACKAGE_JOULES"]
        );
    }
}
