use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use tracing::{debug, trace};
use tracing_unwrap::ResultExt;

/// counters accounted as CPU time spent inside the engine
pub const CPU_LATENCY_KEYS: [&str; 5] = [
    "get_from_memtable_time",
    "seek_on_memtable_time",
    "block_checksum_time",
    "block_decompress_time",
    "block_read_cpu_time",
];
pub const INDEX_IO_KEYS: [&str; 1] = ["read_index_block_nanos"];
pub const FILTER_IO_KEYS: [&str; 1] = ["read_filter_block_nanos"];
pub const DISK_IO_KEYS: [&str; 1] = ["get_from_table_nanos"];

/// Sections are printed once when the workload opens the database and once
/// after it closes it, only the latter is of interest.
static PERF_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)RocksDB Perf Context:\s*\n(.*?)\nRocksDB IO Stats Context:").unwrap_or_log()
});

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap_or_log());

/// whether `key` is coerced to an integer while parsing
pub fn is_recognized(key: &str) -> bool {
    CPU_LATENCY_KEYS
        .iter()
        .chain(INDEX_IO_KEYS.iter())
        .chain(FILTER_IO_KEYS.iter())
        .chain(DISK_IO_KEYS.iter())
        .any(|recognized| *recognized == key)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterValue {
    Int(u64),
    Text(String),
}

impl CounterValue {
    pub fn as_int(&self) -> Option<u64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for CounterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// Counter name -> value, in order of first appearance. A repeated key
/// overwrites the value but keeps its original position.
pub type CounterMap = IndexMap<String, CounterValue>;

/// integer value of `key`, 0 if it is missing or kept as text
pub fn int_or_zero(counters: &CounterMap, key: &str) -> u64 {
    counters
        .get(key)
        .and_then(CounterValue::as_int)
        .unwrap_or(0)
}

/// Extract the last perf context section of a run log.
///
/// Returns `None` unless at least two sections are present.
pub fn extract_counters(text: &str) -> Option<CounterMap> {
    let sections = PERF_SECTION
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|section| section.as_str())
        .collect::<Vec<_>>();

    if sections.len() < 2 {
        debug!(
            sections = sections.len(),
            "Expected at least two perf context sections"
        );

        return None;
    }

    sections.last().map(|section| parse_counters(section.trim()))
}

/// parse a comma separated list of `key = value` pairs
pub fn parse_counters(text: &str) -> CounterMap {
    let mut counters = CounterMap::new();

    for pair in text.split(',') {
        let Some((key, value)) = pair.split_once('=') else {
            trace!(fragment = pair, "Skipped fragment without '='");
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        let value = if is_recognized(key) {
            CounterValue::Int(
                DIGITS
                    .find(value)
                    .and_then(|digits| digits.as_str().parse().ok())
                    .unwrap_or(0),
            )
        } else {
            CounterValue::Text(value.to_string())
        };

        counters.insert(key.to_string(), value);
    }

    counters
}
