use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;
use tracing_unwrap::ResultExt;

const FLOAT: &str = r"([-+]?\d+(?:\.\d+)?(?:[eE][-+]?\d+)?)";

static BULK_LOAD_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"Bulk load time:[ \t]*{FLOAT}[ \t]*seconds")).unwrap_or_log());
static QUERY_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"Query time:[ \t]*{FLOAT}[ \t]*seconds")).unwrap_or_log());
static QUERIES_OK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Number of oks[ \t]*\r?\n[ \t]*(\d+)").unwrap_or_log());
static QUERIES_NOT_FOUND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Number of NotFounds[ \t]*\r?\n[ \t]*(\d+)").unwrap_or_log());

/// Phase timings and point query outcomes printed by the benchmark driver
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub bulk_load_seconds: Option<f64>,
    pub query_seconds: Option<f64>,
    pub queries_ok: Option<u64>,
    pub queries_not_found: Option<u64>,
}

impl RunSummary {
    /// The workload runs twice per invocation (load, then queries), the last
    /// reported value of every line is kept.
    pub fn extract(text: &str) -> Self {
        Self {
            bulk_load_seconds: last_match(&BULK_LOAD_TIME, text),
            query_seconds: last_match(&QUERY_TIME, text),
            queries_ok: last_match(&QUERIES_OK, text),
            queries_not_found: last_match(&QUERIES_NOT_FOUND, text),
        }
    }
}

fn last_match<T: FromStr>(regex: &Regex, text: &str) -> Option<T> {
    regex
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .last()
        .and_then(|value| value.as_str().parse().ok())
}
