//! Turns the data extracted from run logs into report rows, aggregates the
//! perf context into latency categories and writes the final report.

pub mod latency;
pub mod report;
pub mod row;

pub use latency::{LatencyNanos, LatencyTotals};
pub use report::{report_file_name, Report, ReportError, RunRecord};
pub use row::{Cell, ReportRow, CANONICAL_HISTOGRAMS, NOT_APPLICABLE};
