use rdbstat_ingest::{
    counters::{int_or_zero, CPU_LATENCY_KEYS, DISK_IO_KEYS, FILTER_IO_KEYS, INDEX_IO_KEYS},
    CounterMap,
};

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// Raw nanosecond sums per latency category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatencyNanos {
    pub cpu: u64,
    pub index_io: u64,
    pub filter_io: u64,
    pub disk_io: u64,
}

impl LatencyNanos {
    pub fn from_counters(counters: &CounterMap) -> Self {
        Self {
            cpu: sum(counters, &CPU_LATENCY_KEYS),
            index_io: sum(counters, &INDEX_IO_KEYS),
            filter_io: sum(counters, &FILTER_IO_KEYS),
            disk_io: sum(counters, &DISK_IO_KEYS),
        }
    }
}

fn sum(counters: &CounterMap, keys: &[&str]) -> u64 {
    keys.iter()
        .map(|key| int_or_zero(counters, key))
        .fold(0, u64::saturating_add)
}

/// Latency categories of a run in seconds
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LatencyTotals {
    pub cpu_seconds: f64,
    pub index_io_seconds: f64,
    pub filter_io_seconds: f64,
    pub disk_io_seconds: f64,
}

impl LatencyTotals {
    pub fn from_counters(counters: &CounterMap) -> Self {
        Self::from(LatencyNanos::from_counters(counters))
    }

    /// (column, seconds) in report order
    pub fn columns(&self) -> [(&'static str, f64); 4] {
        [
            ("CPU_Latency", self.cpu_seconds),
            ("Index_IO_Latency", self.index_io_seconds),
            ("Filter_IO_Latency", self.filter_io_seconds),
            ("Disk_IO_Latency", self.disk_io_seconds),
        ]
    }
}

impl From<LatencyNanos> for LatencyTotals {
    fn from(nanos: LatencyNanos) -> Self {
        Self {
            cpu_seconds: nanos.cpu as f64 / NANOS_PER_SECOND,
            index_io_seconds: nanos.index_io as f64 / NANOS_PER_SECOND,
            filter_io_seconds: nanos.filter_io as f64 / NANOS_PER_SECOND,
            disk_io_seconds: nanos.disk_io as f64 / NANOS_PER_SECOND,
        }
    }
}
