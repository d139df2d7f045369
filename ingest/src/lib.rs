//! Parsers for the text output of the RocksDB `working_version` benchmark
//! binary and for the file names the sweep gives to each run's log.

pub mod counters;
pub mod filename;
pub mod histogram;
pub mod summary;

use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::debug;

pub use counters::{extract_counters, CounterMap, CounterValue};
pub use filename::{BloomBeforeLevel, FilterType, RunConfig};
pub use histogram::{extract_histograms, HistogramMap, HistogramRecord};
pub use summary::RunSummary;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read log file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// load the complete output of a single run
///
/// Invalid UTF-8 is replaced instead of rejected, the benchmark interleaves
/// stderr which may carry arbitrary bytes.
pub fn read_log(path: &Path) -> Result<String, IngestError> {
    let bytes = fs::read(path).map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = ?path, bytes = bytes.len(), "Loaded run log");

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn read_missing_log_is_an_error() {
        let path = Path::new("/nonexistent/direct_io_enabled_cache_0MB_bloom_b06.txt");

        match read_log(path) {
            Err(IngestError::Read { path: failed, .. }) => assert_eq!(failed, path),
            Ok(_) => panic!("reading a missing file must fail"),
        }
    }

    #[test]
    fn read_log_replaces_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lossy.txt");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"Query time: 1.5 seconds\n\xff\n").unwrap();

        let text = read_log(&path).unwrap();
        assert!(text.starts_with("Query time: 1.5 seconds\n"));
        assert!(text.contains('\u{fffd}'));
    }
}
