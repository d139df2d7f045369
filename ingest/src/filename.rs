use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use tracing::warn;
use tracing_unwrap::ResultExt;

/// naming scheme used by the sweep for the log of every run
static RUN_FILE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^direct_io_(enabled|disabled)_cache_(\d+)MB_(bloom|ribbon)_b(\d{2})(?:_level(-?\d+))?\.txt$",
    )
    .unwrap_or_log()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    Bloom,
    Ribbon,
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bloom => f.write_str("Bloom"),
            Self::Ribbon => f.write_str("Ribbon"),
        }
    }
}

/// `--bloom_before_level` is only passed to the benchmark for some runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BloomBeforeLevel {
    Level(i64),
    NotApplicable,
}

impl fmt::Display for BloomBeforeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Level(level) => write!(f, "{level}"),
            Self::NotApplicable => f.write_str("N/A"),
        }
    }
}

/// Parameters of a single benchmark run as encoded in its log file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub direct_io: bool,
    pub cache_size_mb: u64,
    pub filter_type: FilterType,
    pub bits_per_key: u32,
    pub bloom_before_level: BloomBeforeLevel,
}

impl RunConfig {
    /// Decode a log file name, `None` means the file is not a run log and
    /// should be skipped.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let captures = RUN_FILE_NAME.captures(name)?;

        let cache_size_mb = match captures[2].parse() {
            Ok(size) => size,
            Err(error) => {
                warn!(name = name, error = ?error, "Cache size in file name is out of range");

                return None;
            }
        };

        let bloom_before_level = match captures.get(5) {
            Some(level) => match level.as_str().parse() {
                Ok(level) => BloomBeforeLevel::Level(level),
                Err(error) => {
                    warn!(name = name, error = ?error, "Bloom level in file name is out of range");

                    return None;
                }
            },
            None => BloomBeforeLevel::NotApplicable,
        };

        Some(Self {
            direct_io: &captures[1] == "enabled",
            cache_size_mb,
            filter_type: match &captures[3] {
                "bloom" => FilterType::Bloom,
                _ => FilterType::Ribbon,
            },
            // exactly two digits, cannot overflow
            bits_per_key: captures[4].parse().ok()?,
            bloom_before_level,
        })
    }
}

impl fmt::Display for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "direct io={}, block cache={}MB, {} with bpk={}, bloom before level={}",
            if self.direct_io { "enabled" } else { "disabled" },
            self.cache_size_mb,
            self.filter_type,
            self.bits_per_key,
            self.bloom_before_level
        )
    }
}
