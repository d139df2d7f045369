use globset::{GlobBuilder, GlobMatcher};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::Error,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Error, Debug)]
pub enum ConfigErrors {
    #[error("Glob was invalid")]
    InvalidGlobs(#[from] globset::Error),
    #[error("File not found: {0:?}")]
    FileNotFound(PathBuf),
    #[error("Directory not found: {0:?}")]
    DirectoryNotFound(PathBuf),
    #[error("Failed to parse configuration")]
    Deserialize(#[from] serde_yaml::Error),
    #[error("Failed to read configuration")]
    Io(#[from] Error),
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    // directory holding the run logs of a sweep
    #[serde(default = "default_input", alias = "dir")]
    pub input: PathBuf,
    // where the report is written, the input directory if unset
    #[serde(default)]
    pub output: Option<PathBuf>,
    // pre-filter for candidate files, names are still checked against the run naming scheme
    #[serde(default = "default_glob")]
    pub glob: String,
    // print the per run summary to stdout
    #[serde(default = "default_console")]
    pub console: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: None,
            glob: default_glob(),
            console: default_console(),
        }
    }
}

impl ReportConfig {
    /// load a yaml configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigErrors> {
        if !path.is_file() {
            return Err(ConfigErrors::FileNotFound(path.to_path_buf()));
        }

        let config: Self = serde_yaml::from_reader(File::open(path)?)?;
        debug!(path = ?path, config = ?config, "Loaded configuration");

        Ok(config)
    }

    pub fn output_dir(&self) -> &Path {
        self.output.as_deref().unwrap_or(&self.input)
    }

    /// compile the candidate glob, it is matched against file names only
    pub fn compile_glob(&self) -> Result<GlobMatcher, ConfigErrors> {
        Ok(GlobBuilder::new(&self.glob)
            .literal_separator(true)
            .build()?
            .compile_matcher())
    }

    /// Check everything that can be checked before touching any log, returns
    /// whether an error was found. All problems are logged instead of stopping
    /// at the first one.
    pub fn preflight_checks(&self) -> bool {
        let mut contains_error = false;

        if !self.input.is_dir() {
            error!(
                "Input {} is not a directory or does not exist",
                self.input.to_string_lossy()
            );
            contains_error = true;
        }

        match &self.output {
            Some(output) if !output.is_dir() => {
                error!(
                    "Output {} is not a directory or does not exist",
                    output.to_string_lossy()
                );
                contains_error = true;
            }
            Some(_) => {}
            None => debug!("No output directory given, writing next to the logs"),
        }

        if let Err(e) = self.compile_glob() {
            error!("Failed to compile glob {}: {e}", self.glob);
            contains_error = true;
        } else if !self.glob.ends_with(".txt") {
            warn!(
                "Glob {} does not restrict to .txt files, names outside the run naming scheme are skipped anyway",
                self.glob
            );
        }

        contains_error
    }
}

fn default_input() -> PathBuf {
    PathBuf::from(".")
}

fn default_glob() -> String {
    String::from("*.txt")
}

fn default_console() -> bool {
    true
}
