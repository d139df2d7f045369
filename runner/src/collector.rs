use crate::config::{ConfigErrors, ReportConfig};
use globset::GlobMatcher;
use ignore::{DirEntry, WalkBuilder};
use std::{collections::VecDeque, path::PathBuf};
use tracing::{debug, trace};

#[derive(Debug)]
/// Snapshot of the candidate logs in the input directory, handed out in the
/// order the file system listed them
pub struct Collector {
    paths: VecDeque<PathBuf>,
}

impl Collector {
    /// list the input directory once, nothing created afterwards is picked up
    pub fn load(config: &ReportConfig) -> Result<Self, CollectorError> {
        if !config.input.is_dir() {
            return Err(ConfigErrors::DirectoryNotFound(config.input.clone()).into());
        }

        let glob = config.compile_glob()?;
        let mut builder = WalkBuilder::new(&config.input);

        // logs live directly in the sweep directory and are never git ignored
        builder.max_depth(Some(1)).standard_filters(false);

        debug!("Filtering with glob: {glob:?}");

        let mut paths = VecDeque::new();

        for entry in builder.build() {
            let entry = entry?;

            if is_candidate(&entry, &glob) {
                paths.push_back(entry.into_path());
            } else {
                trace!(path = ?entry.path(), "Not a candidate");
            }
        }

        Ok(Self { paths })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error(transparent)]
    Config(#[from] ConfigErrors),
    #[error("Failed to list input directory")]
    Walk(#[from] ignore::Error),
}

/// Regular files and symlinks resolving to one, dangling links and links to
/// directories are skipped.
fn is_candidate(entry: &DirEntry, glob: &GlobMatcher) -> bool {
    let is_file = match entry.file_type() {
        Some(kind) if kind.is_symlink() => entry.path().is_file(),
        Some(kind) => kind.is_file(),
        None => false,
    };

    entry.depth() > 0 && is_file && glob.is_match(entry.file_name())
}

impl Iterator for Collector {
    type Item = PathBuf;

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.paths.len(), Some(self.paths.len()))
    }

    fn next(&mut self) -> Option<Self::Item> {
        self.paths.pop_front()
    }
}

impl ExactSizeIterator for Collector {}
