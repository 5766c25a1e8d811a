use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::errors::SearchError;

/// A file that could not be scanned and contributed no matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    #[serde(with = "crate::wire::path")]
    pub path: PathBuf,
    pub reason: String,
}

/// One worker's matches, scoped to its chunk of the file list.
///
/// Paths under each keyword are in scan order. A partial result crosses the
/// process boundary as JSON when workers run as child processes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialResult {
    /// Keyword to the files of this chunk that contain it
    #[serde(with = "crate::wire::path_map")]
    pub matches: BTreeMap<String, Vec<PathBuf>>,
    /// Files read successfully
    pub files_scanned: usize,
    /// Bytes read from those files
    pub bytes_read: u64,
    /// Files that failed to read or decode
    pub skipped: Vec<SkippedFile>,
}

impl PartialResult {
    /// Creates a new empty partial result
    pub fn new() -> Self {
        Default::default()
    }

    /// Result of scanning a single file: every matched keyword maps to `[path]`
    pub fn for_file<'a>(
        path: &Path,
        keywords: impl IntoIterator<Item = &'a str>,
        bytes_read: u64,
    ) -> Self {
        let matches = keywords
            .into_iter()
            .map(|keyword| (keyword.to_string(), vec![path.to_path_buf()]))
            .collect();
        Self {
            matches,
            files_scanned: 1,
            bytes_read,
            skipped: Vec::new(),
        }
    }

    /// Records a file that contributed nothing because it could not be read
    pub fn record_skip(&mut self, path: &Path, error: &SearchError) {
        self.skipped.push(SkippedFile {
            path: path.to_path_buf(),
            reason: error.to_string(),
        });
    }

    /// Appends another result's paths after this one's, keyword by keyword
    pub fn merge(&mut self, other: PartialResult) {
        for (keyword, paths) in other.matches {
            self.matches.entry(keyword).or_default().extend(paths);
        }
        self.files_scanned += other.files_scanned;
        self.bytes_read += other.bytes_read;
        self.skipped.extend(other.skipped);
    }

    /// Number of (keyword, file) pairs
    pub fn total_matches(&self) -> usize {
        self.matches.values().map(Vec::len).sum()
    }
}

/// The merged keyword to file-paths mapping of a whole run.
///
/// Keywords that matched nowhere have no entry; [`FinalResult::get`] returns
/// an empty slice for them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalResult {
    #[serde(with = "crate::wire::path_map")]
    pub matches: BTreeMap<String, Vec<PathBuf>>,
    pub files_scanned: usize,
    pub bytes_read: u64,
    pub skipped: Vec<SkippedFile>,
}

impl FinalResult {
    /// Creates a new empty final result
    pub fn new() -> Self {
        Default::default()
    }

    /// Files containing `keyword`, in worker order
    pub fn get(&self, keyword: &str) -> &[PathBuf] {
        self.matches.get(keyword).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether no keyword matched anywhere
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Iterates keywords with their files, in keyword order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.matches
            .iter()
            .map(|(keyword, paths)| (keyword.as_str(), paths.as_slice()))
    }

    /// Number of (keyword, file) pairs
    pub fn total_matches(&self) -> usize {
        self.matches.values().map(Vec::len).sum()
    }

    /// Number of distinct files with at least one keyword
    pub fn files_with_matches(&self) -> usize {
        self.matches
            .values()
            .flatten()
            .collect::<BTreeSet<_>>()
            .len()
    }
}

impl From<PartialResult> for FinalResult {
    fn from(partial: PartialResult) -> Self {
        Self {
            matches: partial.matches,
            files_scanned: partial.files_scanned,
            bytes_read: partial.bytes_read,
            skipped: partial.skipped,
        }
    }
}
