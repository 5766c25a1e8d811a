use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::errors::{SearchError, SearchResult};
use crate::filters::should_include_file;

/// Regular files, and symlinks that resolve to one. Linked directories are
/// never entered.
fn is_regular_file(entry: &ignore::DirEntry) -> bool {
    match entry.file_type() {
        Some(ft) if ft.is_file() => true,
        Some(ft) if ft.is_symlink() => entry.path().is_file(),
        _ => false,
    }
}

/// Recursively collects the files under `root` that pass the extension and
/// ignore filters.
///
/// Hidden and git-ignored files are included. A symlink to a file is
/// collected under its own path; symlinked directories are not descended.
/// Entries are visited in file-name order, so the same tree always yields the
/// same list. A missing or unreadable root is an error; unreadable entries
/// below it are logged and skipped.
pub fn collect_files(
    root: &Path,
    extensions: &Option<Vec<String>>,
    ignore_patterns: &[String],
) -> SearchResult<Vec<PathBuf>> {
    let metadata = fs::metadata(root).map_err(|_| SearchError::root_not_found(root))?;
    if !metadata.is_dir() {
        return Err(SearchError::root_not_found(root));
    }
    fs::read_dir(root)?;

    let mut walker = WalkBuilder::new(root);
    walker
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    let mut files = Vec::new();
    for entry in walker.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping entry during walk: {}", e);
                continue;
            }
        };
        if !is_regular_file(&entry) {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if should_include_file(relative, extensions, ignore_patterns) {
            files.push(entry.into_path());
        }
    }

    debug!("Found {} files under {}", files.len(), root.display());
    Ok(files)
}
