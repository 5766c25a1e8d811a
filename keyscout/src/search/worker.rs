use std::path::PathBuf;
use tracing::warn;

use super::processor::FileProcessor;
use crate::results::PartialResult;

/// Scans every file of one chunk in order and folds the hits into a result
/// owned by this worker alone.
///
/// A file that cannot be read is logged and recorded as skipped; it never
/// aborts the chunk.
pub fn run_worker(chunk: &[PathBuf], processor: &FileProcessor) -> PartialResult {
    let mut local = PartialResult::new();
    for path in chunk {
        match processor.scan_file(path) {
            Ok(found) => local.merge(found),
            Err(e) => {
                warn!("Cannot read {}: {}", path.display(), e);
                local.record_skip(path, &e);
            }
        }
    }
    local
}
