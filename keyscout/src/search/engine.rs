use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::aggregate::aggregate;
use super::launcher::{launcher_for, ScanSettings, WorkerLauncher};
use super::partition::partition;
use crate::config::{SearchConfig, Strategy};
use crate::errors::{SearchError, SearchResult};
use crate::keywords::dedup_keywords;
use crate::results::FinalResult;
use crate::walker::collect_files;

/// Outcome of a search run
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub result: FinalResult,
    /// Keywords searched for, without repeats, in input order
    pub keywords: Vec<String>,
    /// Wall-clock time from start to merged result
    pub elapsed: Duration,
    /// Files that passed enumeration and filtering
    pub files_found: usize,
    pub workers: usize,
    pub strategy: Strategy,
}

/// Performs a concurrent keyword search with the launcher `config.strategy` selects
pub fn search(config: &SearchConfig) -> SearchResult<SearchReport> {
    let launcher = launcher_for(config.strategy)?;
    search_with(config, launcher.as_ref())
}

/// Performs a concurrent keyword search with the given launcher.
///
/// Keyword loading, configuration and enumeration failures abort the run
/// before any worker starts. Files that fail to read only show up in
/// `result.skipped`.
pub fn search_with(
    config: &SearchConfig,
    launcher: &dyn WorkerLauncher,
) -> SearchResult<SearchReport> {
    let start = Instant::now();
    config.validate()?;
    let keywords = dedup_keywords(config.resolve_keywords()?);

    info!(
        "Starting search for {} keywords under {} with {} {} workers",
        keywords.len(),
        config.root_path.display(),
        config.worker_count,
        launcher.strategy()
    );

    let files = collect_files(
        &config.root_path,
        &config.file_extensions,
        &config.ignore_patterns,
    )?;

    let mut report = SearchReport {
        result: FinalResult::new(),
        keywords: keywords.clone(),
        elapsed: Duration::ZERO,
        files_found: files.len(),
        workers: config.worker_count,
        strategy: launcher.strategy(),
    };

    if files.is_empty() {
        info!("No files found to scan");
        report.elapsed = start.elapsed();
        return Ok(report);
    }

    let chunks = partition(&files, config.worker_count)?;
    debug!(
        "Chunk sizes: {:?}",
        chunks.iter().map(|c| c.len()).collect::<Vec<_>>()
    );

    let settings = ScanSettings {
        keywords,
        case_sensitive: config.case_sensitive,
        encoding_mode: config.encoding_mode,
    };
    let partials = launcher.launch(&chunks, &settings)?;
    if partials.len() != chunks.len() {
        return Err(SearchError::worker_failed(
            partials.len(),
            format!(
                "expected {} results, launcher returned {}",
                chunks.len(),
                partials.len()
            ),
        ));
    }

    report.result = aggregate(partials);
    report.elapsed = start.elapsed();

    if !report.result.skipped.is_empty() {
        warn!("{} files could not be read", report.result.skipped.len());
    }
    info!(
        "Search complete in {:?}. {} keywords matched across {} of {} files",
        report.elapsed,
        report.result.matches.len(),
        report.result.files_with_matches(),
        report.files_found
    );

    Ok(report)
}
