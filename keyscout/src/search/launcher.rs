use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use tracing::debug;

use super::matcher::KeywordMatcher;
use super::processor::FileProcessor;
use super::worker::run_worker;
use crate::config::{EncodingMode, Strategy};
use crate::errors::{SearchError, SearchResult};
use crate::results::PartialResult;

/// Scan settings shared by every worker of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSettings {
    pub keywords: Vec<String>,
    pub case_sensitive: bool,
    #[serde(default)]
    pub encoding_mode: EncodingMode,
}

impl ScanSettings {
    /// Builds the file processor every worker scans with
    pub fn processor(&self) -> FileProcessor {
        let matcher = KeywordMatcher::new(self.keywords.clone(), self.case_sensitive);
        FileProcessor::new(matcher, self.encoding_mode)
    }
}

/// The work a child process receives on stdin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanJob {
    #[serde(with = "crate::wire::path_list")]
    pub files: Vec<PathBuf>,
    #[serde(flatten)]
    pub settings: ScanSettings,
}

/// Runs one worker per chunk and hands back their results.
///
/// Implementations must return only after every worker has finished, with
/// exactly one result per chunk in chunk order.
pub trait WorkerLauncher {
    fn launch(
        &self,
        chunks: &[&[PathBuf]],
        settings: &ScanSettings,
    ) -> SearchResult<Vec<PartialResult>>;

    fn strategy(&self) -> Strategy;
}

/// Runs workers on a dedicated rayon pool with one thread per chunk
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadLauncher;

impl WorkerLauncher for ThreadLauncher {
    fn launch(
        &self,
        chunks: &[&[PathBuf]],
        settings: &ScanSettings,
    ) -> SearchResult<Vec<PartialResult>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(chunks.len().max(1))
            .thread_name(|index| format!("keyscout-worker-{}", index))
            .build()?;
        let processor = settings.processor();

        debug!("Launching {} thread workers", chunks.len());
        let partials: Vec<PartialResult> = pool.install(|| {
            chunks
                .par_iter()
                .with_max_len(1)
                .enumerate()
                .map(|(index, chunk)| {
                    debug!("Worker {} scanning {} files", index, chunk.len());
                    run_worker(chunk, &processor)
                })
                .collect()
        });
        Ok(partials)
    }

    fn strategy(&self) -> Strategy {
        Strategy::Thread
    }
}

/// Runs every worker as a child process.
///
/// Each child gets its [`ScanJob`] as JSON on stdin and answers with its
/// [`PartialResult`] as JSON on stdout; stderr is inherited so worker logs
/// show up next to the parent's. The child side is [`serve_worker`].
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ProcessLauncher {
    /// Creates a launcher that starts `program` with no arguments
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Builder method to set the arguments every child is started with
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Re-runs the current executable with its `worker` subcommand
    pub fn current_exe() -> SearchResult<Self> {
        Ok(Self::new(std::env::current_exe()?).with_args(["worker"]))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn spawn(&self, index: usize, job: &ScanJob) -> SearchResult<Child> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                SearchError::worker_failed(
                    index,
                    format!("cannot start {}: {}", self.program.display(), e),
                )
            })?;

        // Dropping the writer closes the pipe, which ends the child's input
        if let Some(stdin) = child.stdin.take() {
            let mut writer = BufWriter::new(stdin);
            let sent = serde_json::to_writer(&mut writer, job)
                .map_err(SearchError::from)
                .and_then(|()| writer.flush().map_err(SearchError::from));
            if let Err(e) = sent {
                let _ = child.kill();
                let _ = child.wait();
                return Err(SearchError::worker_failed(
                    index,
                    format!("cannot send job: {}", e),
                ));
            }
        }
        Ok(child)
    }

    fn collect(index: usize, child: Child) -> SearchResult<PartialResult> {
        let output = child
            .wait_with_output()
            .map_err(|e| SearchError::worker_failed(index, format!("cannot wait: {}", e)))?;
        if !output.status.success() {
            return Err(SearchError::worker_failed(
                index,
                format!("exited with {}", output.status),
            ));
        }
        serde_json::from_slice(&output.stdout)
            .map_err(|e| SearchError::worker_failed(index, format!("invalid result: {}", e)))
    }
}

impl WorkerLauncher for ProcessLauncher {
    fn launch(
        &self,
        chunks: &[&[PathBuf]],
        settings: &ScanSettings,
    ) -> SearchResult<Vec<PartialResult>> {
        debug!(
            "Launching {} process workers with {}",
            chunks.len(),
            self.program.display()
        );

        let mut children = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.iter().enumerate() {
            let job = ScanJob {
                files: chunk.to_vec(),
                settings: settings.clone(),
            };
            match self.spawn(index, &job) {
                Ok(child) => children.push(child),
                Err(e) => {
                    for mut child in children {
                        let _ = child.kill();
                        let _ = child.wait();
                    }
                    return Err(e);
                }
            }
        }

        // Children write their result only after scanning, so collecting in
        // index order does not serialize the scans.
        let mut partials = Vec::with_capacity(children.len());
        let mut first_error = None;
        for (index, child) in children.into_iter().enumerate() {
            match Self::collect(index, child) {
                Ok(partial) => partials.push(partial),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(partials),
        }
    }

    fn strategy(&self) -> Strategy {
        Strategy::Process
    }
}

/// Picks the launcher for a strategy.
///
/// The process launcher re-runs the current executable, which therefore has
/// to dispatch its `worker` argument to [`serve_worker`].
pub fn launcher_for(strategy: Strategy) -> SearchResult<Box<dyn WorkerLauncher>> {
    Ok(match strategy {
        Strategy::Thread => Box::new(ThreadLauncher),
        Strategy::Process => Box::new(ProcessLauncher::current_exe()?),
    })
}

/// Child side of [`ProcessLauncher`]: reads a [`ScanJob`], scans its files
/// and writes the [`PartialResult`].
pub fn serve_worker<R: Read, W: Write>(reader: R, mut writer: W) -> SearchResult<()> {
    let job: ScanJob = serde_json::from_reader(reader)?;
    debug!("Worker process scanning {} files", job.files.len());

    let partial = run_worker(&job.files, &job.settings.processor());
    serde_json::to_writer(&mut writer, &partial)?;
    writer.flush()?;
    Ok(())
}
