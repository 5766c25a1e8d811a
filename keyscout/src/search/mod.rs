//! Concurrent keyword search.
//!
//! A run is a fork-join over a fixed pool of workers:
//!
//! 1. [`partition`] splits the file list into one contiguous chunk per worker.
//! 2. A [`WorkerLauncher`] starts the workers. Each runs [`run_worker`] over
//!    its own chunk and builds a private [`PartialResult`](crate::PartialResult).
//! 3. Once every worker has finished, [`aggregate`] concatenates the partial
//!    results in worker order.
//!
//! Workers never share mutable state, so no locking happens during the scan.
//! [`ThreadLauncher`] hands results over in memory; [`ProcessLauncher`] runs
//! each worker in a child process and moves results across as JSON.
pub mod aggregate;
pub mod engine;
pub mod launcher;
pub mod matcher;
pub mod partition;
pub mod processor;
pub mod worker;

pub use aggregate::aggregate;
pub use engine::{search, search_with, SearchReport};
pub use launcher::{
    launcher_for, serve_worker, ProcessLauncher, ScanJob, ScanSettings, ThreadLauncher,
    WorkerLauncher,
};
pub use matcher::KeywordMatcher;
pub use partition::partition;
pub use processor::FileProcessor;
pub use worker::run_worker;
