use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur while loading inputs, scanning files or running workers.
///
/// Errors returned by the scanner for a single file are recorded as skipped
/// files by the worker. Everything that reaches the driver is fatal.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Root directory not found: {0}")]
    RootNotFound(PathBuf),
    #[error("Cannot read keyword file {path}: {source}")]
    KeywordSource {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Invalid UTF-8 in file {path}: {source}")]
    EncodingError {
        path: PathBuf,
        source: std::str::Utf8Error,
    },
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Worker {index} failed: {reason}")]
    WorkerFailed { index: usize, reason: String },
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl SearchError {
    pub fn root_not_found(path: impl Into<PathBuf>) -> Self {
        Self::RootNotFound(path.into())
    }

    pub fn keyword_source(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::KeywordSource {
            path: path.into(),
            source,
        }
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn encoding_error(path: impl Into<PathBuf>, source: std::str::Utf8Error) -> Self {
        Self::EncodingError {
            path: path.into(),
            source,
        }
    }

    pub fn worker_failed(index: usize, reason: impl Into<String>) -> Self {
        Self::WorkerFailed {
            index,
            reason: reason.into(),
        }
    }

    /// Maps an IO error raised while touching `path` onto the per-file variants.
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::file_not_found(path),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::IoError(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_creation() {
        let path = Path::new("test.txt");
        let err = SearchError::file_not_found(path);
        assert!(matches!(err, SearchError::FileNotFound(_)));

        let err = SearchError::permission_denied(path);
        assert!(matches!(err, SearchError::PermissionDenied(_)));

        let err = SearchError::root_not_found("missing");
        assert!(matches!(err, SearchError::RootNotFound(_)));

        let err = SearchError::worker_failed(3, "exited with status 1");
        assert!(matches!(err, SearchError::WorkerFailed { index: 3, .. }));
    }

    #[test]
    fn test_error_messages() {
        let err = SearchError::config_error("worker_count must be at least 1");
        assert_eq!(
            err.to_string(),
            "Configuration error: worker_count must be at least 1"
        );

        let err = SearchError::file_not_found("test.txt");
        assert_eq!(err.to_string(), "File not found: test.txt");

        let err = SearchError::root_not_found("no/such/dir");
        assert_eq!(err.to_string(), "Root directory not found: no/such/dir");

        let err = SearchError::worker_failed(0, "invalid output");
        assert_eq!(err.to_string(), "Worker 0 failed: invalid output");
    }

    #[test]
    fn test_from_io_maps_kinds() {
        let path = Path::new("a.txt");

        let err = SearchError::from_io(path, io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, SearchError::FileNotFound(_)));

        let err = SearchError::from_io(path, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, SearchError::PermissionDenied(_)));

        let err = SearchError::from_io(path, io::Error::from(io::ErrorKind::Interrupted));
        assert!(matches!(err, SearchError::IoError(_)));
    }

    #[test]
    fn test_encoding_error_message() {
        let bytes = [0x66, 0x6f, 0xff];
        let utf8_err = std::str::from_utf8(&bytes).unwrap_err();
        let err = SearchError::encoding_error("docs/../bad.txt", utf8_err);
        assert!(err
            .to_string()
            .starts_with("Invalid UTF-8 in file docs/../bad.txt:"));
    }
}
