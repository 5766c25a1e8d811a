use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::errors::{SearchError, SearchResult};
use crate::keywords::load_keywords;

/// How worker processes are launched.
///
/// The choice only changes how partial results travel back to the driver:
/// threads hand them over in memory, processes serialize them as JSON over
/// a pipe. Threads suit IO-bound runs, processes suit CPU-heavy scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Workers are threads of a dedicated rayon pool
    #[default]
    Thread,
    /// Workers are child processes of the current executable
    Process,
}

impl FromStr for Strategy {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "thread" | "threads" => Ok(Strategy::Thread),
            "process" | "processes" => Ok(Strategy::Process),
            other => Err(SearchError::config_error(format!(
                "unknown strategy '{}', expected 'thread' or 'process'",
                other
            ))),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Thread => write!(f, "thread"),
            Strategy::Process => write!(f, "process"),
        }
    }
}

/// How to handle files that are not valid UTF-8
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingMode {
    /// Skip the file and report it
    #[default]
    FailFast,
    /// Replace invalid sequences with U+FFFD and keep scanning
    Lossy,
}

impl FromStr for EncodingMode {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "failfast" | "strict" => Ok(EncodingMode::FailFast),
            "lossy" => Ok(EncodingMode::Lossy),
            other => Err(SearchError::config_error(format!(
                "unknown encoding mode '{}', expected 'failfast' or 'lossy'",
                other
            ))),
        }
    }
}

/// Configuration for a keyword search run.
///
/// # Configuration Locations
///
/// The configuration can be loaded from multiple locations in order of precedence:
/// 1. Custom config file specified via `--config` flag
/// 2. Local `.keyscout.yaml` in the current directory
/// 3. Global `$HOME/.config/keyscout/config.yaml`
///
/// Every field has a default, so a config file only needs the keys it changes.
///
/// ```yaml
/// root_path: "sample_files"
/// keyword_file: "keywords.txt"
/// file_extensions: ["txt", "md"]
/// ignore_patterns: ["**/drafts/**"]
/// worker_count: 8
/// case_sensitive: false
/// strategy: "process"
/// encoding_mode: "failfast"
/// log_level: "info"
/// ```
///
/// Command-line flags take precedence over file values, see [`SearchConfig::merge_with_cli`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Root directory to enumerate recursively
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// Keywords given inline, searched in addition to `keyword_file`
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Newline-delimited keyword file
    #[serde(default)]
    pub keyword_file: Option<PathBuf>,

    /// Optional list of file extensions to include (e.g., ["txt", ".md"])
    /// If None, every file is scanned
    #[serde(default)]
    pub file_extensions: Option<Vec<String>>,

    /// Glob patterns for paths to leave out of the scan
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Number of concurrent workers, defaults to the number of CPU cores
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Literal comparison when true, lowercase-normalized comparison when false
    #[serde(default = "default_case_sensitive")]
    pub case_sensitive: bool,

    #[serde(default)]
    pub strategy: Strategy,

    #[serde(default)]
    pub encoding_mode: EncodingMode,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_root_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_worker_count() -> usize {
    num_cpus::get().max(1)
}

fn default_case_sensitive() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            keywords: Vec::new(),
            keyword_file: None,
            file_extensions: None,
            ignore_patterns: Vec::new(),
            worker_count: default_worker_count(),
            case_sensitive: default_case_sensitive(),
            strategy: Strategy::default(),
            encoding_mode: EncodingMode::default(),
            log_level: default_log_level(),
        }
    }
}

/// Values given on the command line. `None` leaves the file value alone.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub root_path: Option<PathBuf>,
    pub keywords: Vec<String>,
    pub keyword_file: Option<PathBuf>,
    pub file_extensions: Option<Vec<String>>,
    pub ignore_patterns: Vec<String>,
    pub worker_count: Option<usize>,
    pub ignore_case: bool,
    pub strategy: Option<Strategy>,
    pub encoding_mode: Option<EncodingMode>,
    pub log_level: Option<String>,
}

impl SearchConfig {
    /// Creates a configuration searching `root_path` for the given keywords
    pub fn new(root_path: impl Into<PathBuf>, keywords: Vec<String>) -> Self {
        Self {
            root_path: root_path.into(),
            keywords,
            ..Default::default()
        }
    }

    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration from the default locations plus an explicit file,
    /// which must exist
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.display().to_string()));
            }
        }

        let mut builder = ConfigBuilder::builder();

        let config_files = [
            dirs::config_dir().map(|p| p.join("keyscout/config.yaml")),
            Some(PathBuf::from(".keyscout.yaml")),
            config_path.map(PathBuf::from),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        builder.build()?.try_deserialize()
    }

    /// Merges CLI arguments over configuration file values
    pub fn merge_with_cli(mut self, cli: ConfigOverrides) -> Self {
        if let Some(root) = cli.root_path {
            self.root_path = root;
        }
        if !cli.keywords.is_empty() {
            self.keywords = cli.keywords;
        }
        if cli.keyword_file.is_some() {
            self.keyword_file = cli.keyword_file;
        }
        if cli.file_extensions.is_some() {
            self.file_extensions = cli.file_extensions;
        }
        if !cli.ignore_patterns.is_empty() {
            self.ignore_patterns = cli.ignore_patterns;
        }
        if let Some(count) = cli.worker_count {
            self.worker_count = count;
        }
        // A flag can only switch case folding on.
        if cli.ignore_case {
            self.case_sensitive = false;
        }
        if let Some(strategy) = cli.strategy {
            self.strategy = strategy;
        }
        if let Some(mode) = cli.encoding_mode {
            self.encoding_mode = mode;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        self
    }

    /// Rejects settings no run can start with
    pub fn validate(&self) -> SearchResult<()> {
        if self.worker_count == 0 {
            return Err(SearchError::config_error("worker_count must be at least 1"));
        }
        Ok(())
    }

    /// Collects the keywords of this run, file keywords first.
    ///
    /// Having neither a keyword file nor inline keywords is an error; an
    /// existing but empty keyword file is not.
    pub fn resolve_keywords(&self) -> SearchResult<Vec<String>> {
        if self.keyword_file.is_none() && self.keywords.is_empty() {
            return Err(SearchError::config_error(
                "no keyword source given, set keyword_file or keywords",
            ));
        }

        let mut keywords = match &self.keyword_file {
            Some(path) => load_keywords(path)?,
            None => Vec::new(),
        };
        keywords.extend(
            self.keywords
                .iter()
                .map(|k| k.trim())
                .filter(|k| !k.is_empty())
                .map(String::from),
        );
        Ok(keywords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let config_content = r#"
            root_path: "sample_files"
            keywords: ["alpha", "beta"]
            keyword_file: "keywords.txt"
            file_extensions: ["txt", ".md"]
            ignore_patterns: ["**/drafts/**"]
            worker_count: 4
            case_sensitive: false
            strategy: "process"
            encoding_mode: "lossy"
            log_level: "debug"
        "#;

        let mut file = File::create(&config_path).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = SearchConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.root_path, PathBuf::from("sample_files"));
        assert_eq!(config.keywords, vec!["alpha", "beta"]);
        assert_eq!(config.keyword_file, Some(PathBuf::from("keywords.txt")));
        assert_eq!(
            config.file_extensions,
            Some(vec!["txt".to_string(), ".md".to_string()])
        );
        assert_eq!(config.ignore_patterns, vec!["**/drafts/**".to_string()]);
        assert_eq!(config.worker_count, 4);
        assert!(!config.case_sensitive);
        assert_eq!(config.strategy, Strategy::Process);
        assert_eq!(config.encoding_mode, EncodingMode::Lossy);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_default_values() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(b"keywords: [\"needle\"]\n").unwrap();

        let config = SearchConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.keywords, vec!["needle"]);
        assert_eq!(config.root_path, PathBuf::from("."));
        assert_eq!(config.keyword_file, None);
        assert_eq!(config.file_extensions, None);
        assert!(config.ignore_patterns.is_empty());
        assert_eq!(config.worker_count, num_cpus::get());
        assert!(config.case_sensitive);
        assert_eq!(config.strategy, Strategy::Thread);
        assert_eq!(config.encoding_mode, EncodingMode::FailFast);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_merge_with_cli() {
        let file_config = SearchConfig {
            root_path: PathBuf::from("docs"),
            keywords: vec!["alpha".to_string()],
            keyword_file: Some(PathBuf::from("keywords.txt")),
            file_extensions: Some(vec!["txt".to_string()]),
            ignore_patterns: vec!["*.tmp".to_string()],
            worker_count: 4,
            case_sensitive: true,
            strategy: Strategy::Thread,
            encoding_mode: EncodingMode::FailFast,
            log_level: "warn".to_string(),
        };

        let overrides = ConfigOverrides {
            root_path: Some(PathBuf::from("notes")),
            keywords: vec!["beta".to_string()],
            worker_count: Some(8),
            ignore_case: true,
            strategy: Some(Strategy::Process),
            ..Default::default()
        };

        let merged = file_config.merge_with_cli(overrides);
        assert_eq!(merged.root_path, PathBuf::from("notes")); // CLI value
        assert_eq!(merged.keywords, vec!["beta"]); // CLI value
        assert_eq!(merged.keyword_file, Some(PathBuf::from("keywords.txt"))); // File value
        assert_eq!(merged.file_extensions, Some(vec!["txt".to_string()])); // File value
        assert_eq!(merged.ignore_patterns, vec!["*.tmp".to_string()]); // File value
        assert_eq!(merged.worker_count, 8); // CLI value
        assert!(!merged.case_sensitive); // CLI value
        assert_eq!(merged.strategy, Strategy::Process); // CLI value
        assert_eq!(merged.encoding_mode, EncodingMode::FailFast); // File value
        assert_eq!(merged.log_level, "warn"); // File value
    }

    #[test]
    fn test_invalid_config() {
        let config_content = r#"
            root_path: []  # Should be string
            worker_count: "many"  # Should be number
        "#;

        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let result = SearchConfig::load_from(Some(&config_path));
        assert!(result.is_err(), "Expected error loading invalid config");
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = SearchConfig::load_from(Some(Path::new("nonexistent.yaml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let mut config = SearchConfig::new(".", vec!["x".to_string()]);
        config.worker_count = 0;
        assert!(matches!(
            config.validate(),
            Err(SearchError::ConfigError(_))
        ));

        config.worker_count = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolve_keywords_requires_a_source() {
        let config = SearchConfig::new(".", vec![]);
        assert!(matches!(
            config.resolve_keywords(),
            Err(SearchError::ConfigError(_))
        ));
    }

    #[test]
    fn test_resolve_keywords_combines_file_and_inline() {
        let dir = tempdir().unwrap();
        let keyword_path = dir.path().join("keywords.txt");
        std::fs::write(&keyword_path, "alpha\n\n  beta  \n").unwrap();

        let mut config = SearchConfig::new(".", vec!["gamma".to_string(), "  ".to_string()]);
        config.keyword_file = Some(keyword_path);

        assert_eq!(
            config.resolve_keywords().unwrap(),
            vec!["alpha", "beta", "gamma"]
        );
    }

    #[test]
    fn test_missing_keyword_file() {
        let dir = tempdir().unwrap();
        let mut config = SearchConfig::new(".", vec![]);
        config.keyword_file = Some(dir.path().join("missing.txt"));

        assert!(matches!(
            config.resolve_keywords(),
            Err(SearchError::KeywordSource { .. })
        ));
    }

    #[test]
    fn test_parse_strategy_and_encoding() {
        assert_eq!("thread".parse::<Strategy>().unwrap(), Strategy::Thread);
        assert_eq!("Process".parse::<Strategy>().unwrap(), Strategy::Process);
        assert!("fibers".parse::<Strategy>().is_err());
        assert_eq!(Strategy::Process.to_string(), "process");

        assert_eq!(
            "lossy".parse::<EncodingMode>().unwrap(),
            EncodingMode::Lossy
        );
        assert_eq!(
            "failfast".parse::<EncodingMode>().unwrap(),
            EncodingMode::FailFast
        );
        assert!("latin1".parse::<EncodingMode>().is_err());
    }
}
