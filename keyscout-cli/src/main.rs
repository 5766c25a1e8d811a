use clap::{Parser, Subcommand};
use colored::Colorize;
use keyscout::{
    search, search::serve_worker, ConfigOverrides, EncodingMode, SearchConfig, SearchError,
    SearchReport, Strategy,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, SearchError>;

/// Log level handed from the parent to worker processes
const WORKER_LOG_ENV: &str = "KEYSCOUT_WORKER_LOG";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
struct CliSearchConfig {
    /// Root directory to search in
    #[arg(short = 'd', long)]
    root: Option<PathBuf>,

    /// File with one keyword per line
    #[arg(short = 'k', long = "keywords")]
    keyword_file: Option<PathBuf>,

    /// Keyword to search for (can be specified multiple times)
    #[arg(short = 'p', long = "keyword")]
    keywords: Vec<String>,

    /// File extensions to include (e.g. txt,md)
    #[arg(short = 'e', long)]
    extensions: Option<String>,

    /// Patterns to ignore (glob format)
    #[arg(short, long)]
    ignore: Vec<String>,

    /// Number of workers (default: CPU cores)
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    /// How workers run (thread|process)
    #[arg(long)]
    strategy: Option<Strategy>,

    /// Match keywords regardless of case
    #[arg(long)]
    ignore_case: bool,

    /// How to handle invalid UTF-8 sequences (failfast|lossy)
    #[arg(long)]
    encoding: Option<EncodingMode>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Show only statistics, not matching files
    #[arg(short, long)]
    stats: bool,

    /// Configuration file (YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl CliSearchConfig {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            root_path: self.root.clone(),
            keywords: self.keywords.clone(),
            keyword_file: self.keyword_file.clone(),
            file_extensions: self.extensions.as_ref().map(|e| {
                e.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            }),
            ignore_patterns: self.ignore.clone(),
            worker_count: self.workers,
            ignore_case: self.ignore_case,
            strategy: self.strategy,
            encoding_mode: self.encoding,
            log_level: self.log_level.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Search files for keywords
    Search(Box<CliSearchConfig>),

    /// Scan a job read from stdin (used by the process strategy)
    #[command(hide = true)]
    Worker,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Search(args) => run_search(&args),
        Commands::Worker => run_worker(),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // stdout carries results, and the JSON channel in worker processes
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run_search(args: &CliSearchConfig) -> Result<()> {
    let config = SearchConfig::load_from(args.config.as_deref())?.merge_with_cli(args.overrides());

    init_logging(&config.log_level);
    std::env::set_var(WORKER_LOG_ENV, &config.log_level);

    let report = search(&config)?;
    if args.json {
        print_json(&report)?;
    } else {
        print_search_results(&report, args.stats);
    }
    Ok(())
}

fn run_worker() -> Result<()> {
    let level = std::env::var(WORKER_LOG_ENV).unwrap_or_else(|_| "warn".to_string());
    init_logging(&level);

    let stdin = io::stdin();
    let stdout = io::stdout();
    serve_worker(stdin.lock(), stdout.lock())
}

fn format_elapsed(elapsed: Duration) -> String {
    let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
    humantime::format_duration(Duration::from_micros(micros)).to_string()
}

fn print_search_results(report: &SearchReport, stats_only: bool) {
    let result = &report.result;

    if !stats_only {
        for keyword in &report.keywords {
            let paths = result.get(keyword);
            if paths.is_empty() {
                println!("{} {}", keyword.blue(), "(no matches)".dimmed());
                continue;
            }
            println!("{}", keyword.blue());
            for path in paths {
                println!("  {}", path.display());
            }
        }
    }

    if !result.skipped.is_empty() {
        eprintln!(
            "\n{} {} files could not be read:",
            "warning:".yellow().bold(),
            result.skipped.len()
        );
        for skipped in &result.skipped {
            eprintln!("  {}: {}", skipped.path.display(), skipped.reason);
        }
    }

    println!(
        "\nSearch finished in {} for {} files using {} {} workers",
        format_elapsed(report.elapsed),
        report.files_found,
        report.workers,
        report.strategy
    );
    println!(
        "Found {} matches for {} of {} keywords in {} files",
        result.total_matches(),
        result.matches.len(),
        report.keywords.len(),
        result.files_with_matches().to_string().green()
    );
}

/// Shape of `--json` output, with paths rendered lossily
#[derive(Serialize)]
struct JsonReport<'a> {
    matches: BTreeMap<&'a str, Vec<String>>,
    keywords: &'a [String],
    files_found: usize,
    files_scanned: usize,
    bytes_read: u64,
    skipped: Vec<JsonSkipped<'a>>,
    workers: usize,
    strategy: Strategy,
    elapsed_ms: f64,
}

#[derive(Serialize)]
struct JsonSkipped<'a> {
    path: String,
    reason: &'a str,
}

impl<'a> From<&'a SearchReport> for JsonReport<'a> {
    fn from(report: &'a SearchReport) -> Self {
        let result = &report.result;
        Self {
            matches: result
                .iter()
                .map(|(keyword, paths)| (keyword, paths.iter().map(|p| lossy(p)).collect()))
                .collect(),
            keywords: &report.keywords,
            files_found: report.files_found,
            files_scanned: result.files_scanned,
            bytes_read: result.bytes_read,
            skipped: result
                .skipped
                .iter()
                .map(|skipped| JsonSkipped {
                    path: lossy(&skipped.path),
                    reason: &skipped.reason,
                })
                .collect(),
            workers: report.workers,
            strategy: report.strategy,
            elapsed_ms: report.elapsed.as_secs_f64() * 1000.0,
        }
    }
}

fn lossy(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn print_json(report: &SearchReport) -> Result<()> {
    let out = JsonReport::from(report);
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
