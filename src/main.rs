use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use version_canon::config::{self, BatchConfig, DEFAULT_LOG_FILTER, LOG_ENV_VAR};
use version_canon::output::{to_pretty_json, write_minimal, write_versions};
use version_canon::{Dialect, analyze, parse_all, sort};

#[derive(Parser)]
#[command(name = "version-canon")]
#[command(
    version,
    about = "Canonicalize, sort and match package version strings"
)]
struct Cli {
    /// Write logs to the data directory instead of stderr
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the structured form of each version
    Parse {
        #[arg(required = true)]
        versions: Vec<String>,
    },
    /// Sort versions and print or write them as JSON
    Sort {
        /// Largest version first
        #[arg(long)]
        descending: bool,
        /// Only emit the original strings
        #[arg(long)]
        minimal: bool,
        /// Read versions from a file, one per line
        #[arg(long)]
        input: Option<PathBuf>,
        /// Write JSON to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        versions: Vec<String>,
    },
    /// Match candidate versions against a range
    Match {
        #[arg(long, value_enum)]
        dialect: Dialect,
        range: String,
        candidates: Vec<String>,
    },
    /// Evaluate every range of a batch config
    Batch { config: PathBuf },
}

fn init_tracing(log_file: bool) -> anyhow::Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if !log_file {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    }

    let log_path = config::log_path();
    let log_dir = log_path
        .parent()
        .context("log path has no parent directory")?;
    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {:?}", log_dir))?;
    let file_name = log_path
        .file_name()
        .context("log path has no file name")?;

    let appender = tracing_appender::rolling::never(log_dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

fn read_lines(path: &Path) -> anyhow::Result<Vec<String>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {:?}", path))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file)?;

    match cli.command {
        Command::Parse { versions } => {
            println!("{}", to_pretty_json(&parse_all(&versions))?);
        }
        Command::Sort {
            descending,
            minimal,
            input,
            output,
            mut versions,
        } => {
            if let Some(input) = &input {
                versions.extend(read_lines(input)?);
            }
            let mut parsed = parse_all(&versions);
            sort(&mut parsed, descending);

            match (output, minimal) {
                (Some(path), true) => write_minimal(&path, &parsed)?,
                (Some(path), false) => write_versions(&path, &parsed)?,
                (None, true) => {
                    let originals: Vec<&str> = parsed.iter().map(|v| v.original()).collect();
                    println!("{}", to_pretty_json(&originals)?);
                }
                (None, false) => println!("{}", to_pretty_json(&parsed)?),
            }
        }
        Command::Match {
            dialect,
            range,
            candidates,
        } => {
            let candidates = if candidates.is_empty() {
                BatchConfig::default().candidates()
            } else {
                candidates
            };
            println!("{}", to_pretty_json(&analyze(dialect, &range, &candidates))?);
        }
        Command::Batch { config } => {
            let batch = BatchConfig::load(&config)?;
            let candidates = batch.candidates();
            info!("Evaluating {:?} against {} candidates", config, candidates.len());

            let analyses: Vec<_> = batch
                .ranges()
                .map(|(dialect, range)| analyze(dialect, range, &candidates))
                .collect();
            println!("{}", to_pretty_json(&analyses)?);
        }
    }

    Ok(())
}
