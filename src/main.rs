//! Binary entry point for the apibook CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Document the package in src/mylib into doc/api
//! apibook src/mylib doc/api
//!
//! # Use a custom SUMMARY.md template and skip tests
//! apibook src/mylib doc/api --summary-template-file doc/SUMMARY.tmpl --exclude 'tests/**'
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::info;

use apibook::config::Config;
use apibook::error::{ApibookError, OutputErrorCode};
use apibook::generate::{generate, GenerateOptions};
use apibook::render::RenderOptions;

// ============================================================================
// CLI Structure
// ============================================================================

/// Markdown API reference generator for Python packages.
#[derive(Parser, Debug)]
#[command(name = "apibook", version, about = "Markdown API reference for Python packages")]
struct Cli {
    /// Root directory of the Python package to document.
    root_dir: PathBuf,

    /// Directory receiving the markdown pages and SUMMARY.md.
    output_dir: PathBuf,

    /// Template for SUMMARY.md; `{{apibook_toc}}` is replaced by the table of contents.
    #[arg(long)]
    summary_template_file: Option<PathBuf>,

    /// Configuration file (default: apibook.toml in the current directory, if present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Glob of source paths to skip, relative to the root. Repeatable.
    #[arg(long)]
    exclude: Vec<String>,

    /// Write the resolved model as JSON to this file.
    #[arg(long)]
    dump_model: Option<PathBuf>,

    /// Log level for tracing output.
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,

    /// Shorthand for `--log-level debug`.
    #[arg(short, long)]
    verbose: bool,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl Cli {
    fn effective_log_level(&self) -> LogLevel {
        if self.verbose {
            LogLevel::Debug
        } else {
            self.log_level
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.effective_log_level());

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Diagnostics go to stderr regardless of the log filter
            eprintln!("error: {}", err);
            ExitCode::from(OutputErrorCode::from(&err).code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute a documentation run.
fn execute(cli: Cli) -> Result<(), ApibookError> {
    let config = load_config(cli.config.as_deref())?;
    let options = build_options(cli, config);
    let report = generate(&options)?;
    info!(
        "Documented {} modules ({} re-exports spliced, {} unresolved)",
        report.modules, report.spliced, report.soft_misses
    );
    Ok(())
}

/// Load `--config`, or `apibook.toml` from the working directory.
fn load_config(path: Option<&Path>) -> Result<Config, ApibookError> {
    match path {
        Some(path) => Config::load(path),
        None => Config::load_from_dir(Path::new(".")),
    }
}

/// Merge flags over configuration.
fn build_options(cli: Cli, config: Config) -> GenerateOptions {
    let settings = config.apibook;
    let mut exclude = settings.exclude.clone();
    exclude.extend(cli.exclude);

    GenerateOptions {
        root: cli.root_dir,
        output_dir: cli.output_dir,
        summary_template: cli.summary_template_file.or(settings.summary_template.clone()),
        exclude,
        dump_model: cli.dump_model,
        render: RenderOptions::from(&settings),
    }
}
