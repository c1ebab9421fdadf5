use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use shelf_match::config::{load_config, save_config, Config};
use shelf_match::input::read_tasks;
use shelf_match::matching::MatchScorer;
use shelf_match::output::{write_report, OutputFormat, ReportMetadata};
use shelf_match::search::{BatchReport, Orchestrator, SearchOptions};
use shelf_match::sources::BookOutletCatalog;
use shelf_match::ui::{self, BatchProgress, Palette};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status after Ctrl-C, following the shell convention
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Exit status when some titles were never searched without an interrupt
const INCOMPLETE_EXIT_CODE: i32 = 1;

/// Shelf Match - Find the books on your Goodreads shelf that BookOutlet has in stock
#[derive(Parser, Debug)]
#[command(name = "shelf-match")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Match a Goodreads reading list against the BookOutlet catalog", long_about = None)]
struct Cli {
    /// Goodreads library export (CSV)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Bookshelf to search (e.g. to-read)
    #[arg(long)]
    shelf: Option<String>,

    /// Report path; the format's extension is added when missing
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Report format
    #[arg(long, short, value_enum)]
    format: Option<FormatArg>,

    /// Minimum match score (0-100)
    #[arg(long, short, value_parser = clap::value_parser!(u8).range(0..=100))]
    threshold: Option<u8>,

    /// Number of concurrent workers (1-20)
    #[arg(long, short, value_parser = clap::value_parser!(u16).range(1..=20))]
    workers: Option<u16>,

    /// Minimum delay between catalog requests in milliseconds (0-5000)
    #[arg(long, value_parser = clap::value_parser!(u64).range(0..=5000))]
    delay_ms: Option<u64>,

    /// Search one title at a time
    #[arg(long)]
    no_parallel: bool,

    /// Keep at most one catalog request in flight across all workers
    #[arg(long)]
    single_flight: bool,

    /// Ignore ISBNs when matching
    #[arg(long)]
    no_isbn: bool,

    /// Reject fuzzy matches whose author differs
    #[arg(long)]
    require_author_match: bool,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective configuration to this file and exit
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Show all environment variables
    #[arg(long)]
    env: bool,
}

/// Report formats accepted on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    Text,
    Json,
    Csv,
    Markdown,
    Html,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Markdown => OutputFormat::Markdown,
            FormatArg::Html => OutputFormat::Html,
        }
    }
}

/// Print all available environment variables
fn print_env_vars() {
    println!("Shelf Match - Environment Variables");
    println!();
    println!("Every configuration key can be set as SHELF_MATCH_<SECTION>__<KEY>:");
    println!("  SHELF_MATCH_INPUT__CSV_PATH           Goodreads export (default: goodreads_library_export.csv)");
    println!("  SHELF_MATCH_INPUT__BOOKSHELF          Shelf to search (default: to-read)");
    println!("  SHELF_MATCH_OUTPUT__PATH              Report path (default: output)");
    println!("  SHELF_MATCH_OUTPUT__FORMAT            text, json, csv, markdown or html (default: text)");
    println!("  SHELF_MATCH_MATCHING__THRESHOLD       Minimum match score (default: 90)");
    println!("  SHELF_MATCH_MATCHING__USE_ISBN        Match on ISBNs (default: true)");
    println!("  SHELF_MATCH_PARALLEL__WORKERS         Concurrent workers (default: 5)");
    println!("  SHELF_MATCH_PARALLEL__DELAY_MS        Delay between requests (default: 100)");
    println!("  SHELF_MATCH_PARALLEL__SINGLE_FLIGHT   One catalog request at a time (default: false)");
    println!("  SHELF_MATCH_LOGGING__LEVEL            Log level when -v/-q are not given (default: info)");
    println!();
    println!("Other Settings:");
    println!("  RUST_LOG                              Rust logging filter (overrides everything else)");
}

/// Apply command-line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(csv) = &cli.csv {
        config.input.csv_path = csv.clone();
    }
    if let Some(shelf) = &cli.shelf {
        config.input.bookshelf = shelf.clone();
    }
    if let Some(output) = &cli.output {
        config.output.path = output.clone();
    }
    if let Some(format) = cli.format {
        config.output.format = format.into();
    }
    if let Some(threshold) = cli.threshold {
        config.matching.threshold = threshold;
    }
    if cli.no_isbn {
        config.matching.use_isbn = false;
    }
    if cli.require_author_match {
        config.matching.require_author_match = true;
    }
    if let Some(workers) = cli.workers {
        config.parallel.workers = usize::from(workers);
    }
    if let Some(delay_ms) = cli.delay_ms {
        config.parallel.delay_ms = delay_ms;
    }
    if cli.no_parallel {
        config.parallel.enabled = false;
    }
    if cli.single_flight {
        config.parallel.single_flight = true;
    }
    if cli.no_progress {
        config.display.show_progress = false;
    }
    if cli.no_color {
        config.display.color = false;
    }
    if cli.verbose > 0 {
        config.display.verbose = true;
    }
}

fn init_tracing(cli: &Cli, config: &Config) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => config.logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("shelf_match={}", level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn interrupt_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    tracing::info!("Received interrupt, stopping search");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.env {
        print_env_vars();
        return Ok(());
    }

    let mut config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    apply_overrides(&mut config, &cli);
    config.validate().context("Invalid configuration")?;

    init_tracing(&cli, &config);

    if let Some(path) = &cli.save_config {
        save_config(&config, path)
            .with_context(|| format!("Failed to save configuration to {}", path.display()))?;
        println!("Configuration saved to {}", path.display());
        return Ok(());
    }

    let color = config.display.color && std::io::stdout().is_terminal();
    let palette = Palette::new(color);

    let tasks = read_tasks(&config.input.csv_path, &config.input.bookshelf).with_context(|| {
        format!(
            "Failed to read reading list from {}",
            config.input.csv_path.display()
        )
    })?;
    let total = tasks.len();

    if total == 0 {
        tracing::warn!(
            "No books found on shelf '{}' in {}",
            config.input.bookshelf,
            config.input.csv_path.display()
        );
    }

    if !cli.quiet {
        ui::print_search_header(
            palette,
            &config.input.csv_path,
            total,
            config.matching.threshold,
        );
    }

    let catalog = Arc::new(BookOutletCatalog::new().context("Failed to create BookOutlet client")?);
    let scorer = Arc::new(MatchScorer::new(config.matching.clone())?);
    let orchestrator = Orchestrator::new(catalog, scorer, SearchOptions::from(&config.parallel))?;

    let show_progress = config.display.show_progress && !cli.quiet && std::io::stderr().is_terminal();
    let progress = BatchProgress::new(total, show_progress);
    let report = orchestrator
        .search_batch_until(
            tasks,
            |completed, title| progress.advance(completed, title),
            interrupt_signal(),
        )
        .await;
    progress.finish(&report);

    let metadata = ReportMetadata::new(report.finished(), config.matching.threshold);
    let written = write_report(
        &config.output.path,
        config.output.format,
        &report.results,
        &metadata,
    )
    .context("Failed to write report")?;

    if !cli.quiet {
        ui::print_results(palette, &report.results, color);
        ui::print_summary(palette, &report, config.matching.threshold, Some(&written));
    }

    if let Some(code) = exit_code(&report) {
        std::process::exit(code);
    }
    Ok(())
}

/// Non-zero exit status for a batch that did not run to completion
fn exit_code(report: &BatchReport) -> Option<i32> {
    if report.interrupted {
        Some(INTERRUPTED_EXIT_CODE)
    } else if report.unfinished() > 0 {
        tracing::error!("{} titles were never searched", report.unfinished());
        Some(INCOMPLETE_EXIT_CODE)
    } else {
        None
    }
}
