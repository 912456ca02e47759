//! Lounge-Atlas main entry point
//!
//! This is the command-line interface for the Lounge-Atlas crawler and query API.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use lounge_atlas::config::{load_or_default, Config};
use lounge_atlas::crawler::{Crawler, StageReport};
use lounge_atlas::directory::AirportDirectory;
use lounge_atlas::query::QueryService;
use lounge_atlas::store::FsStore;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Lounge-Atlas: an airport lounge crawler and query service
///
/// Lounge-Atlas fetches one record per known airport, discovers the lounges
/// those records list, fetches one record per lounge, and serves the stored
/// airport records over a small HTTP API.
#[derive(Parser, Debug)]
#[command(name = "lounge-atlas")]
#[command(version)]
#[command(about = "An airport lounge crawler and query service", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch one record per directory airport
    CrawlAirports(CrawlArgs),

    /// Discover lounges in stored airport records and fetch them
    CrawlLounges(CrawlArgs),

    /// Run both crawl stages, airports first
    Crawl(CrawlArgs),

    /// Serve the query API
    Serve,

    /// Validate config and show the effective settings without crawling
    CheckConfig,
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Fetch every item again, even when its record already exists
    #[arg(long)]
    refetch: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    finish(run(cli).await)
}

/// Loads configuration and dispatches the selected command
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_configuration(cli.config.as_deref())?;

    match cli.command {
        Command::CrawlAirports(args) => handle_crawl_airports(&config, args).await,
        Command::CrawlLounges(args) => handle_crawl_lounges(&config, args).await,
        Command::Crawl(args) => handle_crawl(&config, args).await,
        Command::Serve => handle_serve(&config).await,
        Command::CheckConfig => handle_check_config(&config),
    }
}

/// Logs a fatal error once and maps the outcome to the process exit code
fn finish(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("lounge_atlas=info,warn"),
            1 => EnvFilter::new("lounge_atlas=debug,tower_http=debug,info"),
            2 => EnvFilter::new("lounge_atlas=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads and validates the configuration, or the defaults without a file
fn load_configuration(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => tracing::info!("Loading configuration from: {}", path.display()),
        None => tracing::info!("No configuration file given, using defaults"),
    }

    let (config, hash) = load_or_default(path).context("Failed to load configuration")?;
    if let Some(hash) = hash {
        tracing::info!("Configuration loaded successfully (hash: {})", hash);
    }

    Ok(config)
}

fn load_directory(config: &Config) -> anyhow::Result<AirportDirectory> {
    AirportDirectory::load(config.directory.path.as_deref()).context("Failed to load airport directory")
}

fn build_crawler(config: &Config, args: &CrawlArgs) -> anyhow::Result<Crawler> {
    let crawler = Crawler::new(config).context("Failed to set up crawler")?;
    if args.refetch {
        tracing::info!("Refetching every item, existing records will be overwritten");
        return Ok(crawler.with_skip_existing(false));
    }
    Ok(crawler)
}

/// Handles `crawl-airports`: stage one
async fn handle_crawl_airports(config: &Config, args: CrawlArgs) -> anyhow::Result<()> {
    let directory = load_directory(config)?;
    let crawler = build_crawler(config, &args)?;

    let report = crawler.run_airports(&directory).await?;
    print_report(&report);

    Ok(())
}

/// Handles `crawl-lounges`: discovery, then stage two
async fn handle_crawl_lounges(config: &Config, args: CrawlArgs) -> anyhow::Result<()> {
    let crawler = build_crawler(config, &args)?;

    let report = crawler.run_lounges().await?;
    print_report(&report);

    Ok(())
}

/// Handles `crawl`: both stages in order
async fn handle_crawl(config: &Config, args: CrawlArgs) -> anyhow::Result<()> {
    let directory = load_directory(config)?;
    let crawler = build_crawler(config, &args)?;

    let (airports, lounges) = crawler.run_all(&directory).await?;
    print_report(&airports);
    print_report(&lounges);

    Ok(())
}

/// Handles `serve`: the query API over the stored airport records
async fn handle_serve(config: &Config) -> anyhow::Result<()> {
    let directory = Arc::new(load_directory(config)?);
    let store = Arc::new(FsStore::new(config.storage.airports_path()));

    tracing::info!(
        "Serving {} directory airports from {}",
        directory.len(),
        store.root().display()
    );

    let service = QueryService::new(
        directory,
        store,
        Duration::from_secs(config.server.cache_ttl_secs),
    )
    .with_default_radius(config.server.default_radius_km);

    lounge_atlas::server::serve(&config.server, Arc::new(service))
        .await
        .context("Query API failed")?;

    Ok(())
}

/// Handles `check-config`: validates config and shows what would be used
fn handle_check_config(config: &Config) -> anyhow::Result<()> {
    let directory = load_directory(config)?;

    println!("=== Lounge-Atlas Configuration ===\n");

    println!("Crawler:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  Airport delay: {}ms", config.crawler.airport_delay_ms);
    println!("  Lounge delay: {}ms", config.crawler.lounge_delay_ms);
    println!("  Skip existing: {}", config.crawler.skip_existing);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Dedupe lounges: {}", config.crawler.dedupe_lounges);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nStorage:");
    println!("  Airports: {}", config.storage.airports_path().display());
    println!("  Lounges: {}", config.storage.lounges_path().display());

    println!("\nServer:");
    println!("  Bind: {}", config.server.bind);
    println!("  Cache TTL: {}s", config.server.cache_ttl_secs);
    println!("  Default radius: {}km", config.server.default_radius_km);

    println!("\nDirectory:");
    match &config.directory.path {
        Some(path) => println!("  Source: {}", path.display()),
        None => println!("  Source: bundled"),
    }
    println!("  Airports: {}", directory.len());

    println!("\n✓ Configuration is valid");
    println!("✓ Stage one would request {} airport records", directory.len());

    Ok(())
}

/// Prints a stage summary, including each failed item and its cause
fn print_report(report: &StageReport) {
    println!("\n=== Stage: {} ===", report.stage);
    println!("  Processed: {}", report.processed);
    println!("  Fetched: {}", report.fetched);
    println!("  Skipped: {}", report.skipped);
    println!("  Failed: {}", report.failed.len());
    println!("  Elapsed: {}s", report.elapsed().num_seconds());

    if !report.is_clean() {
        println!("\n  Failed items:");
        for failed in &report.failed {
            println!("    - {}: {}", failed.item, failed.error.cause);
        }
    }
}
