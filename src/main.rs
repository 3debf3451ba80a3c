//! Shelf-Sweep main entry point
//!
//! This is the command-line interface for the Shelf-Sweep catalog harvester.

use clap::Parser;
use shelf_sweep::config::load_config_with_hash;
use shelf_sweep::crawler::{run_harvest, HarvestReport};
use std::path::PathBuf;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// Shelf-Sweep: a bookshop catalog harvester
///
/// Shelf-Sweep walks a paginated book catalog page by page, fetches every
/// product page it finds, normalizes the listed fields and stores the
/// records in a SQLite database.
#[derive(Parser, Debug)]
#[command(name = "shelf-sweep")]
#[command(version = "0.1.0")]
#[command(about = "A bookshop catalog harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without fetching
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, _config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_harvest(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelf_sweep=info,warn"),
            1 => EnvFilter::new("shelf_sweep=debug,info"),
            2 => EnvFilter::new("shelf_sweep=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &shelf_sweep::config::Config) {
    println!("=== Shelf-Sweep Dry Run ===\n");

    println!("Site:");
    println!("  Start URL: {}", config.site.start_url);
    println!("  Currency symbol: {}", config.site.currency_symbol);
    println!("  User agent: {}", config.site.user_agent);

    println!("\nCrawler:");
    println!("  Fetch workers: {}", config.crawler.fetch_workers);
    println!("  Queue capacity: {}", config.crawler.queue_capacity);
    println!("  Max retries: {}", config.crawler.max_retries);
    println!("  Retry backoff: {}ms", config.crawler.retry_backoff_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Ingest mode: {:?}", config.ingest.mode);

    println!("\n✓ Configuration is valid");
    println!("✓ Would start harvesting from {}", config.site.start_url);
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &shelf_sweep::config::Config) -> Result<(), Box<dyn std::error::Error>> {
    use shelf_sweep::output::{load_statistics, print_statistics};
    use shelf_sweep::storage::SqliteStore;
    use std::path::Path;

    println!("Database: {}\n", config.output.database_path);

    let store = SqliteStore::open(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: shelf_sweep::config::Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Flip the shutdown flag on Ctrl-C so in-flight work winds down and
    // already-committed records stay in place.
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Ctrl-C received, finishing in-flight work");
            let _ = shutdown_tx.send(true);
        }
    });

    match run_harvest(config, shutdown_rx).await {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}

/// Prints the end-of-run report to stdout
fn print_report(report: &HarvestReport) {
    println!("\n=== Harvest Report ===\n");
    println!("  Listing pages walked: {}", report.pages_visited);
    println!("  Items discovered: {}", report.items_discovered);
    println!("  Books inserted: {}", report.books_inserted);
    println!("  Books updated: {}", report.books_updated);
    println!("  Item failures: {}", report.item_failures);
    println!("  Write failures: {}", report.ingest_failures);
    println!("  Genres resolved: {}", report.genres_resolved);
    println!("  Elapsed: {:.1}s", report.elapsed.as_secs_f64());
}
