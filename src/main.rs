//! Trade-Harvest main entry point
//!
//! This is the command-line interface for the Trade-Harvest catalogue pipeline.

use clap::Parser;
use std::path::{Path, PathBuf};
use trade_harvest::config::{load_config_with_hash, Config};
use trade_harvest::output::{load_statistics, print_run_summary, print_statistics};
use trade_harvest::pipeline::{links_csv_path, select_categories, Pipeline};
use trade_harvest::storage::{SqliteLedger, SILVER_FILE_NAME};
use tracing_subscriber::EnvFilter;

/// Trade-Harvest: a seller catalogue pipeline
///
/// Trade-Harvest discovers sub-categories on category listing pages, pages
/// through the listing API for each one, and consolidates the product records
/// into a single CSV.
#[derive(Parser, Debug)]
#[command(name = "trade-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A seller catalogue pipeline", long_about = None)]
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

    /// Validate config and show what would be scraped without scraping
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics of the latest run from the ledger and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Only process this category (repeatable)
    #[arg(long = "category", value_name = "NAME")]
    categories: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
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
        handle_dry_run(&config, &cli.categories)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_run(config, config_hash, &cli.categories).await?;
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
            0 => EnvFilter::new("trade_harvest=info,warn"),
            1 => EnvFilter::new("trade_harvest=debug,info"),
            2 => EnvFilter::new("trade_harvest=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows the plan
fn handle_dry_run(config: &Config, filter: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let categories = select_categories(config, filter)?;
    let bronze_root = Path::new(&config.output.bronze_path);

    println!("=== Trade-Harvest Dry Run ===\n");

    println!("API:");
    println!("  Base URL: {}", config.api.base_url);
    println!("  Page size: {}", config.api.page_size);
    println!("  Request timeout: {}s", config.api.timeout_secs);
    println!("  Referer: {}", config.api.referer);

    println!("\nScrape Policy:");
    println!("  Delay between pages: {}ms", config.scrape.page_delay_ms);
    println!(
        "  Stagnation threshold: {} pages",
        config.scrape.stagnation_threshold
    );
    println!(
        "  Attempts per sub-category: {} (retry only below page {})",
        config.scrape.max_attempts, config.scrape.retry_page_limit
    );
    println!("  Retry cooldown: {}ms", config.scrape.retry_cooldown_ms);
    println!(
        "  Records without product_id: {:?}",
        config.scrape.anonymous_records
    );

    println!("\nOutput:");
    println!("  Bronze: {}", config.output.bronze_path);
    println!(
        "  Silver: {}",
        Path::new(&config.output.silver_path)
            .join(SILVER_FILE_NAME)
            .display()
    );
    println!("  Ledger: {}", config.output.ledger_path);

    println!("\nCategories ({}):", categories.len());
    for entry in &categories {
        println!("  - {} ({})", entry.name, entry.url);
        println!(
            "    links: {}",
            links_csv_path(bronze_root, &entry.name).display()
        );
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would process {} categories", categories.len());

    Ok(())
}

/// Handles the --stats mode: shows statistics from the ledger
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Ledger: {}\n", config.output.ledger_path);

    let ledger = SqliteLedger::new(Path::new(&config.output.ledger_path))?;

    match load_statistics(&ledger)? {
        Some(stats) => print_statistics(&stats),
        None => println!("No runs recorded yet"),
    }

    Ok(())
}

/// Handles the main pipeline run
async fn handle_run(
    config: Config,
    config_hash: String,
    filter: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Categories: {}, page size: {}",
        config.categories.len(),
        config.api.page_size
    );

    let mut pipeline = Pipeline::new(config, config_hash)?;

    match pipeline.run(filter).await {
        Ok(summary) => {
            print_run_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Pipeline failed: {}", e);
            Err(e.into())
        }
    }
}
