//! Listing Harvester main entry point
//!
//! This is the command-line interface for the Listing Harvester scraper.

use anyhow::{Context, Result};
use clap::Parser;
use listing_harvester::config::{load_config_with_hash, Config};
use listing_harvester::crawler::{start_url, Harvester};
use listing_harvester::output::{export, print_report, CsvSink, RowSink, SqliteSink, XlsxSink};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Listing Harvester: a polite listing-and-detail scraper
///
/// Walks a paginated listing site, visits every item's detail page,
/// normalizes the labeled fields it finds there and writes one row per item.
#[derive(Parser, Debug)]
#[command(name = "listing-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A polite listing-and-detail scraper", long_about = None)]
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

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Write the CSV here instead of the configured path
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(csv) = &cli.csv {
        config.output.csv_path = csv.display().to_string();
    }

    if cli.dry_run {
        handle_dry_run(&config)
    } else {
        handle_harvest(config, config_hash, cli.quiet).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_harvester=info,warn"),
            1 => EnvFilter::new("listing_harvester=debug,info"),
            2 => EnvFilter::new("listing_harvester=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> Result<()> {
    let start = start_url(&config.site).context("Failed to build the start URL")?;

    println!("=== Listing Harvester Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Start URL: {}", start);
    println!("  Page parameter: {}", config.site.page_param);
    if let Some(size) = config.site.page_size {
        println!("  Page size: {} ({})", size, config.site.page_size_param);
    }

    println!("\nCrawler:");
    println!("  Mode: {:?}", config.crawler.mode);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Fallback page ceiling: {}", config.crawler.fallback_page_ceiling);
    println!(
        "  Retries: {} (base {}ms, +{}ms per attempt)",
        config.crawler.retry_count, config.crawler.retry_base_delay_ms, config.crawler.retry_increment_ms
    );
    println!(
        "  Politeness delay: {}-{}ms",
        config.crawler.politeness_delay_min_ms, config.crawler.politeness_delay_max_ms
    );
    println!("  Respect robots.txt: {}", config.crawler.respect_robots_txt);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nSelectors:");
    println!("  Cards: {} (fallback: {})", config.selectors.card, config.selectors.card_fallback);
    println!("  Pagination: {}", config.selectors.pagination);
    println!("  Detail blocks: {}", config.selectors.block);

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);
    if let Some(xlsx) = &config.output.xlsx_path {
        println!("  XLSX: {}", xlsx);
    }
    if let Some(db) = &config.output.database_path {
        println!("  Database: {}", db);
    }
    if !config.labels.is_empty() {
        println!("  Extra label mappings: {}", config.labels.len());
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Runs the harvest and writes every configured output
async fn handle_harvest(config: Config, config_hash: String, quiet: bool) -> Result<()> {
    let mut sinks: Vec<Box<dyn RowSink>> = vec![Box::new(CsvSink::new(&config.output.csv_path))];
    if let Some(xlsx) = &config.output.xlsx_path {
        sinks.push(Box::new(XlsxSink::new(xlsx)));
    }
    if let Some(db) = &config.output.database_path {
        sinks.push(Box::new(SqliteSink::new(db, config_hash)));
    }

    let harvester = Harvester::from_config(config).context("Failed to set up the harvester")?;
    let outcome = harvester.run().await.context("Harvest failed")?;

    export(&mut sinks, &outcome.rows, &outcome.report).context("Failed to write results")?;

    if !quiet {
        print_report(&outcome.report);
    }
    Ok(())
}
