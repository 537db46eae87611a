//! Linkwade main entry point
//!
//! This is the command-line interface for the Linkwade link crawler.

use anyhow::Context;
use clap::Parser;
use linkwade::config::{load_config_with_hash, Config, DEFAULT_CONFIG_PATH};
use linkwade::output::print_statistics;
use linkwade::{CrawlReport, Crawler};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Linkwade: a concurrent, depth-bounded link crawler
///
/// Linkwade walks the pages reachable from a seed URL up to a maximum depth,
/// printing the attribute values of the configured tags on every page.
#[derive(Parser, Debug)]
#[command(name = "linkwade")]
#[command(version = "1.0.0")]
#[command(about = "A concurrent, depth-bounded link crawler", long_about = None)]
struct Cli {
    /// URL to start crawling from
    #[arg(value_name = "SEED")]
    seed: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", default_value = DEFAULT_CONFIG_PATH)]
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

    /// Print crawl statistics once the crawl has finished
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.dry_run {
        handle_dry_run(&config, &cli.seed)
    } else {
        handle_crawl(&config, &cli.seed, cli.stats).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries the recorded values.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkwade=info,warn"),
            1 => EnvFilter::new("linkwade=debug,info"),
            2 => EnvFilter::new("linkwade=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and seed, shows the constraints
fn handle_dry_run(config: &Config, seed: &str) -> anyhow::Result<()> {
    let seed = linkwade::normalize_url(seed).context("invalid seed URL")?;

    println!("=== Linkwade Dry Run ===\n");

    println!("Seed: {}", seed);

    println!("\nSearch Constraints:");
    println!("  Max depth: {}", config.search.max_depth);
    println!("  Same host only: {}", config.search.same_host);
    if config.search.contains_tags.is_empty() {
        println!("  Contains tags: (any anchor)");
    } else {
        println!("  Contains tags: {}", config.search.contains_tags.join(", "));
    }
    match config.search.max_concurrent_fetches {
        Some(limit) => println!("  Max concurrent fetches: {}", limit),
        None => println!("  Max concurrent fetches: unbounded"),
    }

    println!("\nRecording:");
    if config.record.tags.is_empty() {
        println!("  (nothing recorded)");
    } else {
        println!(
            "  {}[{}] as {:?}",
            config.record.tags.join(", "),
            config.record.attr,
            config.record.format
        );
    }

    println!("\nFetcher:");
    println!("  User agent: {}", config.fetcher.user_agent);
    println!("  Timeout: {}s", config.fetcher.timeout_secs);
    println!(
        "  TLS verification: {}",
        if config.fetcher.accept_invalid_certs {
            "disabled"
        } else {
            "enabled"
        }
    );

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, seed: &str, show_stats: bool) -> anyhow::Result<()> {
    let crawler = Crawler::from_config(config).context("failed to set up crawler")?;
    let handle = crawler.start(seed)?;

    // Ctrl-C stops dispatching and lets the crawl drain
    let token = handle.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling crawl");
            token.cancel();
        }
    });

    let report = match handle.join().await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    log_summary(&report);
    if show_stats {
        print_statistics(&report.stats);
    }

    Ok(())
}

fn log_summary(report: &CrawlReport) {
    tracing::info!(
        "Crawl from {} started {} {}: {} pages visited, {} fetched, {} failed in {:.2?}",
        report.seed,
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        if report.cancelled {
            "was cancelled"
        } else {
            "finished"
        },
        report.visited.len(),
        report.stats.pages_fetched,
        report.stats.fetch_failures,
        report.elapsed
    );
}
