//! Greenharvest main entry point
//!
//! This is the command-line interface for the greenharvest ingestion
//! pipeline. By default it runs the pipeline immediately and then repeats on
//! the configured interval; `--once` is for cron/CI-style one-shot runs.

use anyhow::Context;
use clap::Parser;
use greenharvest::config::{load_config_with_hash, Config};
use greenharvest::pipeline::run_pipeline;
use greenharvest::reconcile::DestinationStore;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Greenharvest: a remote-job ingestion pipeline
///
/// Harvests remote-job postings from a paginated search surface, translates
/// non-English fields, and reconciles the results into a remote table keyed
/// by the canonical posting URL.
#[derive(Parser, Debug)]
#[command(name = "greenharvest")]
#[command(version = "1.0.0")]
#[command(about = "Remote-job ingestion pipeline", long_about = None)]
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

    /// Run the pipeline once and exit (no scheduling)
    #[arg(long, conflicts_with = "smoke_test")]
    once: bool,

    /// Validate configuration and destination connectivity, then exit
    #[arg(long)]
    smoke_test: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.smoke_test {
        handle_smoke_test(&config).await?;
    } else if cli.once {
        handle_run_once(&config).await;
    } else {
        handle_scheduler(&config).await;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("greenharvest=info,warn"),
            1 => EnvFilter::new("greenharvest=debug,info"),
            2 => EnvFilter::new("greenharvest=trace,debug"),
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

/// Handles the --smoke-test mode: prints the effective configuration and
/// probes the destination without touching the search surface
async fn handle_smoke_test(config: &Config) -> anyhow::Result<()> {
    println!("=== Greenharvest Smoke Test ===\n");

    println!("Destination:");
    println!("  URL: {}", config.destination.url);
    println!(
        "  Table: {}.{}",
        config.destination.schema, config.destination.table
    );
    println!("  Conflict column: {}", config.destination.conflict_column);

    println!("\nSearch:");
    println!("  Queries: {:?}", config.search.queries);
    println!("  Locations: {:?}", config.search.locations);
    println!("  Max postings per run: {}", config.search.max_postings_per_run);

    println!("\nPacing:");
    println!(
        "  Delay: {}–{} ms",
        config.pacing.delay_min_ms, config.pacing.delay_max_ms
    );

    println!("\nSchedule:");
    println!("  Every {} hours", config.schedule.run_interval_hours);

    println!(
        "\nSource credentials: {}",
        if config.source.has_credentials() {
            "configured"
        } else {
            "NOT configured (public crawl only)"
        }
    );

    let store = DestinationStore::new(&config.destination)
        .context("failed to build destination client")?;
    match store.probe().await {
        Ok(status) if status == 200 || status == 206 => {
            println!("\n✓ Destination reachable (HTTP {})", status);
        }
        Ok(status) => {
            anyhow::bail!("destination probe failed: HTTP {}", status);
        }
        Err(e) => {
            anyhow::bail!("destination probe failed: {}", e);
        }
    }

    println!("✓ Configuration is valid");
    Ok(())
}

/// Handles the --once mode: a single pipeline run
async fn handle_run_once(config: &Config) {
    let summary = run_pipeline(config).await;
    tracing::info!(
        "Run complete — inserted={}, updated={}",
        summary.inserted,
        summary.updated
    );
}

/// Handles the default mode: run immediately, then repeat on the configured
/// interval forever
async fn handle_scheduler(config: &Config) {
    let hours = config.schedule.run_interval_hours;
    tracing::info!("Scheduler started — pipeline will run every {} hours.", hours);

    let mut interval = tokio::time::interval(Duration::from_secs(u64::from(hours) * 3600));
    loop {
        // The first tick completes immediately, so the first run happens on
        // deploy rather than one interval later
        interval.tick().await;
        let summary = run_pipeline(config).await;
        tracing::info!(
            "Run complete — inserted={}, updated={}",
            summary.inserted,
            summary.updated
        );
    }
}
