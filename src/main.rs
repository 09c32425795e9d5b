//! Wordtrail main entry point
//!
//! This is the command-line interface for the Wordtrail quote harvester.

use anyhow::Context;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wordtrail::config::{load_config_with_hash, Config, MAX_PAGES_CEILING};
use wordtrail::crawler::{open_crawler, Coordinator, HttpFetcher};
use wordtrail::output::{export_quotes_json, print_statistics};
use wordtrail::storage::{SqliteStorage, Storage};

/// Wordtrail: a resumable quote harvester
///
/// Wordtrail pages through quote search results one term at a time, stores
/// every new quote once, and feeds the words of each quote back in as future
/// search terms. Interrupted terms resume on the page where they stopped.
#[derive(Parser, Debug)]
#[command(name = "wordtrail")]
#[command(version)]
#[command(about = "A resumable quote harvester", long_about = None)]
#[command(group(
    ArgGroup::new("action")
        .args(["collect", "some_terms", "term", "info", "clear"])
        .multiple(false)
))]
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

    /// Collect at least N new quotes, resuming where the last run stopped
    #[arg(long, value_name = "N")]
    collect: Option<u64>,

    /// Page the next N pending terms through to their last page
    #[arg(long, value_name = "N")]
    some_terms: Option<u32>,

    /// Page one term through to its last page
    #[arg(long, value_name = "WORD")]
    term: Option<String>,

    /// Show statistics from the database and exit
    #[arg(long)]
    info: bool,

    /// Delete every quote, term and run from the database
    #[arg(long)]
    clear: bool,

    /// Export all quotes as JSON lines before running the action
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Copy the database to PATH before running the action
    #[arg(long, value_name = "PATH")]
    dump: Option<PathBuf>,

    /// Fetch at most N pages per term (capped at 100)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pages: Option<u32>,
}

impl Cli {
    fn has_action(&self) -> bool {
        self.collect.is_some()
            || self.some_terms.is_some()
            || self.term.is_some()
            || self.info
            || self.clear
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);
    apply_overrides(&mut config, &cli);

    let mut crawler = open_crawler(&config, &config_hash).with_context(|| {
        format!(
            "Failed to open database {}",
            config.output.database_path
        )
    })?;

    let interrupt = crawler.interrupt_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received; stopping after the current page");
            interrupt.trigger();
        }
    });

    // Exports run against the database as it was before the action
    if let Some(path) = &cli.json {
        let written = export_quotes_json(crawler.storage(), path)
            .with_context(|| format!("Failed to export quotes to {}", path.display()))?;
        println!("✓ Exported {} quotes to: {}", written, path.display());
    }
    if let Some(path) = &cli.dump {
        crawler
            .storage()
            .dump_to(path)
            .with_context(|| format!("Failed to dump database to {}", path.display()))?;
        println!("✓ Database copied to: {}", path.display());
    }

    let exporting = cli.json.is_some() || cli.dump.is_some();
    if !cli.has_action() && exporting {
        return Ok(());
    }

    run_action(&mut crawler, &cli).await?;
    print_statistics(&crawler.stats()?);

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wordtrail=info,warn"),
            1 => EnvFilter::new("wordtrail=debug,info"),
            2 => EnvFilter::new("wordtrail=trace,debug"),
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

/// Applies command line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(pages) = cli.pages {
        config.source.max_pages = pages.min(MAX_PAGES_CEILING);
        tracing::info!("Page cap set to {}", config.source.max_pages);
    }
}

/// Runs the selected action; with none selected only statistics are shown
async fn run_action(
    crawler: &mut Coordinator<SqliteStorage, HttpFetcher>,
    cli: &Cli,
) -> anyhow::Result<()> {
    if let Some(quota) = cli.collect {
        let collected = crawler.collect_up_to(quota).await?;
        println!("✓ Collected {} new quotes", collected);
    } else if let Some(count) = cli.some_terms {
        let collected = crawler.process_terms(count).await?;
        println!("✓ Collected {} new quotes", collected);
    } else if let Some(term) = &cli.term {
        let progress = crawler.process_term(term).await?;
        println!(
            "✓ Collected {} new quotes for \"{}\" ({} pages, {})",
            progress.collected,
            progress.term,
            progress.pages_fetched,
            if progress.completed() {
                "done"
            } else {
                "paused"
            }
        );
    } else if cli.clear {
        crawler.reset()?;
        println!("✓ Database cleared");
    }

    Ok(())
}
