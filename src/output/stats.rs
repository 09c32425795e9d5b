//! Statistics generation from the quote database
//!
//! This module provides functionality for extracting and displaying
//! harvest statistics from the storage layer.

use crate::storage::{RunRecord, Storage};
use crate::TrailError;

/// Harvest statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Total number of distinct quotes stored
    pub total_quotes: u64,

    /// Terms still waiting to be paged through
    pub pending_terms: u64,

    /// Terms whose result pages were exhausted
    pub done_terms: u64,

    /// Most recently started run, if any
    pub latest_run: Option<RunRecord>,
}

impl CrawlStatistics {
    /// Every term the ledger has ever seen
    pub fn known_terms(&self) -> u64 {
        self.pending_terms + self.done_terms
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(TrailError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> Result<CrawlStatistics, TrailError> {
    Ok(CrawlStatistics {
        total_quotes: storage.count_quotes()?,
        pending_terms: storage.count_pending_terms()?,
        done_terms: storage.count_done_terms()?,
        latest_run: storage.get_latest_run()?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Quotes stored: {}", stats.total_quotes);
    println!("  Terms known: {}", stats.known_terms());
    println!();

    println!("Terms by State:");
    let known = stats.known_terms();
    for (label, count) in [("Pending", stats.pending_terms), ("Done", stats.done_terms)] {
        let percentage = if known > 0 {
            (count as f64 / known as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", label, count, percentage);
    }
    println!();

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run:");
            println!("  Id: {}", run.id);
            println!("  Mode: {}", run.mode);
            println!("  Status: {}", run.status.to_db_string());
            println!("  Started: {}", run.started_at);
            if let Some(finished) = &run.finished_at {
                println!("  Finished: {}", finished);
            }
            println!("  Quotes collected: {}", run.collected);
        }
        None => println!("No runs recorded yet"),
    }
}
