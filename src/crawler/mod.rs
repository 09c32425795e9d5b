//! Crawler module for paging quote searches
//!
//! This module contains the core harvesting logic, including:
//! - Fetching search result pages over HTTP
//! - Parsing quotes and page counts out of result HTML
//! - Randomized politeness delays between fetches
//! - The frontier engine that walks terms and resumes interrupted ones

mod coordinator;
mod fetcher;
mod parser;
mod politeness;

pub use coordinator::{Coordinator, InterruptHandle, TermOutcome, TermProgress};
pub use fetcher::{
    build_http_client, search_url, user_agent_string, FetchedPage, HttpFetcher, PageFetcher,
};
pub use parser::parse_search_page;
pub use politeness::Politeness;

use crate::config::Config;
use crate::storage::{open_storage, SqliteStorage};
use crate::TrailError;
use std::path::Path;

/// Opens the configured database and builds a coordinator over HTTP
///
/// This is the main entry point for harvesting. It will:
/// 1. Open (or create) the SQLite database named in the config
/// 2. Build the HTTP client for the search endpoint
/// 3. Seed the term ledger if it is empty
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `config_hash` - Hash recorded on every run
///
/// # Returns
///
/// * `Ok(Coordinator)` - Ready to run operations
/// * `Err(TrailError)` - Opening storage or building the client failed
pub fn open_crawler(
    config: &Config,
    config_hash: &str,
) -> Result<Coordinator<SqliteStorage, HttpFetcher>, TrailError> {
    let storage = open_storage(Path::new(&config.output.database_path))?;
    let fetcher = HttpFetcher::new(config)?;
    Ok(Coordinator::new(config, storage, fetcher)?.with_config_hash(config_hash))
}
