//! Output module for harvest statistics and exports
//!
//! This module handles:
//! - Loading and printing quote and term statistics
//! - Exporting stored quotes as JSON lines

mod export;
pub mod stats;

pub use export::{export_quotes_json, write_quotes_json};
pub use stats::{load_statistics, print_statistics, CrawlStatistics};

use crate::storage::StorageError;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Refusing to overwrite existing file: {0}")]
    AlreadyExists(String),

    #[error("Failed to serialize quote: {0}")]
    Format(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
