//! Storage module for persisting crawl state
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - The term ledger (pending and done terms)
//! - Content-addressed quote storage
//! - The page cursor used to resume an interrupted term
//! - Run history

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::quote::Quote;
use crate::TrailError;
use serde::Serialize;

use std::path::Path;

/// Initializes or opens a storage database
///
/// Parent directories of `path` are created when missing.
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(TrailError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, TrailError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    SqliteStorage::new(path)
}

/// A quote as persisted, with its identity key and discovery metadata
#[derive(Debug, Clone, Serialize)]
pub struct StoredQuote {
    pub id: String,
    #[serde(flatten)]
    pub quote: Quote,
    /// The search term that first found this quote
    pub term: String,
    pub collected_at: String,
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub mode: String,
    pub config_hash: String,
    pub status: RunStatus,
    pub collected: u64,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_roundtrip() {
        for status in &[
            RunStatus::Running,
            RunStatus::Completed,
            RunStatus::Interrupted,
            RunStatus::Failed,
        ] {
            let db_str = status.to_db_string();
            let parsed = RunStatus::from_db_string(db_str);
            assert_eq!(Some(*status), parsed);
        }
    }

    #[test]
    fn test_run_status_invalid() {
        assert_eq!(RunStatus::from_db_string("invalid"), None);
    }

    #[test]
    fn test_open_storage_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("quotes.db");

        let storage = open_storage(&path);

        assert!(storage.is_ok());
        assert!(path.exists());
    }

    #[test]
    fn test_stored_quote_serializes_flat() {
        let stored = StoredQuote {
            id: "abc".to_string(),
            quote: Quote {
                text: "Hi".to_string(),
                author: "A".to_string(),
                title: String::new(),
                tags: vec![],
                likes: 3,
            },
            term: "hi".to_string(),
            collected_at: "2024-01-01T00:00:00+00:00".to_string(),
        };

        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(value["id"], "abc");
        assert_eq!(value["text"], "Hi");
        assert_eq!(value["likes"], 3);
        assert_eq!(value["term"], "hi");
    }
}
