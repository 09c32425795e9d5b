//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::quote::Quote;
use crate::state::{PageCursor, TermState};
use crate::storage::{RunRecord, RunStatus, StoredQuote};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Value does not fit in an SQLite integer: {0}")]
    OutOfRange(#[from] std::num::TryFromIntError),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// The frontier engine only ever reaches persisted state through this trait.
/// The two term sets are never exposed directly, so the rule that a term sits
/// in at most one of them is enforced here and nowhere else.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new run in the `running` state
    ///
    /// # Arguments
    ///
    /// * `mode` - Short name of the operation (`collect`, `process-terms`, ...)
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, mode: &str, config_hash: &str) -> StorageResult<i64>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Closes a run with its final status and collected quote count
    fn finish_run(&mut self, run_id: i64, status: RunStatus, collected: u64)
        -> StorageResult<()>;

    // ===== Term Ledger =====

    /// Returns the state of a term, or None if it has never been seen
    fn term_state(&self, term: &str) -> StorageResult<Option<TermState>>;

    /// Returns true if the term is Pending or Done
    fn is_known_term(&self, term: &str) -> StorageResult<bool> {
        Ok(self.term_state(term)?.is_some())
    }

    /// Inserts every term not already Pending or Done as Pending
    ///
    /// A term that was completed earlier is never re-queued.
    ///
    /// # Returns
    ///
    /// The number of terms newly enqueued
    fn enqueue_terms(&mut self, terms: &[String]) -> StorageResult<u64>;

    /// Returns the oldest Pending term without removing it
    fn next_pending_term(&self) -> StorageResult<Option<String>>;

    /// Moves a term from Pending to Done
    ///
    /// Calling this for a term that is not Pending is a no-op.
    ///
    /// # Returns
    ///
    /// True if the term transitioned, false if nothing changed
    fn mark_term_done(&mut self, term: &str) -> StorageResult<bool>;

    /// Counts Pending terms
    fn count_pending_terms(&self) -> StorageResult<u64>;

    /// Counts Done terms
    fn count_done_terms(&self) -> StorageResult<u64>;

    // ===== Quote Store =====

    /// Stores every quote whose identity key is not yet present
    ///
    /// Existing entries are left untouched. Duplicates inside `quotes` are
    /// stored once.
    ///
    /// # Arguments
    ///
    /// * `quotes` - The fetched quotes
    /// * `term` - The search term they were found through
    ///
    /// # Returns
    ///
    /// The number of quotes that were genuinely new
    fn insert_quotes(&mut self, quotes: &[Quote], term: &str) -> StorageResult<u64>;

    /// Counts distinct stored quotes
    fn count_quotes(&self) -> StorageResult<u64>;

    /// Loads every stored quote in insertion order
    fn load_quotes(&self) -> StorageResult<Vec<StoredQuote>>;

    // ===== Page Cursor =====

    /// Loads the resumption cursor, if one has been saved
    fn load_cursor(&self) -> StorageResult<Option<PageCursor>>;

    /// Saves the resumption cursor, replacing any previous one
    fn save_cursor(&mut self, cursor: &PageCursor) -> StorageResult<()>;

    /// Removes the resumption cursor
    fn clear_cursor(&mut self) -> StorageResult<()>;

    // ===== Maintenance =====

    /// Removes all terms, quotes, runs and the cursor
    fn reset(&mut self) -> StorageResult<()>;

    /// Writes a consistent copy of the whole store to `path`
    fn dump_to(&self, path: &Path) -> StorageResult<()>;
}
