//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::quote::Quote;
use crate::state::{PageCursor, TermState};
use crate::storage::schema::{initialize_schema, RESETTABLE_TABLES};
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus, StoredQuote};
use crate::TrailError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
///
/// Owns its connection; dropping the storage closes the database.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(TrailError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, TrailError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, TrailError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        mode: row.get(3)?,
        config_hash: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(RunStatus::Failed),
        collected: row.get::<_, i64>(6)? as u64,
    })
}

fn count(conn: &Connection, sql: &str) -> StorageResult<u64> {
    let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(n as u64)
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, mode: &str, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, mode, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![now, mode, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, mode, config_hash, status, collected
                 FROM runs ORDER BY id DESC LIMIT 1",
                [],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        collected: u64,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let collected = i64::try_from(collected)?;
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, collected = ?3 WHERE id = ?4",
            params![status.to_db_string(), now, collected, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Term Ledger =====

    fn term_state(&self, term: &str) -> StorageResult<Option<TermState>> {
        let pending = self
            .conn
            .prepare_cached("SELECT 1 FROM pending_terms WHERE value = ?1")?
            .exists(params![term])?;
        if pending {
            return Ok(Some(TermState::Pending));
        }

        let done = self
            .conn
            .prepare_cached("SELECT 1 FROM done_terms WHERE value = ?1")?
            .exists(params![term])?;
        Ok(done.then_some(TermState::Done))
    }

    fn enqueue_terms(&mut self, terms: &[String]) -> StorageResult<u64> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut queued = 0u64;
        {
            let mut done = tx.prepare("SELECT 1 FROM done_terms WHERE value = ?1")?;
            let mut insert = tx.prepare(
                "INSERT OR IGNORE INTO pending_terms (value, discovered_at) VALUES (?1, ?2)",
            )?;

            for term in terms {
                if done.exists(params![term])? {
                    continue;
                }
                queued += insert.execute(params![term, now])? as u64;
            }
        }
        tx.commit()?;
        Ok(queued)
    }

    fn next_pending_term(&self) -> StorageResult<Option<String>> {
        let term = self
            .conn
            .query_row(
                "SELECT value FROM pending_terms ORDER BY id ASC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(term)
    }

    fn mark_term_done(&mut self, term: &str) -> StorageResult<bool> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let removed = tx.execute("DELETE FROM pending_terms WHERE value = ?1", params![term])?;
        if removed > 0 {
            tx.execute(
                "INSERT OR IGNORE INTO done_terms (value, completed_at) VALUES (?1, ?2)",
                params![term, now],
            )?;
        }
        tx.commit()?;
        Ok(removed > 0)
    }

    fn count_pending_terms(&self) -> StorageResult<u64> {
        count(&self.conn, "SELECT COUNT(*) FROM pending_terms")
    }

    fn count_done_terms(&self) -> StorageResult<u64> {
        count(&self.conn, "SELECT COUNT(*) FROM done_terms")
    }

    // ===== Quote Store =====

    fn insert_quotes(&mut self, quotes: &[Quote], term: &str) -> StorageResult<u64> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut inserted = 0u64;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO quotes (id, text, author, title, tags, likes, term, collected_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;

            for quote in quotes {
                let id = quote.identity_key()?;
                let tags = serde_json::to_string(&quote.tags)?;
                let likes = i64::try_from(quote.likes)?;
                inserted += stmt.execute(params![
                    id,
                    quote.text,
                    quote.author,
                    quote.title,
                    tags,
                    likes,
                    term,
                    now
                ])? as u64;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    fn count_quotes(&self) -> StorageResult<u64> {
        count(&self.conn, "SELECT COUNT(*) FROM quotes")
    }

    fn load_quotes(&self) -> StorageResult<Vec<StoredQuote>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, text, author, title, tags, likes, term, collected_at
             FROM quotes ORDER BY rowid ASC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, i64>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, text, author, title, tags, likes, term, collected_at)| {
                Ok(StoredQuote {
                    id,
                    quote: Quote {
                        text,
                        author,
                        title,
                        tags: serde_json::from_str(&tags)?,
                        likes: u64::try_from(likes)?,
                    },
                    term,
                    collected_at,
                })
            })
            .collect()
    }

    // ===== Page Cursor =====

    fn load_cursor(&self) -> StorageResult<Option<PageCursor>> {
        let cursor = self
            .conn
            .query_row(
                "SELECT term, page FROM page_cursor WHERE slot = 1",
                [],
                |row| {
                    Ok(PageCursor {
                        term: row.get(0)?,
                        page: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(cursor)
    }

    fn save_cursor(&mut self, cursor: &PageCursor) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO page_cursor (slot, term, page, updated_at) VALUES (1, ?1, ?2, ?3)
             ON CONFLICT(slot) DO UPDATE SET
                term = excluded.term, page = excluded.page, updated_at = excluded.updated_at",
            params![cursor.term, cursor.page, now],
        )?;
        Ok(())
    }

    fn clear_cursor(&mut self) -> StorageResult<()> {
        self.conn.execute("DELETE FROM page_cursor", [])?;
        Ok(())
    }

    // ===== Maintenance =====

    fn reset(&mut self) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        for table in RESETTABLE_TABLES {
            tx.execute(&format!("DELETE FROM {}", table), [])?;
        }
        tx.execute("DELETE FROM sqlite_sequence", [])?;
        tx.commit()?;
        Ok(())
    }

    fn dump_to(&self, path: &Path) -> StorageResult<()> {
        if path.exists() {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} already exists", path.display()),
            )));
        }
        let target = path.to_string_lossy().into_owned();
        self.conn.execute("VACUUM INTO ?1", params![target])?;
        Ok(())
    }
}
