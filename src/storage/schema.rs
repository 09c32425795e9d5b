//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Wordtrail database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    mode TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    collected INTEGER NOT NULL DEFAULT 0
);

-- Terms discovered but not yet exhausted; id order is frontier order
CREATE TABLE IF NOT EXISTS pending_terms (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    value TEXT NOT NULL UNIQUE,
    discovered_at TEXT NOT NULL
);

-- Terms whose pages have all been fetched
CREATE TABLE IF NOT EXISTS done_terms (
    value TEXT PRIMARY KEY,
    completed_at TEXT NOT NULL
);

-- Collected quotes, keyed by content fingerprint
CREATE TABLE IF NOT EXISTS quotes (
    id TEXT PRIMARY KEY,
    text TEXT NOT NULL,
    author TEXT NOT NULL,
    title TEXT NOT NULL,
    tags TEXT NOT NULL,
    likes INTEGER NOT NULL,
    term TEXT NOT NULL,
    collected_at TEXT NOT NULL
);

-- Resumption marker; at most one row
CREATE TABLE IF NOT EXISTS page_cursor (
    slot INTEGER PRIMARY KEY CHECK (slot = 1),
    term TEXT NOT NULL,
    page INTEGER NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// Tables emptied by a reset, in deletion order
pub const RESETTABLE_TABLES: [&str; 5] =
    ["page_cursor", "quotes", "pending_terms", "done_terms", "runs"];

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        let result = initialize_schema(&conn);
        assert!(result.is_ok());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize_schema(&conn).unwrap();
        let result = initialize_schema(&conn);

        assert!(result.is_ok());
    }

    #[test]
    fn test_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for table in RESETTABLE_TABLES {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table {} should exist", table);
        }
    }

    #[test]
    fn test_cursor_table_holds_one_row() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO page_cursor (slot, term, page, updated_at) VALUES (1, 'a', 1, 'now')",
            [],
        )
        .unwrap();
        let second = conn.execute(
            "INSERT INTO page_cursor (slot, term, page, updated_at) VALUES (2, 'b', 1, 'now')",
            [],
        );
        assert!(second.is_err());
    }
}
