//! JSON lines export of stored quotes
//!
//! One object per line, in insertion order:
//!
//! ```text
//! {"id":"…","text":"…","author":"…","title":"…","tags":[…],"likes":0,"term":"…","collected_at":"…"}
//! ```

use crate::output::{OutputError, OutputResult};
use crate::storage::{Storage, StoredQuote};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes every stored quote to `path` as JSON lines
///
/// An existing file at `path` is never overwritten.
///
/// # Returns
///
/// * `Ok(usize)` - Number of quotes written
/// * `Err(OutputError)` - Reading storage or writing the file failed
pub fn export_quotes_json(storage: &dyn Storage, path: &Path) -> OutputResult<usize> {
    if path.exists() {
        return Err(OutputError::AlreadyExists(path.display().to_string()));
    }

    let quotes = storage.load_quotes()?;
    let file = File::create(path)?;
    let written = write_quotes_json(&quotes, BufWriter::new(file))?;

    tracing::info!("Exported {} quotes to {}", written, path.display());
    Ok(written)
}

/// Serializes quotes to `writer`, one JSON object per line
pub fn write_quotes_json<W: Write>(quotes: &[StoredQuote], mut writer: W) -> OutputResult<usize> {
    for quote in quotes {
        serde_json::to_writer(&mut writer, quote)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(quotes.len())
}
