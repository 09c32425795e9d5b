//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `TermState`: lifecycle of a search term (pending, done)
//! - `PageCursor`: the single resumption marker for a term interrupted mid-pagination

mod cursor;
mod term_state;

// Re-export main types
pub use cursor::PageCursor;
pub use term_state::TermState;
