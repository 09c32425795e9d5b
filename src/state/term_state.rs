//! Term lifecycle states
//!
//! A term is created Pending when first discovered and becomes Done once every
//! page of its results has been fetched. It never goes back.

/// Where a term sits in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermState {
    /// Discovered but not yet fully paged through
    Pending,

    /// All pages fetched; never reprocessed by the frontier
    Done,
}
