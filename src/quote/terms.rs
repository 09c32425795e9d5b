//! Candidate term extraction
//!
//! Quote text is split on whitespace, each token is trimmed of a configurable
//! punctuation class at both edges, and empty leftovers are dropped.

use crate::quote::Quote;
use std::collections::BTreeSet;

/// Derives the set of candidate search terms from a batch of quotes
///
/// This is a pure function: the same quotes and punctuation class always yield
/// the same set. A `BTreeSet` keeps the result ordered so the ledger receives
/// terms in a reproducible order.
///
/// # Arguments
///
/// * `quotes` - Newly fetched quotes
/// * `punctuation` - Characters stripped from both ends of every token
///
/// # Example
///
/// ```
/// use wordtrail::quote::{extract_terms, Quote};
///
/// let quote = Quote {
///     text: "“Stay hungry, stay foolish.”".to_string(),
///     author: String::new(),
///     title: String::new(),
///     tags: vec![],
///     likes: 0,
/// };
/// let terms = extract_terms(&[quote], " .,“”");
/// assert_eq!(terms.len(), 4);
/// assert!(terms.contains("Stay") && terms.contains("stay"));
/// ```
pub fn extract_terms(quotes: &[Quote], punctuation: &str) -> BTreeSet<String> {
    quotes
        .iter()
        .flat_map(|quote| quote.text.split_whitespace())
        .map(|token| token.trim_matches(|c: char| punctuation.contains(c)))
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}
