//! Quote records and term discovery
//!
//! A [`Quote`] is immutable once fetched. Its identity is a fingerprint of its
//! full content, which is what makes storing it idempotent: the same quote
//! reached through two different search terms collapses to one entry.

mod terms;

pub use terms::extract_terms;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};

/// One collected quote with its attribution and tags
///
/// Field order is significant: it defines the canonical serialization the
/// identity key is computed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// The quote text, without surrounding quotation marks
    pub text: String,

    /// Author attribution (may be empty)
    pub author: String,

    /// Source title attribution (may be empty)
    pub title: String,

    /// Tags in the order the source lists them
    pub tags: Vec<String>,

    /// Popularity count
    pub likes: u64,
}

impl Quote {
    /// Returns the canonical serialization: compact JSON, fields in declaration order
    pub fn canonical_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Computes the identity key: lowercase hex SHA-512 of [`Quote::canonical_json`]
    ///
    /// Two quotes with identical content always produce the same key.
    pub fn identity_key(&self) -> Result<String, serde_json::Error> {
        let canonical = self.canonical_json()?;
        let digest = Sha512::digest(canonical.as_bytes());
        Ok(hex::encode(digest))
    }
}
