//! Configuration module for Wordtrail
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use wordtrail::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("wordtrail.toml")).unwrap();
//! println!("At most {} pages per term", config.source.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, OutputConfig, PolitenessConfig, SourceConfig, TermsConfig, UserAgentConfig,
    DEFAULT_PUNCTUATION, DEFAULT_SEEDS, MAX_PAGES_CEILING,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
