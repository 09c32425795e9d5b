use serde::Deserialize;

/// Seed terms used when the configuration does not name any
pub const DEFAULT_SEEDS: [&str; 6] = ["everything", "you", "can", "imagine", "is", "real"];

/// Characters trimmed from the edges of candidate terms
pub const DEFAULT_PUNCTUATION: &str = " .,!?'\"“”‘’()-:;…";

/// Hard ceiling on pages fetched per term
pub const MAX_PAGES_CEILING: u32 = 100;

/// Main configuration structure for Wordtrail
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    #[serde(default)]
    pub politeness: PolitenessConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub terms: TermsConfig,
}

/// Quote search endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Search endpoint; `q` and `page` query parameters are appended
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum number of pages fetched for a single term
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,
}

/// Randomized delay between page fetches (milliseconds)
#[derive(Debug, Clone, Deserialize)]
pub struct PolitenessConfig {
    #[serde(rename = "wait-lower")]
    pub wait_lower: u64,

    #[serde(rename = "wait-upper")]
    pub wait_upper: u64,
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self {
            wait_lower: 10,
            wait_upper: 100,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Term discovery configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TermsConfig {
    /// Terms enqueued when the ledger is empty
    #[serde(default = "default_seeds")]
    pub seeds: Vec<String>,

    /// Characters trimmed from both ends of every token
    #[serde(default = "default_punctuation")]
    pub punctuation: String,
}

impl Default for TermsConfig {
    fn default() -> Self {
        Self {
            seeds: default_seeds(),
            punctuation: default_punctuation(),
        }
    }
}

fn default_max_pages() -> u32 {
    MAX_PAGES_CEILING
}

fn default_seeds() -> Vec<String> {
    DEFAULT_SEEDS.iter().map(|s| s.to_string()).collect()
}

fn default_punctuation() -> String {
    DEFAULT_PUNCTUATION.to_string()
}
