//! Page fetching
//!
//! This module defines the [`PageFetcher`] seam the frontier engine pages
//! through, and its HTTP implementation:
//! - Building HTTP clients with proper user agent strings
//! - Building search URLs for a (term, page) pair
//! - Classifying transport and status failures
//!
//! Fetch failures are surfaced as errors, never as an empty page. Retrying is
//! left to whoever runs the engine.

use crate::config::{Config, UserAgentConfig};
use crate::crawler::parser::parse_search_page;
use crate::quote::Quote;
use crate::TrailError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedPage {
    /// Quotes found on the page, in page order
    pub quotes: Vec<Quote>,

    /// Number of result pages the source reports for the term (0 = no results)
    pub total_pages: u32,
}

/// Source of paginated quote search results
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches one 1-based page of results for `term`
    async fn fetch_page(&self, term: &str, page: u32) -> Result<FetchedPage, TrailError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use wordtrail::config::UserAgentConfig;
/// use wordtrail::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "wordtrail".to_string(),
///     crawler_version: "0.1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Formats the user agent: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Builds the search URL for one page of a term
///
/// Existing query parameters on `base` are preserved; `q` and `page` are
/// appended and percent-encoded.
pub fn search_url(base: &Url, term: &str, page: u32) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("q", term)
        .append_pair("page", &page.to_string());
    url
}

/// Fetches quote search pages over HTTP
pub struct HttpFetcher {
    client: Client,
    base_url: Url,
}

impl HttpFetcher {
    /// Creates a fetcher for the configured search endpoint
    pub fn new(config: &Config) -> Result<Self, TrailError> {
        let client = build_http_client(&config.user_agent)?;
        let base_url = Url::parse(&config.source.base_url)?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, term: &str, page: u32) -> Result<FetchedPage, TrailError> {
        let url = search_url(&self.base_url, term, page);
        tracing::trace!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| TrailError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrailError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| TrailError::Http {
            url: url.to_string(),
            source,
        })?;

        parse_search_page(&body).map_err(|message| TrailError::HtmlParse {
            url: url.to_string(),
            message,
        })
    }
}
