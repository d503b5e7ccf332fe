//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building the HTTP client with the crawler's user agent and timeouts
//! - GET requests for page content
//! - Turning every outcome into a page record, failures included

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::crawler::parser::extract_page;
use crate::output::PageRecord;
use crate::{Result, SitemapError};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// Every request is bounded by the configured request timeout; a request that
/// exceeds it fails with a timeout error instead of stalling the crawl.
///
/// # Example
///
/// ```no_run
/// use sitemapper::config::{CrawlerConfig, UserAgentConfig};
/// use sitemapper::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(crawler.request_timeout())
        .connect_timeout(crawler.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// A successfully downloaded HTML document
#[derive(Debug, Clone)]
pub struct FetchedHtml {
    /// URL of the final response, after redirects
    pub final_url: Url,

    pub body: String,
}

/// Outcome of fetching one page
#[derive(Debug)]
pub enum PageFetch {
    /// The page was downloaded and its links and assets extracted
    Parsed(PageRecord),

    /// The fetch failed; the record carries only the location
    Failed {
        record: PageRecord,
        error: SitemapError,
    },
}

impl PageFetch {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn record(&self) -> &PageRecord {
        match self {
            Self::Parsed(record) | Self::Failed { record, .. } => record,
        }
    }

    pub fn into_record(self) -> PageRecord {
        match self {
            Self::Parsed(record) | Self::Failed { record, .. } => record,
        }
    }
}

/// Fetches pages and extracts their links and assets
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetches a page and builds its record
    ///
    /// This never fails: a transport error, timeout, non-success status,
    /// non-HTML content type or unreadable body is logged and yields
    /// [`PageFetch::Failed`] with a record that has `location` set and every
    /// set empty.
    ///
    /// # Arguments
    ///
    /// * `location` - The normalized page URL
    pub async fn fetch(&self, location: &Url) -> PageFetch {
        match self.try_fetch(location).await {
            Ok(record) => PageFetch::Parsed(record),
            Err(error) => {
                tracing::warn!("Recording empty page for {}: {}", location, error);
                PageFetch::Failed {
                    record: PageRecord::empty(location.as_str()),
                    error,
                }
            }
        }
    }

    async fn try_fetch(&self, location: &Url) -> Result<PageRecord> {
        let fetched = self.fetch_html(location).await?;
        let extracted = extract_page(&fetched.body, &fetched.final_url);

        // Links stay on the host that was asked for, even after a redirect
        let links = if crate::url::same_host(&fetched.final_url, location) {
            extracted.links
        } else {
            tracing::debug!(
                "{} redirected off-site to {}, dropping its links",
                location,
                fetched.final_url
            );
            Vec::new()
        };

        Ok(PageRecord::new(
            location.as_str(),
            links,
            extracted.stylesheets,
            extracted.scripts,
            extracted.images,
        ))
    }

    /// Downloads an HTML document
    ///
    /// # Returns
    ///
    /// * `Ok(FetchedHtml)` - A 2xx HTML (or untyped) response body
    /// * `Err(SitemapError::Timeout)` - The request exceeded the timeout
    /// * `Err(SitemapError::Http)` - The request failed in transport
    /// * `Err(SitemapError::Status)` - The server answered with a non-2xx status
    /// * `Err(SitemapError::ContentType)` - The response is not HTML
    pub async fn fetch_html(&self, url: &Url) -> Result<FetchedHtml> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| SitemapError::from_request(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SitemapError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase());

        if let Some(content_type) = content_type {
            if !is_html(&content_type) {
                return Err(SitemapError::ContentType {
                    url: url.to_string(),
                    content_type,
                });
            }
        }

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| SitemapError::from_request(url.as_str(), e))?;

        Ok(FetchedHtml { final_url, body })
    }
}

fn is_html(content_type: &str) -> bool {
    content_type.contains("text/html") || content_type.contains("application/xhtml+xml")
}
