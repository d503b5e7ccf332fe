//! Robots.txt handling module
//!
//! This module downloads, persists and parses a site's robots.txt, and
//! answers whether a path may be crawled by the generic `*` user agent.
//!
//! Policy for unavailable robots.txt files:
//! - a non-2xx response means the site publishes no restrictions
//! - a transport failure or timeout is reported as an error; the crawler
//!   recovers by treating the site as unrestricted

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::{RobotsRuleSet, DEFAULT_CRAWL_DELAY_SECONDS};

use crate::url::robots_url;
use crate::{Result, SitemapError, UrlError};
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Outcome of a freshness check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotsRefresh {
    /// The persisted copy is still within the freshness window
    Fresh,

    /// A new copy was downloaded and persisted
    Downloaded {
        /// Whether the content differs from the copy it replaced
        changed: bool,
    },

    /// The site answered with a non-success status; no copy is kept
    Unpublished { status: u16 },
}

/// Downloads, caches and evaluates robots.txt for a site
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    client: Client,
    cache: RobotsCache,
}

impl RobotsPolicy {
    /// Creates a policy storing copies in `directory` for at most `max_age`
    pub fn new(client: Client, directory: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            client,
            cache: RobotsCache::new(directory, max_age),
        }
    }

    pub fn cache(&self) -> &RobotsCache {
        &self.cache
    }

    /// Makes sure a fresh copy of the site's robots.txt is persisted
    ///
    /// Downloads `{scheme}://{host}/robots.txt` when no copy exists or the
    /// existing copy is older than the freshness window.
    ///
    /// # Returns
    ///
    /// * `Ok(RobotsRefresh)` - What, if anything, was downloaded
    /// * `Err(SitemapError::RobotsFetch)` - The request failed in transport
    /// * `Err(SitemapError::Timeout)` - The request exceeded the timeout
    /// * `Err(SitemapError::Io)` - The copy could not be written
    pub async fn ensure_fresh(&self, site: &Url) -> Result<RobotsRefresh> {
        if !self.cache.is_stale(site)? {
            tracing::debug!("Using persisted robots.txt for {}", site);
            return Ok(RobotsRefresh::Fresh);
        }

        let robots_url = robots_url(site).ok_or(UrlError::MissingHost)?;
        tracing::debug!("Fetching robots.txt from {}", robots_url);

        let response = self
            .client
            .get(&robots_url)
            .send()
            .await
            .map_err(|e| robots_error(&robots_url, e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::info!(
                "No robots.txt published at {} (HTTP {}), crawling without restrictions",
                robots_url,
                status.as_u16()
            );
            self.cache.remove(site)?;
            return Ok(RobotsRefresh::Unpublished {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| robots_error(&robots_url, e))?;

        let previous = self.cache.read(site)?;
        self.cache.write(site, &body)?;

        let changed = previous.map_or(true, |old| old != body);
        if changed {
            tracing::info!("Stored robots.txt for {} ({} bytes)", site, body.len());
        }

        Ok(RobotsRefresh::Downloaded { changed })
    }

    /// Builds the rule set from the persisted copy
    ///
    /// A missing copy means the site publishes no restrictions. An existing
    /// copy that cannot be read is an error.
    pub fn parse(&self, site: &Url) -> Result<RobotsRuleSet> {
        let Some(content) = self.cache.read(site)? else {
            return Ok(RobotsRuleSet::allow_all());
        };

        let fetched_at = self
            .cache
            .modified_at(site)?
            .unwrap_or_else(chrono::Utc::now);

        Ok(RobotsRuleSet::parse(&content, fetched_at))
    }

    /// Refreshes if needed and returns the site's rule set
    ///
    /// An unreachable robots.txt is logged and treated as unrestricted; a
    /// stale copy still on disk is preferred over no rules at all.
    pub async fn load(&self, site: &Url) -> Result<RobotsRuleSet> {
        match self.ensure_fresh(site).await {
            Ok(_) => self.parse(site),
            Err(e) if e.is_robots_unavailable() => {
                tracing::warn!("{}; continuing as if the site had no restrictions", e);
                // Stamp the fallback as fresh so the next attempt waits a
                // whole window instead of retrying on every page.
                let mut rules = self.parse(site)?;
                rules.fetched_at = chrono::Utc::now();
                Ok(rules)
            }
            Err(e) => Err(e),
        }
    }
}

/// Checks if a path is allowed by a rule set
///
/// # Arguments
///
/// * `rules` - The parsed robots.txt rules
/// * `path` - The URL path to check
///
/// # Returns
///
/// * `true` - If the path is allowed
/// * `false` - If the path is disallowed
pub fn is_allowed(rules: &RobotsRuleSet, path: &str) -> bool {
    rules.is_allowed(path)
}

fn robots_error(url: &str, source: reqwest::Error) -> SitemapError {
    if source.is_timeout() {
        SitemapError::Timeout {
            url: url.to_string(),
        }
    } else {
        SitemapError::RobotsFetch {
            url: url.to_string(),
            message: source.to_string(),
        }
    }
}
