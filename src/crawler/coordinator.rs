//! Crawler coordinator - wires the crawl together
//!
//! This module builds every component from the configuration, runs the
//! crawl and writes the resulting artifacts:
//! - The shared HTTP client
//! - robots.txt policy and page fetcher
//! - The JSON sitemap and the optional markdown summary

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, PageFetcher};
use crate::crawler::scheduler::{CrawlReport, CrawlScheduler};
use crate::output::{generate_markdown_summary, JsonSitemapWriter, SitemapWriter};
use crate::robots::RobotsPolicy;
use crate::Result;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use url::Url;

/// What a completed run produced
#[derive(Debug)]
pub struct CrawlOutcome {
    pub report: CrawlReport,

    /// Where the JSON sitemap was written
    pub sitemap_path: PathBuf,

    /// Where the markdown summary was written, if enabled
    pub summary_path: Option<PathBuf>,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    site: Url,
    scheduler: CrawlScheduler,
    writer: JsonSitemapWriter,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `site` - The crawl seed
    /// * `cancel` - Token that stops the crawl early when cancelled
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(SitemapError)` - The HTTP client could not be built
    pub fn new(config: Config, site: Url, cancel: CancellationToken) -> Result<Self> {
        let client = build_http_client(&config.user_agent, &config.crawler)?;

        let robots = RobotsPolicy::new(
            client.clone(),
            config.output.robots_directory.clone(),
            config.crawler.robots_max_age(),
        );
        let fetcher = PageFetcher::new(client);
        let scheduler = CrawlScheduler::new(robots, fetcher, cancel);

        let writer = JsonSitemapWriter::new(config.output.directory.clone(), config.output.format);

        Ok(Self {
            config,
            site,
            scheduler,
            writer,
        })
    }

    /// Runs the crawl and writes its output
    ///
    /// The sitemap is written for every stop reason, so a cancelled or
    /// aborted crawl still leaves the records gathered so far on disk.
    pub async fn run(&self) -> Result<CrawlOutcome> {
        let report = self.scheduler.run(&self.site).await?;

        let sitemap_path = self.writer.write(&self.site, &report.records)?;
        tracing::info!("Sitemap written to {}", sitemap_path.display());

        let summary_path = if self.config.output.summary {
            let path = generate_markdown_summary(&self.site, &report, &self.config.output.directory)?;
            tracing::info!("Summary written to {}", path.display());
            Some(path)
        } else {
            None
        };

        Ok(CrawlOutcome {
            report,
            sitemap_path,
            summary_path,
        })
    }
}

/// Crawls `site` with the given configuration and writes the sitemap
///
/// # Example
///
/// ```no_run
/// use sitemapper::config::Config;
/// use sitemapper::crawler::run_crawl;
/// use tokio_util::sync::CancellationToken;
/// use url::Url;
///
/// # async fn demo() -> sitemapper::Result<()> {
/// let site = Url::parse("http://example.test/").unwrap();
/// let outcome = run_crawl(Config::default(), site, CancellationToken::new()).await?;
/// println!("Sitemap: {}", outcome.sitemap_path.display());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, site: Url, cancel: CancellationToken) -> Result<CrawlOutcome> {
    Coordinator::new(config, site, cancel)?.run().await
}
