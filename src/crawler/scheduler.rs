//! Crawl loop and politeness enforcement
//!
//! This module handles:
//! - Draining the frontier one URL at a time
//! - Consulting robots.txt before every fetch
//! - Waiting out the crawl delay between fetch starts
//! - Feeding discovered links back into the frontier
//! - Stopping on exhaustion, cancellation or robots exclusion

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::frontier::{EmptyFrontier, Frontier};
use crate::output::{CrawlStatistics, PageRecord};
use crate::robots::{RobotsPolicy, RobotsRuleSet};
use crate::state::CrawlState;
use crate::url::{normalize, parse_absolute, strip_query_and_fragment};
use crate::{Result, SitemapError};
use chrono::Utc;
use std::fmt;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Why a crawl ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Every reachable URL was visited
    FrontierExhausted,

    /// The cancellation token fired
    Cancelled,

    /// robots.txt has no group for the `*` user agent
    RobotsExcluded,

    /// A fatal error interrupted a crawl already under way
    Aborted { message: String },
}

impl StopReason {
    /// Returns true if the process should report failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrontierExhausted => write!(f, "frontier exhausted"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::RobotsExcluded => write!(f, "robots.txt excludes all user agents"),
            Self::Aborted { message } => write!(f, "aborted: {}", message),
        }
    }
}

/// Everything a finished crawl produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// One record per fetched page, in fetch order
    pub records: Vec<PageRecord>,
    pub stop_reason: StopReason,
    pub statistics: CrawlStatistics,
}

/// Drives a single-site crawl
///
/// The scheduler owns no crawl state between runs; every call to
/// [`CrawlScheduler::run`] starts with an empty frontier and result set.
pub struct CrawlScheduler {
    robots: RobotsPolicy,
    fetcher: PageFetcher,
    cancel: CancellationToken,
}

/// Mutable state of one run
struct CrawlRun {
    frontier: Frontier,
    records: Vec<PageRecord>,
    rules: RobotsRuleSet,
    state: CrawlState,
    last_fetch_started: Option<Instant>,
    statistics: CrawlStatistics,
}

impl CrawlRun {
    fn new(rules: RobotsRuleSet) -> Self {
        Self {
            frontier: Frontier::new(),
            records: Vec::new(),
            rules,
            state: CrawlState::Idle,
            last_fetch_started: None,
            statistics: CrawlStatistics {
                started_at: Some(Utc::now()),
                ..Default::default()
            },
        }
    }

    fn transition(&mut self, next: CrawlState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(SitemapError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::trace!("Crawl state {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    fn finish(mut self, stop_reason: StopReason) -> CrawlReport {
        self.statistics.finished_at = Some(Utc::now());
        self.statistics.urls_discovered = self.frontier.seen_count() as u64;
        self.statistics.links_found = self.records.iter().map(|r| r.links().len() as u64).sum();
        self.statistics.assets_found = self.records.iter().map(|r| r.asset_count() as u64).sum();

        CrawlReport {
            records: self.records,
            stop_reason,
            statistics: self.statistics,
        }
    }
}

impl CrawlScheduler {
    pub fn new(robots: RobotsPolicy, fetcher: PageFetcher, cancel: CancellationToken) -> Self {
        Self {
            robots,
            fetcher,
            cancel,
        }
    }

    /// Crawls every reachable same-host page starting from `seed`
    ///
    /// Fetch failures never end the crawl. Records gathered before a stop are
    /// always part of the report, whatever the stop reason.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The crawl ran and stopped for the reported reason
    /// * `Err(SitemapError)` - The seed is invalid or the site's robots.txt
    ///   copy could not be read before crawling started
    pub async fn run(&self, seed: &Url) -> Result<CrawlReport> {
        let site = parse_absolute(&normalize(strip_query_and_fragment(seed).as_str()))?;
        let rules = self.robots.load(&site).await?;

        let mut run = CrawlRun::new(rules);
        run.frontier.enqueue(site.as_str());

        tracing::info!("Starting crawl of {}", site);
        let stop_reason = self.drive(&mut run, &site).await?;
        tracing::info!(
            "Crawl of {} stopped ({}): {} pages recorded",
            site,
            stop_reason,
            run.records.len()
        );

        Ok(run.finish(stop_reason))
    }

    async fn drive(&self, run: &mut CrawlRun, site: &Url) -> Result<StopReason> {
        let max_age = self.robots.cache().max_age();

        loop {
            if self.cancel.is_cancelled() {
                tracing::info!("Crawl cancelled, {} URLs left unvisited", run.frontier.len());
                run.transition(CrawlState::Done)?;
                return Ok(StopReason::Cancelled);
            }

            if run.rules.is_stale(max_age) {
                tracing::debug!("robots.txt rules for {} are stale, reloading", site);
                match self.robots.load(site).await {
                    Ok(rules) => run.rules = rules,
                    Err(e) => {
                        tracing::error!("Failed to reload robots.txt for {}: {}", site, e);
                        run.transition(CrawlState::Done)?;
                        return Ok(StopReason::Aborted {
                            message: e.to_string(),
                        });
                    }
                }
            }

            if !run.rules.user_agent_matched {
                tracing::warn!("robots.txt for {} has no group for all user agents", site);
                run.transition(CrawlState::Done)?;
                return Ok(StopReason::RobotsExcluded);
            }

            let url = match run.frontier.dequeue() {
                Ok(url) => url,
                Err(EmptyFrontier) => {
                    run.transition(CrawlState::Done)?;
                    return Ok(StopReason::FrontierExhausted);
                }
            };

            tracing::debug!(
                "Visiting {} ({} queued, {} recorded)",
                url,
                run.frontier.len(),
                run.records.len()
            );

            if !run.rules.is_allowed(url.path()) {
                tracing::info!("Skipping {}: disallowed by robots.txt", url);
                run.statistics.pages_skipped += 1;
                continue;
            }

            run.transition(CrawlState::Delaying)?;
            let wait = remaining_delay(
                run.last_fetch_started,
                Instant::now(),
                run.rules.crawl_delay(),
            );
            if !wait.is_zero() {
                tracing::debug!("Waiting {:?} before fetching {}", wait, url);
                tokio::select! {
                    _ = self.cancel.cancelled() => {
                        tracing::info!("Crawl cancelled while waiting to fetch {}", url);
                        run.transition(CrawlState::Done)?;
                        return Ok(StopReason::Cancelled);
                    }
                    _ = tokio::time::sleep(wait) => {}
                }
            }

            run.transition(CrawlState::Fetching)?;
            run.last_fetch_started = Some(Instant::now());
            let fetched = self.fetcher.fetch(&url).await;
            if fetched.is_failed() {
                run.statistics.pages_failed += 1;
            }
            run.statistics.pages_fetched += 1;
            let record = fetched.into_record();

            run.transition(CrawlState::Merging)?;
            let added = record
                .links()
                .iter()
                .filter(|link| run.frontier.enqueue(link))
                .count();
            tracing::trace!("{} new URLs from {}", added, url);
            run.records.push(record);

            if run.statistics.pages_fetched % 10 == 0 {
                tracing::info!(
                    "Progress: {} pages fetched, {} in frontier",
                    run.statistics.pages_fetched,
                    run.frontier.len()
                );
            }

            run.transition(CrawlState::Idle)?;
        }
    }
}

/// Time still to wait before the next fetch may start
///
/// The delay is measured between fetch starts, so time spent fetching counts
/// towards it.
pub fn remaining_delay(last_start: Option<Instant>, now: Instant, delay: Duration) -> Duration {
    match last_start {
        Some(last) => delay.saturating_sub(now.saturating_duration_since(last)),
        None => Duration::ZERO,
    }
}
