//! Crawl statistics
//!
//! Counters collected by the crawl loop and a plain-text report for them.

use chrono::{DateTime, Utc};

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Pages fetched, successfully or not (one record each)
    pub pages_fetched: u64,

    /// Pages whose fetch failed and produced an empty record
    pub pages_failed: u64,

    /// URLs skipped because robots.txt disallows them
    pub pages_skipped: u64,

    /// Distinct URLs that entered the frontier, seed included
    pub urls_discovered: u64,

    /// Same-host links across all records
    pub links_found: u64,

    /// Stylesheet, script and image references across all records
    pub assets_found: u64,

    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl CrawlStatistics {
    /// Wall-clock duration of the crawl, once finished
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Share of fetched pages that did not fail, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.pages_fetched == 0 {
            return 0.0;
        }
        let succeeded = self.pages_fetched.saturating_sub(self.pages_failed);
        (succeeded as f64 / self.pages_fetched as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages fetched: {}", stats.pages_fetched);
    println!("  Pages failed: {}", stats.pages_failed);
    println!("  Skipped by robots.txt: {}", stats.pages_skipped);
    println!("  URLs discovered: {}", stats.urls_discovered);
    println!("  Links recorded: {}", stats.links_found);
    println!("  Assets recorded: {}", stats.assets_found);

    if let Some(duration) = stats.duration() {
        println!(
            "  Duration: {:.1}s",
            duration.num_milliseconds() as f64 / 1000.0
        );
    }
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched without error)",
        stats.success_rate(),
        stats.pages_fetched.saturating_sub(stats.pages_failed),
        stats.pages_fetched
    );
}
