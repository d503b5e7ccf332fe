//! Crawler module
//!
//! This module handles:
//! - HTTP fetching and link/asset extraction
//! - The frontier of URLs still to visit
//! - The polite crawl loop
//! - Coordinating a complete run

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator, CrawlOutcome};
pub use fetcher::{build_http_client, FetchedHtml, PageFetch, PageFetcher};
pub use frontier::{EmptyFrontier, Frontier};
pub use parser::{extract_page, ExtractedPage};
pub use scheduler::{remaining_delay, CrawlReport, CrawlScheduler, StopReason};
