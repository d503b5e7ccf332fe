//! Output module for writing crawl results
//!
//! This module handles:
//! - The page record data model shared by the crawler and the writers
//! - Writing the JSON sitemap artifact
//! - Optional markdown summaries and crawl statistics

mod json;
mod markdown;
mod record;
pub mod stats;
mod traits;

pub use json::{render_json, JsonSitemapWriter};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use record::PageRecord;
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{OutputError, OutputResult, SitemapWriter};
