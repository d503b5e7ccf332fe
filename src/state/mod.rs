//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: the phase the crawl loop is in (idle, delaying, fetching,
//!   merging, done) and the transitions allowed between phases

mod crawl_state;

// Re-export main types
pub use crawl_state::CrawlState;
