//! Sitemap writer trait and output errors

use crate::output::PageRecord;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize sitemap: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot derive an output file name from {0}")]
    FileName(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for sitemap writers
///
/// A writer turns the accumulated page records of one crawl into a durable
/// artifact and reports where it was written.
pub trait SitemapWriter {
    /// Writes the sitemap for `site`
    ///
    /// # Arguments
    ///
    /// * `site` - The crawl root
    /// * `records` - Page records in crawl order
    ///
    /// # Returns
    ///
    /// The path of the written artifact
    fn write(&self, site: &Url, records: &[PageRecord]) -> OutputResult<PathBuf>;
}
