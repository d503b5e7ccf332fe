//! JSON sitemap output
//!
//! Writes `{host}.json` as a pretty-printed (2-space indent) JSON document,
//! either an array of page records or an object keyed by page location.

use crate::config::OutputFormat;
use crate::output::traits::{OutputError, OutputResult, SitemapWriter};
use crate::output::PageRecord;
use crate::url::robots_file_name;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use url::Url;

/// Writes sitemaps as JSON files into a directory
#[derive(Debug, Clone)]
pub struct JsonSitemapWriter {
    directory: PathBuf,
    format: OutputFormat,
}

impl JsonSitemapWriter {
    pub fn new(directory: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            directory: directory.into(),
            format,
        }
    }

    /// Returns the path the sitemap for `site` is written to
    pub fn path_for(&self, site: &Url) -> OutputResult<PathBuf> {
        sitemap_path(&self.directory, site, "json")
    }
}

impl SitemapWriter for JsonSitemapWriter {
    fn write(&self, site: &Url, records: &[PageRecord]) -> OutputResult<PathBuf> {
        let json = render_json(records, self.format)?;

        std::fs::create_dir_all(&self.directory)?;
        let path = self.path_for(site)?;
        std::fs::write(&path, json)?;

        tracing::debug!("Wrote {} page records to {}", records.len(), path.display());
        Ok(path)
    }
}

/// Serializes page records in the requested layout
///
/// In map layout the object keys are sorted; a location recorded twice keeps
/// the later record.
pub fn render_json(records: &[PageRecord], format: OutputFormat) -> OutputResult<String> {
    let mut json = match format {
        OutputFormat::Array => serde_json::to_string_pretty(records)?,
        OutputFormat::Map => {
            let by_location: BTreeMap<&str, &PageRecord> = records
                .iter()
                .map(|record| (record.location(), record))
                .collect();
            serde_json::to_string_pretty(&by_location)?
        }
    };
    json.push('\n');
    Ok(json)
}

/// Builds `{directory}/{host}.{extension}` for a site
pub(crate) fn sitemap_path(directory: &Path, site: &Url, extension: &str) -> OutputResult<PathBuf> {
    let stem =
        robots_file_name(site).ok_or_else(|| OutputError::FileName(site.to_string()))?;
    Ok(directory.join(format!("{}.{}", stem, extension)))
}
