//! Markdown summary generation
//!
//! Writes a human-readable `{host}.md` next to the sitemap with the crawl's
//! statistics and a per-page overview.

use crate::crawler::CrawlReport;
use crate::output::json::sitemap_path;
use crate::output::traits::OutputResult;
use std::path::{Path, PathBuf};
use url::Url;

/// Writes the markdown summary for a crawl into `directory`
///
/// # Returns
///
/// * `Ok(PathBuf)` - Where the summary was written
/// * `Err(OutputError)` - Failed to write the summary
pub fn generate_markdown_summary(
    site: &Url,
    report: &CrawlReport,
    directory: &Path,
) -> OutputResult<PathBuf> {
    let markdown = format_markdown_summary(site, report);

    std::fs::create_dir_all(directory)?;
    let path = sitemap_path(directory, site, "md")?;
    std::fs::write(&path, markdown)?;

    Ok(path)
}

/// Formats a crawl report as markdown
pub fn format_markdown_summary(site: &Url, report: &CrawlReport) -> String {
    let stats = &report.statistics;
    let mut md = String::new();

    md.push_str(&format!("# Sitemap for {}\n\n", site));

    md.push_str("## Run Information\n\n");
    if let Some(started) = stats.started_at {
        md.push_str(&format!("- **Started**: {}\n", started.to_rfc3339()));
    }
    if let Some(finished) = stats.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
    }
    if let Some(duration) = stats.duration() {
        md.push_str(&format!(
            "- **Duration**: {:.1} seconds\n",
            duration.num_milliseconds() as f64 / 1000.0
        ));
    }
    md.push_str(&format!("- **Stopped because**: {}\n\n", report.stop_reason));

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Fetched**: {}\n", stats.pages_fetched));
    md.push_str(&format!("- **Pages Failed**: {}\n", stats.pages_failed));
    md.push_str(&format!(
        "- **Skipped by robots.txt**: {}\n",
        stats.pages_skipped
    ));
    md.push_str(&format!("- **URLs Discovered**: {}\n", stats.urls_discovered));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        stats.success_rate()
    ));

    if !report.records.is_empty() {
        md.push_str("## Pages\n\n");
        md.push_str("| Location | Links | Stylesheets | Scripts | Images |\n");
        md.push_str("|----------|-------|-------------|---------|--------|\n");
        for record in &report.records {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                record.location(),
                record.links().len(),
                record.stylesheets().len(),
                record.scripts().len(),
                record.images().len()
            ));
        }
        md.push('\n');
    }

    md
}
