use crate::url::remove_duplicates;
use serde::{Deserialize, Serialize};

/// The per-page result of one fetch-and-extract cycle
///
/// Created once per fetched page, whether the fetch succeeded or not, and
/// never modified afterwards. Every URL set is de-duplicated in first-seen
/// order and serializes as an array, empty rather than null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    #[serde(rename = "Location")]
    location: String,

    #[serde(rename = "Urls", default)]
    links: Vec<String>,

    #[serde(rename = "Stylesheets", default)]
    stylesheets: Vec<String>,

    #[serde(rename = "Scripts", default)]
    scripts: Vec<String>,

    #[serde(rename = "Images", default)]
    images: Vec<String>,
}

impl PageRecord {
    pub fn new(
        location: impl Into<String>,
        links: Vec<String>,
        stylesheets: Vec<String>,
        scripts: Vec<String>,
        images: Vec<String>,
    ) -> Self {
        Self {
            location: location.into(),
            links: remove_duplicates(links),
            stylesheets: remove_duplicates(stylesheets),
            scripts: remove_duplicates(scripts),
            images: remove_duplicates(images),
        }
    }

    /// A record for a page that could not be fetched or parsed
    pub fn empty(location: impl Into<String>) -> Self {
        Self::new(location, Vec::new(), Vec::new(), Vec::new(), Vec::new())
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Same-host page links, normalized
    pub fn links(&self) -> &[String] {
        &self.links
    }

    pub fn stylesheets(&self) -> &[String] {
        &self.stylesheets
    }

    pub fn scripts(&self) -> &[String] {
        &self.scripts
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    /// Returns true if no links or assets were recorded
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
            && self.stylesheets.is_empty()
            && self.scripts.is_empty()
            && self.images.is_empty()
    }

    /// Total number of asset references (stylesheets, scripts and images)
    pub fn asset_count(&self) -> usize {
        self.stylesheets.len() + self.scripts.len() + self.images.len()
    }
}
