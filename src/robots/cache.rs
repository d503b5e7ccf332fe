//! Robots.txt on-disk cache
//!
//! Each site's robots.txt is persisted as raw text in a file named by host,
//! and is considered fresh for a configurable window (one hour by default)
//! measured from the file's modification time.

use crate::url::robots_file_name;
use crate::{Result, UrlError};
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Persisted robots.txt copies for the sites being crawled
#[derive(Debug, Clone)]
pub struct RobotsCache {
    /// Directory the copies are stored in
    directory: PathBuf,

    /// Age after which a copy must be downloaded again
    max_age: Duration,
}

impl RobotsCache {
    pub fn new(directory: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            directory: directory.into(),
            max_age,
        }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Returns the path of the persisted copy for a site
    pub fn path_for(&self, site: &Url) -> Result<PathBuf> {
        let name = robots_file_name(site).ok_or(UrlError::MissingHost)?;
        Ok(self.directory.join(name))
    }

    /// Returns when the persisted copy was last written, if there is one
    pub fn modified_at(&self, site: &Url) -> Result<Option<DateTime<Utc>>> {
        let path = self.path_for(site)?;
        match std::fs::metadata(&path) {
            Ok(metadata) => Ok(Some(DateTime::<Utc>::from(metadata.modified()?))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Checks whether the copy is missing or older than the freshness window
    ///
    /// # Arguments
    ///
    /// * `site` - Any URL on the site
    /// * `now` - The reference time for the age computation
    pub fn is_stale_at(&self, site: &Url, now: DateTime<Utc>) -> Result<bool> {
        let Some(modified) = self.modified_at(site)? else {
            return Ok(true);
        };

        Ok(match (now - modified).to_std() {
            Ok(age) => age > self.max_age,
            // Modification time in the future: keep the copy
            Err(_) => false,
        })
    }

    pub fn is_stale(&self, site: &Url) -> Result<bool> {
        self.is_stale_at(site, Utc::now())
    }

    /// Reads the persisted copy; `None` when no copy exists
    pub fn read(&self, site: &Url) -> Result<Option<String>> {
        let path = self.path_for(site)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persists raw robots.txt content for a site
    pub fn write(&self, site: &Url, content: &str) -> Result<()> {
        std::fs::create_dir_all(&self.directory)?;
        std::fs::write(self.path_for(site)?, content)?;
        Ok(())
    }

    /// Removes the persisted copy; a missing copy is not an error
    pub fn remove(&self, site: &Url) -> Result<()> {
        match std::fs::remove_file(self.path_for(site)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
