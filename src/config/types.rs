use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for sitemapper
///
/// Every section has defaults, so an empty file (or no file at all) yields a
/// usable configuration once a site URL is supplied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// The crawl root; must be an absolute http(s) URL with a host
    #[serde(default, rename = "site-url")]
    pub site_url: Option<String>,

    /// Upper bound for a whole request, in seconds
    #[serde(default = "default_request_timeout", rename = "request-timeout")]
    pub request_timeout: u64,

    /// Upper bound for establishing a connection, in seconds
    #[serde(default = "default_connect_timeout", rename = "connect-timeout")]
    pub connect_timeout: u64,

    /// Age after which a persisted robots.txt is downloaded again, in seconds
    #[serde(default = "default_robots_max_age", rename = "robots-max-age")]
    pub robots_max_age: u64,
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    pub fn robots_max_age(&self) -> Duration {
        Duration::from_secs(self.robots_max_age)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            site_url: None,
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            robots_max_age: default_robots_max_age(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(default = "default_crawler_name", rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(default = "default_crawler_version", rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(default, rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `Name/Version` or `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
        }
    }
}

/// Layout of the sitemap JSON document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Array of page records in crawl order
    #[default]
    Array,
    /// Object keyed by page location
    Map,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the `{host}.json` sitemap is written to
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Directory persisted robots.txt copies live in
    #[serde(default = "default_directory", rename = "robots-directory")]
    pub robots_directory: PathBuf,

    #[serde(default)]
    pub format: OutputFormat,

    /// Also write a `{host}.md` crawl summary
    #[serde(default)]
    pub summary: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            robots_directory: default_directory(),
            format: OutputFormat::default(),
            summary: false,
        }
    }
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_robots_max_age() -> u64 {
    3600
}

fn default_crawler_name() -> String {
    "sitemapper".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}
