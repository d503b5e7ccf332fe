use crate::config::types::Config;
use crate::config::validation::{validate, validate_site_url};
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;
use url::Url;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sitemapper::config::load_config;
///
/// let config = load_config(Path::new("sitemapper.toml")).unwrap();
/// println!("Site: {:?}", config.crawler.site_url);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let config: Config = toml::from_str(&content)?;

    validate(&config)?;

    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Resolves the crawl root
///
/// An explicit override (command line or `SITE_URL`) wins over the value
/// from the configuration file. The chosen value is stored back into the
/// configuration so later consumers see the effective seed.
///
/// # Returns
///
/// * `Ok(Url)` - The validated absolute seed URL
/// * `Err(ConfigError::MissingSiteUrl)` - No source supplied a site URL
/// * `Err(ConfigError::InvalidUrl)` - The supplied value is not a valid seed
pub fn resolve_site_url(
    config: &mut Config,
    override_url: Option<String>,
) -> Result<Url, ConfigError> {
    if let Some(url) = override_url.filter(|u| !u.trim().is_empty()) {
        config.crawler.site_url = Some(url.trim().to_string());
    }

    let site = config
        .crawler
        .site_url
        .as_deref()
        .ok_or(ConfigError::MissingSiteUrl)?;

    validate_site_url(site)
}
