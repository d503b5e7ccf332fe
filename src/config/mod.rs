//! Configuration module for sitemapper
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and resolving the crawl root from its several possible sources.
//!
//! # Example
//!
//! ```no_run
//! use sitemapper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitemapper.toml")).unwrap();
//! println!("Request timeout: {}s", config.crawler.request_timeout);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, OutputFormat, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, resolve_site_url};
pub use validation::validate;
