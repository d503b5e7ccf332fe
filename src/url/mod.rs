//! URL handling module
//!
//! This module provides URL normalization, validation, same-host checks and
//! the ordered de-duplication used for every extracted URL set.

mod dedup;
mod domain;
mod normalize;

// Re-export main functions
pub use dedup::remove_duplicates;
pub use domain::{robots_file_name, robots_url, same_host, site_key};
pub use normalize::{normalize, parse_absolute, strip_query_and_fragment};
