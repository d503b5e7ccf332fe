use crate::{UrlError, UrlResult};
use url::Url;

/// Normalizes a URL string for use as a page location and frontier key
///
/// The whole string is lower-cased and terminated with a trailing slash.
/// Applying it twice yields the same result as applying it once.
///
/// # Examples
///
/// ```
/// use sitemapper::url::normalize;
///
/// assert_eq!(normalize("http://Example.TEST/About"), "http://example.test/about/");
/// assert_eq!(normalize("http://example.test/"), "http://example.test/");
/// ```
pub fn normalize(url: &str) -> String {
    let mut normalized = url.to_lowercase();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

/// Returns the page URL without its query string and fragment
pub fn strip_query_and_fragment(url: &Url) -> Url {
    let mut page = url.clone();
    page.set_query(None);
    page.set_fragment(None);
    page
}

/// Parses a string as an absolute HTTP(S) URL with a host
///
/// # Arguments
///
/// * `url_str` - The URL string to validate
///
/// # Returns
///
/// * `Ok(Url)` - A well-formed absolute URL
/// * `Err(UrlError)` - The string is not an absolute http/https URL with a host
pub fn parse_absolute(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingHost),
    }
}
