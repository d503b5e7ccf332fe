//! HTML parser for extracting links and asset references
//!
//! This module handles parsing HTML content to extract:
//! - Same-host page links to follow (from `<a href>` tags)
//! - Stylesheets (`<link rel="stylesheet" href>`)
//! - Scripts and images (`<script src>`, `<img src>`)

use crate::url::{normalize, remove_duplicates, same_host, strip_query_and_fragment};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Links and asset references extracted from one HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPage {
    /// Normalized same-host page links, first-seen order
    pub links: Vec<String>,

    /// Stylesheet hrefs as written in the page
    pub stylesheets: Vec<String>,

    /// Script sources, protocol-relative ones rewritten to `http://`
    pub scripts: Vec<String>,

    /// Image sources, protocol-relative ones rewritten to `http://`
    pub images: Vec<String>,
}

/// Parses HTML content and extracts links and asset references
///
/// # Link Extraction Rules
///
/// - `<a href>` targets are resolved against the page's base URL (a
///   `<base href>` element if present, otherwise `page_url`)
/// - Only http and https targets on the same host and port as `page_url`
///   are kept
/// - Query strings and fragments are stripped, then the URL is normalized
///
/// # Asset Extraction Rules
///
/// - Values are kept as written, except that a leading `//` becomes
///   `http://`
/// - Empty values are dropped
///
/// Every list is de-duplicated preserving first-seen order.
///
/// # Example
///
/// ```
/// use sitemapper::crawler::extract_page;
/// use url::Url;
///
/// let html = r#"<a href="/about">About</a><img src="//cdn.test/logo.png">"#;
/// let page = Url::parse("http://example.test/").unwrap();
/// let extracted = extract_page(html, &page);
/// assert_eq!(extracted.links, vec!["http://example.test/about/"]);
/// assert_eq!(extracted.images, vec!["http://cdn.test/logo.png"]);
/// ```
pub fn extract_page(html: &str, page_url: &Url) -> ExtractedPage {
    let document = Html::parse_document(html);
    let base_url = document_base(&document, page_url);

    ExtractedPage {
        links: extract_links(&document, &base_url, page_url),
        stylesheets: extract_stylesheets(&document),
        scripts: extract_sources(&document, "script[src]"),
        images: extract_sources(&document, "img[src]"),
    }
}

/// Returns the URL relative links resolve against
fn document_base(document: &Html, page_url: &Url) -> Url {
    let Ok(selector) = Selector::parse("base[href]") else {
        return page_url.clone();
    };

    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| page_url.join(href.trim()).ok())
        .unwrap_or_else(|| page_url.clone())
}

/// Extracts same-host page links from the HTML document
fn extract_links(document: &Html, base_url: &Url, page_url: &Url) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let links = document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .filter(|url| same_host(url, page_url))
        .map(|url| normalize(url.as_str()));

    remove_duplicates(links)
}

/// Resolves a link href to an absolute URL without query or fragment
///
/// Returns None if the link should be excluded:
/// - empty or fragment-only hrefs
/// - hrefs that fail to resolve
/// - non-HTTP(S) URLs after resolution (javascript:, mailto:, tel:, data:)
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }

    Some(strip_query_and_fragment(&absolute_url))
}

/// Extracts hrefs of `<link>` elements whose rel contains `stylesheet`
fn extract_stylesheets(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("link[rel][href]") else {
        return Vec::new();
    };

    let hrefs = document
        .select(&selector)
        .filter(|element| is_stylesheet(element))
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.trim().to_string());

    remove_duplicates(hrefs)
}

fn is_stylesheet(element: &ElementRef<'_>) -> bool {
    element
        .value()
        .attr("rel")
        .map(|rel| {
            rel.split_ascii_whitespace()
                .any(|token| token.eq_ignore_ascii_case("stylesheet"))
        })
        .unwrap_or(false)
}

/// Extracts `src` values for the given selector
fn extract_sources(document: &Html, selector: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    let sources = document
        .select(&selector)
        .filter_map(|element| element.value().attr("src"))
        .map(|src| rewrite_protocol_relative(src.trim()));

    remove_duplicates(sources)
}

/// Rewrites a leading `//` to `http://`
fn rewrite_protocol_relative(value: &str) -> String {
    match value.strip_prefix("//") {
        Some(rest) => format!("http://{}", rest),
        None => value.to_string(),
    }
}
