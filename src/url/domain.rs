use url::Url;

/// Checks whether two URLs belong to the same site
///
/// Two URLs share a site when their hosts match case-insensitively and they
/// spell out the same port, if any. The scheme is not compared, so
/// `http://example.test/` and `https://example.test/` are the same site.
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (site_key(a), site_key(b)) {
        (Some(key_a), Some(key_b)) => key_a == key_b,
        _ => false,
    }
}

/// Returns the `host` or `host:port` key identifying the site of a URL
///
/// The port is included only when the URL spells out a non-default one.
pub fn site_key(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Builds the robots.txt URL for the site a URL belongs to
///
/// # Examples
///
/// ```
/// use sitemapper::url::robots_url;
/// use url::Url;
///
/// let site = Url::parse("http://example.test/some/page").unwrap();
/// assert_eq!(robots_url(&site).unwrap(), "http://example.test/robots.txt");
/// ```
pub fn robots_url(url: &Url) -> Option<String> {
    let key = site_key(url)?;
    Some(format!("{}://{}/robots.txt", url.scheme(), key))
}

/// Returns the file name under which a site's robots.txt is persisted
///
/// This is the host, with `_{port}` appended for explicit ports so the name
/// stays valid on every filesystem.
pub fn robots_file_name(url: &Url) -> Option<String> {
    site_key(url).map(|key| key.replace(':', "_"))
}
