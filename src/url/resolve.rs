use percent_encoding::percent_decode_str;
use url::Url;

/// Resolves a link href to an absolute URL and validates it
///
/// The fragment is dropped, so `/s/a` and `/s/a#team` resolve to the same URL.
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only hrefs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
///
/// # Examples
///
/// ```
/// use listing_harvester::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://site.tld").unwrap();
/// assert_eq!(resolve_link("/x", &base), Some("https://site.tld/x".to_string()));
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(mut absolute_url) => {
            absolute_url.set_fragment(None);
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

/// True for hrefs that are already absolute http(s) URLs
pub fn is_http_url(href: &str) -> bool {
    match Url::parse(href.trim()) {
        Ok(url) => (url.scheme() == "http" || url.scheme() == "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

/// Last non-empty path segment of a URL, percent-decoded
///
/// `https://site.tld/startup-content/acme-labs/` yields `acme-labs`.
pub fn slug_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segment = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .last()?
        .to_string();

    let decoded = percent_decode_str(&segment).decode_utf8_lossy();
    let trimmed = decoded.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
