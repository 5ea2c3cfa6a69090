//! Contact pattern extraction
//!
//! Emails, phone numbers and website candidates are picked out of free text
//! and anchors when no labeled block supplied them.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[a-z0-9._%+\-]+@[a-z0-9\-]+(?:\.[a-z0-9\-]+)*\.[a-z]{2,}").unwrap()
});

// Separators stop at line ends so numbers on neighbouring lines never merge
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\+?\(?\d[\d \t()\-]{4,}\d").unwrap());

/// Phone matches with fewer digits are incidental numbers (years, counts)
pub const MIN_PHONE_DIGITS: usize = 6;

/// Hosts that never count as an item's own website when anything else exists
pub const SOCIAL_DOMAINS: &[&str] = &[
    "facebook.com",
    "fb.com",
    "instagram.com",
    "linkedin.com",
    "twitter.com",
    "x.com",
    "youtube.com",
    "youtu.be",
    "t.me",
    "telegram.me",
    "tiktok.com",
    "wa.me",
    "whatsapp.com",
    "pinterest.com",
    "vk.com",
];

/// First email address in `text`
pub fn find_email(text: &str) -> Option<String> {
    EMAIL_RE
        .find(text)
        .map(|m| m.as_str().trim_end_matches('.').to_string())
}

/// First phone-like sequence in `text` carrying at least six digits
pub fn find_phone(text: &str) -> Option<String> {
    PHONE_RE
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .find(|candidate| digit_count(candidate) >= MIN_PHONE_DIGITS)
        .map(str::to_string)
}

fn digit_count(text: &str) -> usize {
    text.chars().filter(|c| c.is_ascii_digit()).count()
}

/// Email address behind a `mailto:` href, without query parameters
pub fn email_from_mailto(href: &str) -> Option<String> {
    let rest = strip_scheme(href, "mailto:")?;
    let address = rest.split('?').next().unwrap_or_default().trim();
    find_email(address)
}

/// Phone number behind a `tel:` href
pub fn phone_from_tel(href: &str) -> Option<String> {
    let rest = strip_scheme(href, "tel:")?;
    find_phone(rest.trim())
}

fn strip_scheme<'a>(href: &'a str, scheme: &str) -> Option<&'a str> {
    let href = href.trim();
    match href.get(..scheme.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(scheme) => Some(&href[scheme.len()..]),
        _ => None,
    }
}

/// True when the URL's host is (a subdomain of) a known social network
pub fn is_social(url: &str) -> bool {
    match host_of(url) {
        Some(host) => SOCIAL_DOMAINS.iter().any(|d| host_matches(&host, d)),
        None => false,
    }
}

/// Picks the item's website from absolute anchor targets
///
/// Candidates on the crawled site itself are ignored. The first candidate
/// that is not a social network wins; if only social links exist, the first
/// of those is used.
pub fn pick_website(candidates: &[String], site_host: Option<&str>) -> Option<String> {
    let external: Vec<&String> = candidates
        .iter()
        .filter(|c| match (host_of(c), site_host) {
            (Some(host), Some(site)) => !host_matches(&host, &strip_www(site)),
            (Some(_), None) => true,
            (None, _) => false,
        })
        .collect();

    external
        .iter()
        .find(|c| !is_social(c))
        .or_else(|| external.first())
        .map(|c| c.to_string())
}

fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()?
        .host_str()
        .map(|h| strip_www(&h.to_ascii_lowercase()))
}

fn strip_www(host: &str) -> String {
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain || host.ends_with(&format!(".{}", domain))
}
