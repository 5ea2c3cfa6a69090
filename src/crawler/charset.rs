//! Response body decoding
//!
//! Resolution order for the character encoding:
//!
//! 1. Byte order mark
//! 2. `charset` parameter of the `Content-Type` header
//! 3. `<meta charset>` or `http-equiv` declaration near the top of the body
//! 4. Statistical guess (`chardetng`)

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::bytes::Regex;

/// How much of the body is scanned for a meta declaration
const META_SNIFF_BYTES: usize = 2048;

static META_CHARSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?\s*([a-z0-9_\-:.]+)"#).unwrap()
});

/// Decodes a response body to text
///
/// Returns the text and the name of the encoding that was used. Malformed
/// sequences are replaced rather than rejected.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> (String, &'static str) {
    let encoding = detect_encoding(bytes, content_type);
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!("Body contained sequences invalid in {}", used.name());
    }
    (text.into_owned(), used.name())
}

/// Picks the encoding for `bytes`, see the module docs for the order
pub fn detect_encoding(bytes: &[u8], content_type: Option<&str>) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }

    if let Some(encoding) = content_type.and_then(charset_from_content_type) {
        return encoding;
    }

    if let Some(encoding) = charset_from_meta(bytes) {
        return encoding;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

/// Encoding named by the `charset` parameter of a Content-Type value
pub fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
        .and_then(|(_, value)| {
            let label = value.trim().trim_matches(|c| c == '"' || c == '\'');
            Encoding::for_label(label.as_bytes())
        })
}

fn charset_from_meta(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(META_SNIFF_BYTES)];
    let captures = META_CHARSET_RE.captures(head)?;
    let label = captures.get(1)?.as_bytes();
    let encoding = Encoding::for_label(label)?;

    // A page that reached us as bytes cannot really be UTF-16
    if encoding == encoding_rs::UTF_16LE || encoding == encoding_rs::UTF_16BE {
        Some(UTF_8)
    } else {
        Some(encoding)
    }
}
