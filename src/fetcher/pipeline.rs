use crate::fetcher::{
    errors::FetchError,
    types::{Charset, PageResponse},
};
use encoding_rs::Encoding;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

static META_HTTP_EQUIV_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s+[^>]*?http-equiv\s*=\s*["']?content-type["']?[^>]*?content\s*=\s*["']?[^"'>]*?charset\s*=\s*([^"'\s;/>]+)"#).unwrap()
});

static XML_DECL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<\?xml\s+[^>]*?encoding\s*=\s*["']([^"']+)["']"#).unwrap()
});

/// Content types the scrapers know how to read: HTML pages and XML feeds.
pub fn is_supported_content_type(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.contains("text/html")
        || content_type.contains("application/xhtml")
        || content_type.contains("xml")
        || content_type.contains("text/plain")
}

pub fn process_response(
    url_final: Url,
    body_bytes: &[u8],
    content_type: &str,
) -> Result<PageResponse, FetchError> {
    let charset = detect_charset(content_type, body_bytes);
    let body_utf8 = decode_to_utf8(body_bytes, &charset)?;

    Ok(PageResponse {
        url_final,
        body_utf8,
        charset,
    })
}

fn charset_from_captures(regex: &Regex, haystack: &str) -> Option<Charset> {
    let captures = regex.captures(haystack)?;
    let charset_name = captures.get(1)?.as_str().to_lowercase();
    Encoding::for_label(charset_name.as_bytes()).map(Charset::from_encoding)
}

fn detect_charset(content_type: &str, body_bytes: &[u8]) -> Charset {
    // 0. A byte order mark wins over anything declared
    if let Some((encoding, _)) = Encoding::for_bom(body_bytes) {
        return Charset::from_encoding(encoding);
    }

    // 1. Content-Type header
    if let Some(charset) = charset_from_captures(&CHARSET_REGEX, content_type) {
        return charset;
    }

    // 2. In-document declarations within the first 4KB
    let search_bytes = &body_bytes[..body_bytes.len().min(4096)];
    let search_str = String::from_utf8_lossy(search_bytes);

    for regex in [&*XML_DECL_REGEX, &*META_CHARSET_REGEX, &*META_HTTP_EQUIV_REGEX] {
        if let Some(charset) = charset_from_captures(regex, &search_str) {
            return charset;
        }
    }

    // 3. Heuristic detection
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(search_bytes, false);
    Charset::from_encoding(detector.guess(None, true))
}

fn decode_to_utf8(body_bytes: &[u8], charset: &Charset) -> Result<String, FetchError> {
    let encoding = charset.encoding();
    let (decoded, _encoding, had_errors) = encoding.decode(body_bytes);

    if had_errors {
        return Err(FetchError::Charset(format!(
            "Failed to decode content with encoding: {}",
            encoding.name()
        )));
    }

    Ok(decoded.into_owned())
}
