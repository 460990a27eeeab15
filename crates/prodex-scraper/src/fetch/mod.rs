//! Raw content acquisition.
//!
//! Two strategies behind one surface: a plain HTTP GET (with optional proxy
//! and a bounded transient-error retry), and a headless-browser render for
//! client-side-rendered product pages. Bot-protection responses are detected
//! here and surfaced as [`ScrapeError::Blocked`] so extractors can degrade
//! instead of failing.

mod browser;
mod http;
mod retry;

pub use browser::{BrowserConfig, BrowserFetcher};
pub use http::{FetchClient, FetchConfig, FetchedPage, RedirectStep};

/// Body substrings that identify a bot-protection interstitial rather than a
/// product page. Checked on every HTTP response body alongside 403/429.
const BLOCK_MARKERS: &[&str] = &[
    "captcha-delivery.com",
    "px-captcha",
    "_Incapsula_Resource",
    "cf-browser-verification",
    "geo.captcha",
    "Request unsuccessful. Incapsula",
    "datadome",
    "Access Denied</title>",
    "automated access to Amazon data",
];

/// Returns the matched block signature, if the status/body pair looks like a
/// bot-protection wall.
pub(crate) fn detect_block(status: u16, body: &str) -> Option<String> {
    match status {
        403 => return Some("http 403".to_owned()),
        429 => return Some("http 429".to_owned()),
        _ => {}
    }
    BLOCK_MARKERS
        .iter()
        .find(|marker| body.contains(*marker))
        .map(|marker| (*marker).to_owned())
}

/// Extracts the `scheme://host` origin from a URL, for absolutizing
/// root-relative asset paths.
pub(crate) fn extract_origin(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    // `origin()` serializes opaque origins as "null"; reject those.
    match parsed.origin() {
        o if o.is_tuple() => Some(o.ascii_serialization()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_403_is_a_block() {
        assert_eq!(detect_block(403, "<html></html>").as_deref(), Some("http 403"));
    }

    #[test]
    fn status_429_is_a_block() {
        assert_eq!(detect_block(429, "").as_deref(), Some("http 429"));
    }

    #[test]
    fn captcha_signature_in_200_body_is_a_block() {
        let body = r#"<script src="https://captcha-delivery.com/c.js"></script>"#;
        assert_eq!(
            detect_block(200, body).as_deref(),
            Some("captcha-delivery.com")
        );
    }

    #[test]
    fn ordinary_page_is_not_a_block() {
        assert_eq!(detect_block(200, "<html><h1>Shirt</h1></html>"), None);
    }

    #[test]
    fn origin_extraction_strips_path_and_query() {
        assert_eq!(
            extract_origin("https://www.zara.com/us/en/p/1.html?v=2").as_deref(),
            Some("https://www.zara.com")
        );
    }

    #[test]
    fn origin_extraction_keeps_port() {
        assert_eq!(
            extract_origin("http://127.0.0.1:8080/p/1").as_deref(),
            Some("http://127.0.0.1:8080")
        );
    }
}
