//! URL inspection helpers: domain extraction and scheme validation.
//!
//! Domain extraction is a fixed pattern match rather than a full URL parse, so
//! that domains stay comparable with the ones already stored downstream.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// `scheme://host.tld`, anchored at the start of the string.
///
/// The host capture is greedy and backtracks to the last `.` that is followed by
/// a two or three character label.
static DOMAIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://([A-Za-z0-9_.\-]+\.[A-Za-z0-9_]{2,3})")
        .expect("domain pattern is a valid regex")
});

/// Errors that can occur while validating a URL for resolution.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,
}

/// Extracts the registrable domain from a URL string.
///
/// Returns `None` when the string does not start with an `http(s)://host.tld`
/// prefix. Never fails otherwise.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(extract_domain("http://example.com/page").as_deref(), Some("example.com"));
/// assert_eq!(extract_domain("example.com/page"), None);
/// ```
pub fn extract_domain(url: &str) -> Option<String> {
    DOMAIN_PATTERN
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|host| host.as_str().to_string())
}

/// Parses a URL and checks that it uses an HTTP(S) scheme.
///
/// # Errors
///
/// Returns [`UrlNormalizationError::InvalidFormat`] for unparseable input and
/// [`UrlNormalizationError::UnsupportedProtocol`] for any other scheme.
pub fn parse_http_url(input: &str) -> Result<Url, UrlNormalizationError> {
    let url = Url::parse(input).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(UrlNormalizationError::UnsupportedProtocol),
    }
}

/// Returns `true` if the URL parses and has an `http` or `https` scheme.
pub fn is_well_formed(input: &str) -> bool {
    parse_http_url(input).is_ok()
}

/// Resolves a `Location` header value against the URL that returned it.
///
/// Absolute locations are returned unchanged; relative ones are joined onto
/// `base`. When `base` itself cannot be parsed the raw location is returned.
pub fn resolve_location(base: &str, location: &str) -> String {
    let location = location.trim();

    Url::parse(base)
        .ok()
        .and_then(|base| base.join(location).ok())
        .map(|u| u.to_string())
        .unwrap_or_else(|| location.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_domain_simple() {
        assert_eq!(
            extract_domain("http://example.com/page").as_deref(),
            Some("example.com")
        );
    }

    #[test]
    fn test_extract_domain_https_subdomain() {
        assert_eq!(
            extract_domain("https://news.bbc.co.uk/article?id=1").as_deref(),
            Some("news.bbc.co.uk")
        );
    }

    #[test]
    fn test_extract_domain_no_path() {
        assert_eq!(
            extract_domain("https://t.co").as_deref(),
            Some("t.co")
        );
    }

    #[test]
    fn test_extract_domain_hyphenated_host() {
        assert_eq!(
            extract_domain("http://my-site.org/").as_deref(),
            Some("my-site.org")
        );
    }

    #[test]
    fn test_extract_domain_long_tld_truncated() {
        // The pattern only admits 2-3 character final labels.
        assert_eq!(
            extract_domain("http://www.example.info/").as_deref(),
            Some("www.example.inf")
        );
    }

    #[test]
    fn test_extract_domain_missing_scheme() {
        assert_eq!(extract_domain("example.com/page"), None);
    }

    #[test]
    fn test_extract_domain_other_scheme() {
        assert_eq!(extract_domain("ftp://example.com/file"), None);
    }

    #[test]
    fn test_extract_domain_not_anchored_mid_string() {
        assert_eq!(extract_domain("see http://example.com"), None);
    }

    #[test]
    fn test_extract_domain_ip_address() {
        assert_eq!(extract_domain("http://127.0.0.1:8080/x"), None);
    }

    #[test]
    fn test_extract_domain_empty() {
        assert_eq!(extract_domain(""), None);
    }

    #[test]
    fn test_parse_http_url_accepts_http_and_https() {
        assert!(parse_http_url("http://example.com").is_ok());
        assert!(parse_http_url("https://example.com/path?q=1").is_ok());
    }

    #[test]
    fn test_parse_http_url_rejects_other_schemes() {
        let result = parse_http_url("javascript:alert(1)");
        assert!(matches!(
            result,
            Err(UrlNormalizationError::UnsupportedProtocol)
        ));
    }

    #[test]
    fn test_parse_http_url_rejects_garbage() {
        let result = parse_http_url("not a valid url");
        assert!(matches!(result, Err(UrlNormalizationError::InvalidFormat(_))));
    }

    #[test]
    fn test_is_well_formed_display_url() {
        assert!(!is_well_formed("example.com/page"));
    }

    #[test]
    fn test_resolve_location_absolute() {
        assert_eq!(
            resolve_location("http://t.co/abc", "https://example.com/page"),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_resolve_location_relative_path() {
        assert_eq!(
            resolve_location("http://example.com/a/b", "/landing?x=1"),
            "http://example.com/landing?x=1"
        );
    }

    #[test]
    fn test_resolve_location_protocol_relative() {
        assert_eq!(
            resolve_location("https://bit.ly/x", "//example.org/y"),
            "https://example.org/y"
        );
    }

    #[test]
    fn test_resolve_location_unparseable_base() {
        assert_eq!(resolve_location("garbage", " /path "), "/path");
    }
}
