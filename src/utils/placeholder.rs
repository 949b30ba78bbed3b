//! Placeholder / parking page detection for redirect targets.
//!
//! A redirect chain that ends on a registrar's "domain not found" page technically
//! succeeds, but the landing URL is useless as a canonical destination. The
//! resolver asks a [`PlaceholderDetector`] about every candidate terminal URL and
//! refuses to accept the ones it flags.

/// Decides whether a URL looks like a placeholder or parking page.
///
/// Implemented for any `Fn(&str) -> bool`, so callers can pass a closure.
pub trait PlaceholderDetector: Send + Sync {
    fn is_placeholder(&self, url: &str) -> bool;
}

impl<F> PlaceholderDetector for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_placeholder(&self, url: &str) -> bool {
        self(url)
    }
}

/// Default substring patterns.
pub const DEFAULT_PLACEHOLDER_PATTERNS: &[&str] = &["domainnotfound"];

/// Case-insensitive substring matcher over a configurable pattern list.
#[derive(Debug, Clone)]
pub struct SubstringDetector {
    patterns: Vec<String>,
}

impl SubstringDetector {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| p.as_ref().trim().to_ascii_lowercase())
            .filter(|p| !p.is_empty())
            .collect();

        Self { patterns }
    }

    /// Parses a comma-separated pattern list, e.g. from `PLACEHOLDER_PATTERNS`.
    pub fn from_csv(csv: &str) -> Self {
        Self::new(csv.split(','))
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Default for SubstringDetector {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER_PATTERNS.iter().copied())
    }
}

impl PlaceholderDetector for SubstringDetector {
    fn is_placeholder(&self, url: &str) -> bool {
        let url = url.to_ascii_lowercase();
        self.patterns.iter().any(|p| url.contains(p.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_flags_domainnotfound() {
        let detector = SubstringDetector::default();
        assert!(detector.is_placeholder("http://ww1.registrar.com/DomainNotFound?d=x.io"));
    }

    #[test]
    fn test_default_passes_regular_page() {
        let detector = SubstringDetector::default();
        assert!(!detector.is_placeholder("https://example.com/article"));
    }

    #[test]
    fn test_from_csv_trims_and_skips_empty() {
        let detector = SubstringDetector::from_csv(" parked , ,domainnotfound,");
        assert_eq!(detector.patterns(), &["parked", "domainnotfound"]);
        assert!(detector.is_placeholder("http://parked.example.net/"));
    }

    #[test]
    fn test_empty_list_flags_nothing() {
        let detector = SubstringDetector::from_csv("");
        assert!(!detector.is_placeholder("http://domainnotfound.example/"));
    }

    #[test]
    fn test_closure_is_a_detector() {
        let detector = |url: &str| url.ends_with("/parking");
        assert!(detector.is_placeholder("http://example.com/parking"));
        assert!(!detector.is_placeholder("http://example.com/"));
    }
}
