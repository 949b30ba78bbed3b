//! Result of resolving one RawUrl.

use std::fmt;

/// How the resolver reached its answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Answered from the cache; no network traffic.
    CacheHit,
    /// Empty input; nothing to resolve and nothing cached.
    Empty,
    /// Not an http(s) URL, so it cannot be requested. Self-mapped.
    Unrequestable,
    /// The first response carried no redirect; the RawUrl is canonical.
    NoRedirect,
    /// A hop answered with a definitive success.
    Followed { hops: usize },
    /// A request failed while the local network was up. The target is broken.
    TargetUnreachable { hops: usize },
    /// The chain kept redirecting past the hop limit.
    HopLimitExceeded { hops: usize },
    /// The chain redirected back to a URL it had already visited.
    RedirectLoop { hops: usize },
    /// The chain stopped on a non-success or rejected (placeholder) response.
    DeadEnd { hops: usize, status: u16 },
}

impl ResolutionOutcome {
    /// Whether the answer came from a fallback rather than a clean terminal page.
    pub fn is_fallback(&self) -> bool {
        matches!(
            self,
            Self::Unrequestable
                | Self::TargetUnreachable { .. }
                | Self::HopLimitExceeded { .. }
                | Self::RedirectLoop { .. }
                | Self::DeadEnd { .. }
        )
    }

    /// Whether reaching this outcome involved a fresh cache write.
    pub fn writes_cache(&self) -> bool {
        !matches!(self, Self::CacheHit | Self::Empty)
    }
}

impl fmt::Display for ResolutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::CacheHit => write!(f, "cache hit"),
            Self::Empty => write!(f, "empty url"),
            Self::Unrequestable => write!(f, "not an http(s) url"),
            Self::NoRedirect => write!(f, "no redirect"),
            Self::Followed { hops } => write!(f, "followed {} hop(s)", hops),
            Self::TargetUnreachable { hops } => {
                write!(f, "target unreachable after {} hop(s)", hops)
            }
            Self::HopLimitExceeded { hops } => write!(f, "too many redirects ({} hops)", hops),
            Self::RedirectLoop { hops } => write!(f, "redirect loop after {} hop(s)", hops),
            Self::DeadEnd { hops, status } => {
                write!(f, "dead end with status {} after {} hop(s)", status, hops)
            }
        }
    }
}

/// A ResolvedUrl together with how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub url: String,
    pub outcome: ResolutionOutcome,
}

impl Resolution {
    pub fn new(url: impl Into<String>, outcome: ResolutionOutcome) -> Self {
        Self {
            url: url.into(),
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_outcomes() {
        assert!(ResolutionOutcome::HopLimitExceeded { hops: 10 }.is_fallback());
        assert!(ResolutionOutcome::TargetUnreachable { hops: 0 }.is_fallback());
        assert!(!ResolutionOutcome::Followed { hops: 2 }.is_fallback());
        assert!(!ResolutionOutcome::NoRedirect.is_fallback());
    }

    #[test]
    fn test_cache_write_outcomes() {
        assert!(!ResolutionOutcome::CacheHit.writes_cache());
        assert!(!ResolutionOutcome::Empty.writes_cache());
        assert!(ResolutionOutcome::NoRedirect.writes_cache());
        assert!(ResolutionOutcome::Unrequestable.writes_cache());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ResolutionOutcome::DeadEnd { hops: 1, status: 404 }.to_string(),
            "dead end with status 404 after 1 hop(s)"
        );
    }
}
