//! Asset-host allow-list patterns

use regex::{Regex, RegexBuilder};

/// A configured asset-host pattern
///
/// Wildcard patterns use the `cdn.example` / `*.cdn.example` syntax; regex
/// patterns are matched case-insensitively against the whole host string.
#[derive(Debug, Clone)]
pub enum HostPattern {
    /// Lowercased host, optionally prefixed with `*.`
    Wildcard(String),
    Regex(Regex),
}

impl HostPattern {
    /// Creates a wildcard pattern; the pattern is lowercased
    pub fn wildcard(pattern: &str) -> Self {
        Self::Wildcard(pattern.trim().to_ascii_lowercase())
    }

    /// Compiles a case-insensitive host regex
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(Self::Regex)
    }

    /// Checks whether `host` matches this pattern
    ///
    /// A trailing dot on `host` (fully qualified form) is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use sumi_mirror::url::HostPattern;
    ///
    /// let cdn = HostPattern::wildcard("*.cdn.example");
    /// assert!(cdn.matches("cdn.example"));
    /// assert!(cdn.matches("img.eu.CDN.example"));
    /// assert!(!cdn.matches("evilcdn.example"));
    /// ```
    pub fn matches(&self, host: &str) -> bool {
        let host = host.strip_suffix('.').unwrap_or(host);
        match self {
            Self::Wildcard(pattern) => wildcard_matches(pattern, &host.to_ascii_lowercase()),
            Self::Regex(regex) => regex.is_match(host),
        }
    }
}

/// `*.base` matches `base` and any host ending in `.base`; anything else
/// must match exactly. Both sides are expected in lowercase.
fn wildcard_matches(pattern: &str, host: &str) -> bool {
    if host.is_empty() {
        return false;
    }
    match pattern.strip_prefix("*.") {
        Some(base) => {
            host == base
                || host
                    .strip_suffix(base)
                    .is_some_and(|rest| rest.ends_with('.'))
        }
        None => host == pattern,
    }
}
