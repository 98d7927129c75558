//! Outcome definitions for a single crawled URL
//!
//! Each URL popped from the frontier ends in exactly one of these outcomes.

use std::fmt;

/// Represents what the crawl loop did with one popped URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceOutcome {
    // ===== Persisted =====
    /// Same-origin HTML page, rewritten and saved as an index document
    SavedPage,

    /// Asset saved verbatim at its mapped path
    SavedAsset,

    /// Sitemap saved verbatim; its locations are enqueued afterwards when
    /// the XML parses
    SavedSitemap,

    // ===== Skipped =====
    /// Off-origin, non-asset response; nothing to mirror
    Discarded,

    // ===== Errors =====
    /// The fetcher reported a transport failure (synthetic status)
    FetchFailed,

    /// The server answered with a non-2xx status
    NonSuccess,

    /// The response was fine but could not be rewritten or written to disk
    Failed,
}

impl ResourceOutcome {
    /// Returns true if something was written to the mirror
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::SavedPage | Self::SavedAsset | Self::SavedSitemap)
    }

    /// Returns true if this represents an error
    pub fn is_error(&self) -> bool {
        matches!(self, Self::FetchFailed | Self::NonSuccess | Self::Failed)
    }

    /// Short label used in log lines and statistics output
    pub fn label(&self) -> &'static str {
        match self {
            Self::SavedPage => "page",
            Self::SavedAsset => "asset",
            Self::SavedSitemap => "sitemap",
            Self::Discarded => "discarded",
            Self::FetchFailed => "fetch_failed",
            Self::NonSuccess => "non_success",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible outcomes
    pub fn all() -> [Self; 7] {
        [
            Self::SavedPage,
            Self::SavedAsset,
            Self::SavedSitemap,
            Self::Discarded,
            Self::FetchFailed,
            Self::NonSuccess,
            Self::Failed,
        ]
    }
}

impl fmt::Display for ResourceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
