//! Sumi-Mirror: a single-origin static site mirror
//!
//! This crate crawls one web origin breadth-first and writes a browsable offline
//! copy of it: pages are saved as directory index documents, same-origin and
//! allow-listed CDN assets are saved at stable, length-bounded paths, and every
//! reference inside saved HTML is rewritten to point into the mirror.

pub mod config;
pub mod crawler;
pub mod layout;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Mirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::StorageError),

    #[error("Markup error for {url}: {source}")]
    Markup {
        url: String,
        source: crawler::MarkupError,
    },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Fetch failed for {url}: {message}")]
    FetchFailure { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    NonSuccessStatus { url: String, status: u16 },

    #[error("Sitemap parse failed for {url}: {message}")]
    SitemapParseFailure { url: String, message: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid host pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    /// The string could not be parsed as a URL at all
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Sumi-Mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_mirror, Coordinator};
pub use layout::{MirrorLayout, PathMapper};
pub use state::{CrawlBudget, CrawlPhase, ResourceOutcome};
pub use crate::url::{canonicalize, CanonicalUrl, Classifier, ScopeDecision};
