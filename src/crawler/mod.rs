//! Crawler module for mirroring a single origin
//!
//! This module contains the core crawling logic, including:
//! - The de-duplicating frontier of URLs to fetch
//! - HTTP fetching behind the `Fetcher` boundary
//! - Sitemap expansion
//! - HTML link rewriting
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod markup;
mod rewriter;
mod sitemap;

pub use coordinator::Coordinator;
pub use fetcher::{
    build_http_client, is_html, FetchResult, Fetcher, HttpFetcher, FETCH_FAILURE_STATUS,
};
pub use frontier::{EntryState, Frontier};
pub use markup::{
    detect_encoding, HtmlDocument, MarkupDocument, MarkupError, ReferenceKind, ReferenceRewrite,
    REFERENCE_ATTRIBUTES,
};
pub use rewriter::{resolve_reference, split_srcset, LinkRewriter, SrcsetToken};
pub use sitemap::{parse_sitemap, SitemapError, SitemapMatcher, DEFAULT_SITEMAP_PATTERN};

use crate::config::Config;
use crate::output::CrawlStatistics;
use crate::storage::FsStorage;
use crate::MirrorError;

/// Runs a complete mirror operation
///
/// This is the main entry point for mirroring. It will:
/// 1. Build the HTTP client
/// 2. Seed the frontier with the origin root and the configured seeds
/// 3. Fetch, rewrite and save until the frontier or the budget runs out
/// 4. Return the run statistics
///
/// # Arguments
///
/// * `config` - The validated mirror configuration
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - The crawl ran to completion
/// * `Err(MirrorError)` - The crawl could not be started
///
/// # Example
///
/// ```no_run
/// use sumi_mirror::config::load_config;
/// use sumi_mirror::crawler::run_mirror;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("mirror.toml"))?;
/// let stats = run_mirror(&config).await?;
/// println!("{} pages saved", stats.pages_saved());
/// # Ok(())
/// # }
/// ```
pub async fn run_mirror(config: &Config) -> Result<CrawlStatistics, MirrorError> {
    let fetcher = HttpFetcher::from_config(config)?;
    let mut coordinator = Coordinator::new(config, fetcher, FsStorage::new())?;
    let stats = coordinator.run().await;

    let storage = coordinator.storage();
    tracing::info!(
        "Wrote {} files ({} bytes)",
        storage.files_written(),
        storage.bytes_written()
    );

    Ok(stats)
}
