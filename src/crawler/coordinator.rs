//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties everything together:
//! - Seeding the frontier with the origin root and configured seed paths
//! - Popping, fetching and classifying one URL at a time
//! - Expanding sitemaps, rewriting pages and saving assets
//! - Counting fetches against the page budget and recording outcomes

use crate::config::Config;
use crate::crawler::fetcher::{is_html, FetchResult, Fetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::markup::{HtmlDocument, MarkupDocument};
use crate::crawler::rewriter::LinkRewriter;
use crate::crawler::sitemap::{parse_sitemap, SitemapMatcher};
use crate::layout::{MirrorLayout, PathMapper};
use crate::output::CrawlStatistics;
use crate::state::{CrawlBudget, CrawlPhase, ResourceOutcome};
use crate::storage::Storage;
use crate::url::{canonicalize, CanonicalUrl, Classifier};
use crate::{ConfigError, MirrorError, UrlError};
use url::Url;

/// Main crawler coordinator structure
///
/// Owns every piece of crawl state (frontier, asset path table, budget) as
/// well as the transport and the storage backend. URLs are processed strictly
/// one after another; the fetch is the only await point.
pub struct Coordinator<F: Fetcher, S: Storage> {
    origin: Url,
    classifier: Classifier,
    sitemaps: SitemapMatcher,
    mapper: PathMapper,
    layout: MirrorLayout,
    frontier: Frontier,
    budget: CrawlBudget,
    phase: CrawlPhase,
    stats: CrawlStatistics,
    fetcher: F,
    storage: S,
}

impl<F: Fetcher, S: Storage> Coordinator<F, S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The validated mirror configuration
    /// * `fetcher` - Transport used for every request
    /// * `storage` - Backend the mirror is written to
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Coordinator with a seeded frontier
    /// * `Err(MirrorError)` - The configuration could not be turned into crawl state
    pub fn new(config: &Config, fetcher: F, storage: S) -> Result<Self, MirrorError> {
        let origin = Url::parse(&config.origin)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid origin: {}", e)))?;
        let classifier = Classifier::from_config(config)?;
        let sitemaps = SitemapMatcher::new(&config.crawler.sitemap_pattern).map_err(|e| {
            ConfigError::InvalidPattern(format!("Invalid sitemap pattern: {}", e))
        })?;

        let mut coordinator = Self {
            origin,
            classifier,
            sitemaps,
            mapper: PathMapper::from_config(config),
            layout: MirrorLayout::from_config(&config.output),
            frontier: Frontier::new(),
            budget: CrawlBudget::new(config.crawler.max_pages),
            phase: CrawlPhase::Running,
            stats: CrawlStatistics::start(),
            fetcher,
            storage,
        };

        coordinator.seed(&config.crawler.seeds)?;
        Ok(coordinator)
    }

    /// Pushes the origin root followed by each seed path
    fn seed(&mut self, seeds: &[String]) -> Result<(), MirrorError> {
        let root = self.join_origin("/")?;
        self.frontier.push_url(&root)?;

        for seed in seeds {
            let url = self.join_origin(seed)?;
            if self.frontier.push_url(&url)? {
                tracing::debug!("Seeded {}", url);
            }
        }

        tracing::info!("Seeded frontier with {} URLs", self.frontier.len());
        Ok(())
    }

    fn join_origin(&self, path: &str) -> Result<Url, UrlError> {
        self.origin
            .join(path)
            .map_err(|e| UrlError::Parse(format!("{}: {}", path, e)))
    }

    /// Runs the crawl loop until the frontier or the budget is exhausted
    ///
    /// Per-URL failures are logged and counted; nothing stops the loop early.
    pub async fn run(&mut self) -> CrawlStatistics {
        tracing::info!(
            "Mirroring {} into {} (budget {} fetches)",
            self.origin,
            self.layout.root().display(),
            self.budget.max_pages()
        );

        while !self.step().await.is_done() {}

        self.statistics()
    }

    /// Processes at most one URL and returns the resulting phase
    pub async fn step(&mut self) -> CrawlPhase {
        if self.phase.is_done() {
            return self.phase;
        }

        if self.budget.is_exhausted() {
            tracing::info!(
                "Page budget of {} reached, {} URLs left in frontier",
                self.budget.max_pages(),
                self.frontier.len()
            );
            return self.finish();
        }

        let url = match self.frontier.pop() {
            Some(url) => url,
            None => {
                tracing::info!("Frontier is empty, crawl complete");
                return self.finish();
            }
        };

        let result = self.fetcher.fetch(url.as_url()).await;
        self.budget.record_fetch();
        tracing::info!("[{}] {} {}", self.budget.fetched(), result.status(), url);

        let outcome = match self.process(&url, result) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(url = %url, "{}", e);
                outcome_for_error(&e)
            }
        };
        tracing::debug!("{} -> {}", url, outcome);
        self.stats.record(outcome);

        self.phase
    }

    /// Classifies a fetched response and persists it
    fn process(
        &mut self,
        url: &CanonicalUrl,
        result: FetchResult,
    ) -> Result<ResourceOutcome, MirrorError> {
        let final_url = match &result {
            FetchResult::Failed { error } => {
                return Err(MirrorError::FetchFailure {
                    url: url.to_string(),
                    message: error.clone(),
                })
            }
            FetchResult::Response { .. } if !result.is_success() => {
                return Err(MirrorError::NonSuccessStatus {
                    url: url.to_string(),
                    status: result.status(),
                })
            }
            FetchResult::Response { final_url, .. } => final_url,
        };
        let body = result.body();
        let content_type = result.header("content-type");

        let target = url.as_url();

        if self.sitemaps.is_sitemap(target) {
            return self.save_sitemap(url, final_url, body);
        }

        if self.classifier.is_same_origin(target) && is_html(content_type, body) {
            return self.save_page(url, final_url, body, content_type);
        }

        if self.classifier.is_asset_like(target) {
            return self.save_asset(url, body);
        }

        tracing::debug!(
            "Discarding {} (content type {})",
            url,
            content_type.unwrap_or("unknown")
        );
        Ok(ResourceOutcome::Discarded)
    }

    /// Saves a sitemap verbatim and enqueues its same-origin locations
    fn save_sitemap(
        &mut self,
        url: &CanonicalUrl,
        final_url: &Url,
        body: &[u8],
    ) -> Result<ResourceOutcome, MirrorError> {
        let site_path = self.mapper.local_site_path(url.as_url());
        let path = self.layout.fs_path(&site_path);
        self.storage.write_binary(&path, body)?;

        let locs = match parse_sitemap(body) {
            Ok(locs) => locs,
            Err(e) => {
                let error = MirrorError::SitemapParseFailure {
                    url: url.to_string(),
                    message: e.to_string(),
                };
                tracing::warn!("{}", error);
                return Ok(ResourceOutcome::SavedSitemap);
            }
        };

        let mut queued = 0;
        for loc in &locs {
            let resolved = match final_url.join(loc).map(|u| canonicalize(u.as_str())) {
                Ok(Ok(canonical)) => canonical,
                _ => {
                    tracing::debug!("Skipping malformed sitemap location '{}'", loc);
                    continue;
                }
            };

            if !self.classifier.is_same_origin(resolved.as_url()) {
                tracing::trace!("Skipping off-origin sitemap location {}", resolved);
                continue;
            }

            if self.frontier.push_canonical(resolved) {
                queued += 1;
            }
        }

        tracing::debug!(
            "Sitemap {} listed {} locations, {} newly queued",
            url,
            locs.len(),
            queued
        );
        Ok(ResourceOutcome::SavedSitemap)
    }

    /// Rewrites a page, saves it as an index document and enqueues its links
    fn save_page(
        &mut self,
        url: &CanonicalUrl,
        final_url: &Url,
        body: &[u8],
        content_type: Option<&str>,
    ) -> Result<ResourceOutcome, MirrorError> {
        let mut document = HtmlDocument::from_response(body, content_type);

        let discovered = LinkRewriter::new(&self.classifier, &mut self.mapper)
            .rewrite(&mut document, final_url)
            .map_err(|source| MirrorError::Markup {
                url: url.to_string(),
                source,
            })?;

        let mut queued = 0;
        for found in discovered.iter() {
            if self.classifier.is_in_scope(found.as_url())
                && self.frontier.push_canonical(found.clone())
            {
                queued += 1;
            }
        }

        let path = self.layout.page_fs_path(url.as_url());
        self.storage.write_binary(&path, &document.serialize())?;

        tracing::debug!(
            "Saved page {:?} to {} ({}, {} references, {} newly queued)",
            document.title().unwrap_or_default(),
            path.display(),
            document.encoding().name(),
            discovered.len(),
            queued
        );
        Ok(ResourceOutcome::SavedPage)
    }

    /// Saves an asset verbatim at its mapped path
    fn save_asset(&mut self, url: &CanonicalUrl, body: &[u8]) -> Result<ResourceOutcome, MirrorError> {
        let site_path = self.mapper.local_site_path(url.as_url());
        let path = self.layout.fs_path(&site_path);
        self.storage.write_binary(&path, body)?;

        tracing::debug!("Saved asset {} to {}", url, path.display());
        Ok(ResourceOutcome::SavedAsset)
    }

    /// Moves to `Done` and stamps the statistics
    fn finish(&mut self) -> CrawlPhase {
        self.phase = CrawlPhase::Done;
        self.stats.finish();
        tracing::info!(
            "Crawl completed: {} fetches, {} pages and {} assets saved",
            self.budget.fetched(),
            self.stats.pages_saved(),
            self.stats.assets_saved()
        );
        self.phase
    }

    /// Statistics so far (final once the phase is `Done`)
    pub fn statistics(&self) -> CrawlStatistics {
        let mut stats = self.stats.clone();
        stats.pages_fetched = self.budget.fetched();
        stats.urls_discovered = self.frontier.known() as u64;
        stats.urls_remaining = self.frontier.len() as u64;
        stats.assets_mapped = self.mapper.len() as u64;
        stats
    }

    /// Current phase of the loop
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// The frontier
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// The fetch budget
    pub fn budget(&self) -> &CrawlBudget {
        &self.budget
    }

    /// The transport
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// The storage backend
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

/// Outcome recorded for a per-URL error
fn outcome_for_error(error: &MirrorError) -> ResourceOutcome {
    match error {
        MirrorError::FetchFailure { .. } => ResourceOutcome::FetchFailed,
        MirrorError::NonSuccessStatus { .. } => ResourceOutcome::NonSuccess,
        _ => ResourceOutcome::Failed,
    }
}
