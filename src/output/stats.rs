//! Statistics for a finished mirror run
//!
//! The crawl loop records one [`ResourceOutcome`] per popped URL; this module
//! turns those into the end-of-run report.

use crate::state::ResourceOutcome;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Fetch operations performed, failed attempts included
    pub pages_fetched: u32,

    /// Count of popped URLs by outcome
    pub outcomes: HashMap<ResourceOutcome, u64>,

    /// Distinct URLs pushed into the frontier (seeds included)
    pub urls_discovered: u64,

    /// URLs still queued when the run ended
    pub urls_remaining: u64,

    /// Asset URLs with a recorded local path
    pub assets_mapped: u64,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished (unset while running)
    pub finished_at: Option<DateTime<Utc>>,
}

impl CrawlStatistics {
    /// Empty statistics for a run starting now
    pub fn start() -> Self {
        Self {
            pages_fetched: 0,
            outcomes: HashMap::new(),
            urls_discovered: 0,
            urls_remaining: 0,
            assets_mapped: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Counts one popped URL
    pub fn record(&mut self, outcome: ResourceOutcome) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
    }

    /// Marks the run finished
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Number of URLs that ended in `outcome`
    pub fn count(&self, outcome: ResourceOutcome) -> u64 {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Pages written to the mirror
    pub fn pages_saved(&self) -> u64 {
        self.count(ResourceOutcome::SavedPage)
    }

    /// Assets written to the mirror
    pub fn assets_saved(&self) -> u64 {
        self.count(ResourceOutcome::SavedAsset)
    }

    /// Sitemaps written to the mirror
    pub fn sitemaps_saved(&self) -> u64 {
        self.count(ResourceOutcome::SavedSitemap)
    }

    /// Responses fetched but not mirrored
    pub fn discarded(&self) -> u64 {
        self.count(ResourceOutcome::Discarded)
    }

    /// URLs that ended in any error outcome
    pub fn failures(&self) -> u64 {
        self.outcomes
            .iter()
            .filter(|(outcome, _)| outcome.is_error())
            .map(|(_, count)| count)
            .sum()
    }

    /// Run duration in seconds, if finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

impl Default for CrawlStatistics {
    fn default() -> Self {
        Self::start()
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Mirror Statistics ===\n");

    println!("Overview:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(duration) = stats.duration_seconds() {
        println!("  Duration: {}s", duration);
    }
    println!("  Pages fetched: {}", stats.pages_fetched);
    println!("  URLs discovered: {}", stats.urls_discovered);
    println!("  URLs left in frontier: {}", stats.urls_remaining);
    println!("  Asset paths mapped: {}", stats.assets_mapped);
    println!();

    println!("Saved:");
    println!("  Pages: {}", stats.pages_saved());
    println!("  Assets: {}", stats.assets_saved());
    println!("  Sitemaps: {}", stats.sitemaps_saved());
    println!("  Discarded: {}", stats.discarded());
    println!();

    let failures = stats.failures();
    if failures > 0 {
        println!("Error Summary:");
        for outcome in ResourceOutcome::all()
            .into_iter()
            .filter(ResourceOutcome::is_error)
        {
            let count = stats.count(outcome);
            if count > 0 {
                println!("  {}: {}", outcome, count);
            }
        }
        println!();
    }

    let total: u64 = stats.outcomes.values().sum();
    let saved = stats.pages_saved() + stats.assets_saved() + stats.sitemaps_saved();
    let success_rate = if total > 0 {
        (saved as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} URLs saved)",
        success_rate, saved, total
    );
}
