//! State module for tracking crawl progress
//!
//! This module provides the small pieces of state the crawl loop carries between
//! iterations.
//!
//! # Components
//!
//! - `CrawlPhase`: The loop's state machine (`Running` until `Done`)
//! - `CrawlBudget`: Counts fetch operations against the page cap
//! - `ResourceOutcome`: What happened to a single popped URL

mod budget;
mod outcome;

// Re-export main types
pub use budget::CrawlBudget;
pub use outcome::ResourceOutcome;

/// State of the crawl loop
///
/// The loop starts in `Running` and moves to `Done` exactly once, when the
/// frontier is empty or the budget is exhausted. `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    Running,
    Done,
}

impl CrawlPhase {
    /// Returns true once the crawl has finished
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}
