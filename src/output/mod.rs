//! Output module for reporting mirror runs
//!
//! This module handles:
//! - Recording per-URL outcomes during a run
//! - Printing the end-of-run statistics

pub mod stats;

pub use stats::{print_statistics, CrawlStatistics};
