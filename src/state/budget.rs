/// Page budget for one crawl run
///
/// Every fetch attempt counts, including failed ones. The counter only ever
/// increases; there is no way to reset it within a run.
#[derive(Debug, Clone)]
pub struct CrawlBudget {
    max_pages: u32,
    fetched: u32,
}

impl CrawlBudget {
    /// Creates a budget allowing at most `max_pages` fetch operations
    pub fn new(max_pages: u32) -> Self {
        Self {
            max_pages,
            fetched: 0,
        }
    }

    /// Records one fetch operation
    pub fn record_fetch(&mut self) {
        self.fetched = self.fetched.saturating_add(1);
    }

    /// Returns true when no further fetches are allowed
    pub fn is_exhausted(&self) -> bool {
        self.fetched >= self.max_pages
    }

    /// Number of fetch operations recorded so far
    pub fn fetched(&self) -> u32 {
        self.fetched
    }

    /// The configured cap
    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Fetches still allowed before the cap is hit
    pub fn remaining(&self) -> u32 {
        self.max_pages.saturating_sub(self.fetched)
    }
}
