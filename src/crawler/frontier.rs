//! Frontier: the de-duplicating FIFO of URLs still to fetch
//!
//! Every URL is canonicalized on the way in. A URL is queued at most once and,
//! once popped, is never handed out again, which bounds the crawl by the
//! number of distinct canonical URLs reachable from the seeds.

use crate::url::{canonicalize, CanonicalUrl};
use crate::UrlError;
use std::collections::{HashMap, VecDeque};
use url::Url;

/// Where a known URL stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Waiting in the queue
    Queued,
    /// Popped for fetching
    Seen,
}

/// De-duplicating work queue of canonical URLs
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<CanonicalUrl>,
    entries: HashMap<CanonicalUrl, EntryState>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonicalizes `url` and enqueues it unless it is already known
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The URL was new and is now queued
    /// * `Ok(false)` - The URL was already queued or seen
    /// * `Err(UrlError)` - The URL could not be canonicalized
    pub fn push(&mut self, url: &str) -> Result<bool, UrlError> {
        let canonical = canonicalize(url)?;
        Ok(self.push_canonical(canonical))
    }

    /// Enqueues a parsed URL
    pub fn push_url(&mut self, url: &Url) -> Result<bool, UrlError> {
        self.push(url.as_str())
    }

    /// Enqueues an already canonical URL
    pub fn push_canonical(&mut self, url: CanonicalUrl) -> bool {
        if self.entries.contains_key(&url) {
            tracing::trace!("Frontier already knows {}", url);
            return false;
        }

        self.entries.insert(url.clone(), EntryState::Queued);
        self.queue.push_back(url);
        true
    }

    /// Takes the oldest queued URL and marks it seen
    pub fn pop(&mut self) -> Option<CanonicalUrl> {
        let url = self.queue.pop_front()?;
        self.entries.insert(url.clone(), EntryState::Seen);
        Some(url)
    }

    /// True while URLs are waiting
    pub fn has_work(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Number of queued URLs
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of distinct URLs ever pushed
    pub fn known(&self) -> usize {
        self.entries.len()
    }

    /// State of a canonical URL, if it was ever pushed
    pub fn state(&self, url: &CanonicalUrl) -> Option<EntryState> {
        self.entries.get(url).copied()
    }

    /// True if the URL was already popped
    pub fn is_seen(&self, url: &CanonicalUrl) -> bool {
        self.state(url) == Some(EntryState::Seen)
    }
}
