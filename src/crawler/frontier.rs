//! Crawl frontier
//!
//! A FIFO queue of URLs still to visit plus the set of every URL ever
//! enqueued, so each URL is queued at most once over a crawl's lifetime.

use crate::url::parse_absolute;
use std::collections::{HashSet, VecDeque};
use thiserror::Error;
use url::Url;

/// Returned by [`Frontier::dequeue`] when nothing is left to visit
///
/// This is the normal end-of-crawl signal, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("frontier is empty")]
pub struct EmptyFrontier;

/// URLs discovered but not yet fetched
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<Url>,
    seen: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers a URL to the frontier
    ///
    /// Empty strings, strings that are not absolute http(s) URLs with a host,
    /// and URLs enqueued before are ignored.
    ///
    /// # Returns
    ///
    /// `true` if the URL was appended to the queue
    pub fn enqueue(&mut self, url: &str) -> bool {
        if url.trim().is_empty() {
            return false;
        }

        let parsed = match parse_absolute(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::trace!("Not enqueuing {}: {}", url, e);
                return false;
            }
        };

        if !self.seen.insert(parsed.as_str().to_string()) {
            return false;
        }

        self.queue.push_back(parsed);
        true
    }

    /// Removes and returns the oldest queued URL
    pub fn dequeue(&mut self) -> Result<Url, EmptyFrontier> {
        self.queue.pop_front().ok_or(EmptyFrontier)
    }

    /// Number of URLs waiting to be visited
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of distinct URLs ever enqueued
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
