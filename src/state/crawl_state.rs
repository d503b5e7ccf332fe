/// Crawl loop state definitions
///
/// This module defines the phases of one crawl iteration and which phase may
/// follow which.
use std::fmt;

/// Represents the current phase of the crawl loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    /// Waiting to take the next URL from the frontier
    Idle,

    /// Sleeping until the crawl delay since the previous fetch has elapsed
    Delaying,

    /// A page fetch is in flight
    Fetching,

    /// Discovered links are being merged into the frontier
    Merging,

    /// The crawl has finished; no further transitions are possible
    Done,
}

impl CrawlState {
    /// Returns true if this is the terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if moving from this state to `next` is a legal step
    ///
    /// `Idle` may also go straight back to `Idle` (a URL was skipped by
    /// robots.txt) or to `Done` (the frontier is exhausted or the crawl was
    /// stopped).
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Idle)
                | (Self::Idle, Self::Delaying)
                | (Self::Idle, Self::Done)
                | (Self::Delaying, Self::Fetching)
                | (Self::Delaying, Self::Done)
                | (Self::Fetching, Self::Merging)
                | (Self::Merging, Self::Idle)
                | (Self::Merging, Self::Done)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Delaying => "delaying",
            Self::Fetching => "fetching",
            Self::Merging => "merging",
            Self::Done => "done",
        }
    }

    /// Returns all possible crawl states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Idle,
            Self::Delaying,
            Self::Fetching,
            Self::Merging,
            Self::Done,
        ]
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
