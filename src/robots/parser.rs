//! Robots.txt parser implementation
//!
//! Turns raw robots.txt text into a [`RobotsRuleSet`] for the generic `*`
//! user agent using the robotstxt crate's parser, and answers path
//! permission queries with its longest-match strategy.

use chrono::{DateTime, Utc};
use robotstxt::matcher::{LongestMatchRobotsMatchStrategy, RobotsMatchStrategy};
use robotstxt::{parse_robotstxt, RobotsParseHandler};
use std::collections::BTreeSet;
use std::time::Duration;

/// Crawl delay used when robots.txt does not specify a usable one
pub const DEFAULT_CRAWL_DELAY_SECONDS: u64 = 1;

/// Rules that apply to the generic `*` user agent of one host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotsRuleSet {
    /// Whether a `User-agent: *` group was found
    pub user_agent_matched: bool,

    /// Path patterns that may not be fetched, lower-cased
    pub disallowed_paths: BTreeSet<String>,

    /// Path patterns that override a shorter matching disallow, lower-cased
    pub allowed_paths: BTreeSet<String>,

    /// Minimum delay between two fetch starts, in seconds
    pub crawl_delay_seconds: u64,

    /// When the underlying robots.txt was downloaded
    pub fetched_at: DateTime<Utc>,
}

/// Collects the directives of every `*` group
///
/// Group boundaries follow the robotstxt matcher: consecutive `User-agent`
/// lines form one group, and the first `User-agent` after any other
/// directive starts a new one.
struct WildcardGroupCollector {
    rules: RobotsRuleSet,
    in_wildcard_group: bool,
    seen_separator: bool,
}

impl WildcardGroupCollector {
    fn new(fetched_at: DateTime<Utc>) -> Self {
        Self {
            rules: RobotsRuleSet {
                user_agent_matched: false,
                disallowed_paths: BTreeSet::new(),
                allowed_paths: BTreeSet::new(),
                crawl_delay_seconds: DEFAULT_CRAWL_DELAY_SECONDS,
                fetched_at,
            },
            in_wildcard_group: false,
            seen_separator: false,
        }
    }

    /// Returns the lower-cased pattern if it belongs to the `*` group
    fn wildcard_pattern(&mut self, value: &str) -> Option<String> {
        self.seen_separator = true;
        if !self.in_wildcard_group || value.is_empty() {
            return None;
        }
        Some(value.to_lowercase())
    }
}

impl RobotsParseHandler for WildcardGroupCollector {
    fn handle_robots_start(&mut self) {}

    fn handle_robots_end(&mut self) {}

    fn handle_user_agent(&mut self, _line_num: u32, user_agent: &str) {
        if self.seen_separator {
            self.in_wildcard_group = false;
            self.seen_separator = false;
        }

        // "* anything" still names the generic agent
        if user_agent.starts_with('*')
            && (user_agent.len() == 1 || user_agent[1..].starts_with(char::is_whitespace))
        {
            self.in_wildcard_group = true;
            self.rules.user_agent_matched = true;
        }
    }

    fn handle_allow(&mut self, _line_num: u32, value: &str) {
        let Some(pattern) = self.wildcard_pattern(value) else {
            return;
        };

        // An allowed index page also allows its directory
        if let Some(slash) = pattern.rfind('/') {
            if pattern[slash..].starts_with("/index.htm") {
                self.rules
                    .allowed_paths
                    .insert(format!("{}$", &pattern[..=slash]));
            }
        }
        self.rules.allowed_paths.insert(pattern);
    }

    fn handle_disallow(&mut self, _line_num: u32, value: &str) {
        if let Some(pattern) = self.wildcard_pattern(value) {
            self.rules.disallowed_paths.insert(pattern);
        }
    }

    fn handle_sitemap(&mut self, _line_num: u32, _value: &str) {
        self.seen_separator = true;
    }

    fn handle_unknown_action(&mut self, _line_num: u32, action: &str, value: &str) {
        self.seen_separator = true;
        if !self.in_wildcard_group || !action.eq_ignore_ascii_case("crawl-delay") {
            return;
        }

        match value.parse::<u64>() {
            Ok(delay) => self.rules.crawl_delay_seconds = delay,
            Err(_) => {
                tracing::debug!("Ignoring malformed Crawl-delay value '{}'", value);
            }
        }
    }
}

impl RobotsRuleSet {
    /// Parses robots.txt content
    ///
    /// Only groups whose user-agent list contains `*` contribute rules.
    /// Field names are case-insensitive, `#` starts a comment, and lines
    /// that do not look like directives are skipped.
    ///
    /// # Arguments
    ///
    /// * `content` - The raw robots.txt file content
    /// * `fetched_at` - When the content was downloaded
    pub fn parse(content: &str, fetched_at: DateTime<Utc>) -> Self {
        let mut collector = WildcardGroupCollector::new(fetched_at);
        parse_robotstxt(content, &mut collector);
        collector.rules
    }

    /// A permissive rule set used when a host publishes no robots.txt
    pub fn allow_all() -> Self {
        Self {
            user_agent_matched: true,
            disallowed_paths: BTreeSet::new(),
            allowed_paths: BTreeSet::new(),
            crawl_delay_seconds: DEFAULT_CRAWL_DELAY_SECONDS,
            fetched_at: Utc::now(),
        }
    }

    /// Checks whether a path may be fetched
    ///
    /// Patterns support `*` and a trailing `$`. The longest matching pattern
    /// wins: a matching `Allow` at least as long as the longest matching
    /// `Disallow` permits the path. Matching ignores case, since crawled
    /// URLs are normalized to lower case. An empty path is treated as `/`.
    pub fn is_allowed(&self, path: &str) -> bool {
        let path = if path.is_empty() {
            "/".to_string()
        } else {
            path.to_lowercase()
        };

        let strategy = LongestMatchRobotsMatchStrategy;
        let disallow = self
            .disallowed_paths
            .iter()
            .map(|pattern| strategy.match_disallow(&path, pattern))
            .max()
            .unwrap_or(-1);
        let allow = self
            .allowed_paths
            .iter()
            .map(|pattern| strategy.match_allow(&path, pattern))
            .max()
            .unwrap_or(-1);

        disallow <= allow
    }

    /// The crawl delay as a duration
    pub fn crawl_delay(&self) -> Duration {
        Duration::from_secs(self.crawl_delay_seconds)
    }

    /// Checks if the rule set is older than `max_age`
    pub fn is_stale(&self, max_age: Duration) -> bool {
        (Utc::now() - self.fetched_at)
            .to_std()
            .map(|age| age > max_age)
            .unwrap_or(false)
    }
}
