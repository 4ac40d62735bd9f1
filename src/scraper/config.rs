use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for loading a post and pulling its text out
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Overall wait for the load event in milliseconds (default: 10000)
    pub load_timeout_ms: u64,

    /// Sub-timeout for each event poll in milliseconds (default: 500)
    pub poll_interval_ms: u64,

    /// Extra wait after the load event so shadow DOM can render (default: 300)
    pub settle_ms: u64,

    /// Selectors tried in order for the post title
    pub title_selectors: Vec<String>,

    /// Element whose shadow root holds the article
    pub host_selector: String,

    /// Article body inside the shadow root
    pub body_selector: String,

    /// Case-insensitive link texts that mark the "next chapter" link
    pub next_link_phrases: Vec<String>,

    /// Extra regexes for lines to drop while cleaning, on top of the built-in table
    pub extra_skip_patterns: Vec<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            load_timeout_ms: 10_000,
            poll_interval_ms: 500,
            settle_ms: 300,
            title_selectors: vec!["h1".to_string(), "h2".to_string()],
            host_selector: ".article-host".to_string(),
            body_selector: ".fr-view".to_string(),
            next_link_phrases: vec!["next chapter".to_string(), ">> next".to_string()],
            extra_skip_patterns: Vec::new(),
        }
    }
}

impl ScraperConfig {
    /// Get the page load timeout as a Duration
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Get the settle delay after load as a Duration
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}
