use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pacing and bounds for a crawl run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Tabs opened at once in parallel mode; also the batch size (default: 3)
    pub parallel_tabs: usize,

    /// Pause between batches or chain steps in milliseconds (default: 500)
    pub delay_ms: u64,

    /// Hard stop for chain-follow runs without an explicit count (default: 50)
    pub max_posts: usize,

    /// Average chapters per post, used to size a run toward a target chapter (default: 2.0)
    pub chapters_per_post: f64,

    /// Prefer an open tab whose URL contains this when following a chain;
    /// empty means take the first page tab
    pub tab_hint: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            parallel_tabs: 3,
            delay_ms: 500,
            max_posts: 50,
            chapters_per_post: 2.0,
            tab_hint: "ko-fi.com".to_string(),
        }
    }
}

impl CrawlerConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_crawler_config() {
        let config = CrawlerConfig::default();
        assert_eq!(config.parallel_tabs, 3);
        assert_eq!(config.delay(), Duration::from_millis(500));
        assert_eq!(config.max_posts, 50);
        assert_eq!(config.chapters_per_post, 2.0);
    }

    #[test]
    fn test_partial_crawler_config() {
        let config: CrawlerConfig = toml::from_str("parallel_tabs = 6\ntab_hint = \"\"").unwrap();
        assert_eq!(config.parallel_tabs, 6);
        assert!(config.tab_hint.is_empty());
        assert_eq!(config.max_posts, 50);
    }
}
