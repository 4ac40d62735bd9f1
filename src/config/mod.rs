//! Configuration management for chaptercrawl.
//!
//! Configuration is read from `~/.config/chaptercrawl/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.
//! Command-line flags are applied on top afterwards.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::crawler::CrawlerConfig;
use crate::devtools::DevtoolsConfig;
use crate::scraper::ScraperConfig;

/// Where captured chapters go
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub chapters_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            chapters_dir: PathBuf::from("Chapters_Untranslated"),
        }
    }
}

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub devtools: DevtoolsConfig,
    pub scraper: ScraperConfig,
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration.
    ///
    /// With no explicit path the default location is used, and a commented
    /// default file is created there if missing. An explicit path must exist.
    /// Missing fields in the config file will use default values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::Missing(p.to_path_buf()));
                }
                p.to_path_buf()
            }
            None => {
                let default_path = Self::default_config_path()?;
                if !default_path.exists() {
                    Self::create_default_config(&default_path)?;
                    return Ok(Self::default());
                }
                default_path
            }
        };

        Self::from_file(&config_path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/chaptercrawl/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("chaptercrawl").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# chaptercrawl configuration
#
# The browser must already be running with remote debugging enabled, e.g.
#   chrome --remote-debugging-port=9222
# and logged in to the site being crawled.

[devtools]
host = "127.0.0.1"
port = 9222

# Timeout for the debug port's HTTP endpoints (seconds)
http_timeout_secs = 10

[scraper]
# How long to wait for a page's load event (milliseconds)
load_timeout_ms = 10000

# How often to check for the load event (milliseconds)
poll_interval_ms = 500

# Extra wait after the load event for late scripts (milliseconds)
settle_ms = 300

# Selectors tried in order for the post title
title_selectors = ["h1", "h2"]

# Element whose shadow root holds the post body
host_selector = ".article-host"

# Body element inside the shadow root
body_selector = ".fr-view"

# Link text that marks the "next chapter" link (case-insensitive)
next_link_phrases = ["next chapter", ">> next"]

# Additional regexes for lines to drop while cleaning
extra_skip_patterns = []

[crawler]
# Tabs used at once in parallel mode
parallel_tabs = 3

# Pause between batches or chain steps (milliseconds)
delay_ms = 500

# Upper bound on posts visited by `chain --auto`
max_posts = 50

# Rough number of chapters per post, used by `chain --target`
chapters_per_post = 2.0

# An open tab whose URL contains this is reused by chain mode
tab_hint = "ko-fi.com"

[output]
chapters_dir = "Chapters_Untranslated"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Config file not found: {0}")]
    Missing(PathBuf),

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
