//! Loading one post in a tab and turning it into chapters.
//!
//! # Architecture
//!
//! ```text
//! Session → navigate_and_wait → ContentExtractor (extract.js) → ChapterSegmenter
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use chaptercrawl::scraper::{PageScraper, ScraperConfig};
//!
//! let scraper = PageScraper::new(&ScraperConfig::default())?;
//! let post = scraper.scrape(&mut session, "https://ko-fi.com/post/...").await?;
//! for chapter in &post.chapters {
//!     println!("{} {}", chapter.number, chapter.title);
//! }
//! ```

mod config;
mod extractor;
mod navigator;

pub use config::ScraperConfig;
pub use extractor::ContentExtractor;
pub use navigator::{navigate_and_wait, NavigationOptions};

use tracing::warn;

use crate::app::{Result, ScrapeError};
use crate::devtools::Session;
use crate::domain::{ChapterRecord, ExtractedPage};
use crate::segmenter::{ChapterSegmenter, TextCleaner};

/// Result of scraping one post
#[derive(Debug, Clone)]
pub struct ScrapedPost {
    pub page: ExtractedPage,
    /// Whether the load event arrived before the timeout
    pub loaded: bool,
    pub chapters: Vec<ChapterRecord>,
}

/// Navigation, extraction and segmentation for a single post
pub struct PageScraper {
    navigation: NavigationOptions,
    extractor: ContentExtractor,
    segmenter: ChapterSegmenter,
}

impl PageScraper {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let cleaner = TextCleaner::with_extra_patterns(&config.extra_skip_patterns)
            .map_err(|e| ScrapeError::Config(format!("invalid extra_skip_patterns: {}", e)))?;

        Ok(Self {
            navigation: NavigationOptions::from(config),
            extractor: ContentExtractor::new(config),
            segmenter: ChapterSegmenter::new(cleaner),
        })
    }

    /// Scrape `url` in the session's tab.
    ///
    /// A load timeout is not an error: extraction runs on whatever rendered.
    pub async fn scrape(&self, session: &mut Session, url: &str) -> Result<ScrapedPost> {
        let loaded = navigate_and_wait(session, url, self.navigation).await?;
        if !loaded {
            warn!(url, "no load event, trying extraction anyway");
        }

        let page = self.extractor.extract(session).await?;
        let chapters = self.segmenter.segment(&page.content, &page.title);

        Ok(ScrapedPost {
            page,
            loaded,
            chapters,
        })
    }
}
