//! # chaptercrawl
//!
//! Captures serialized novel chapters from paginated web posts by driving an
//! already-running, already-logged-in browser over its remote-debugging port.
//!
//! ## Architecture
//!
//! ```text
//! DebugPort → Session → Navigator → Extractor → Segmenter → Cleaner → Store
//! ```
//!
//! - [`devtools`]: debug-port REST client and per-tab protocol sessions
//! - [`scraper`]: page loading and in-page extraction
//! - [`segmenter`]: splitting raw post text into chapter records
//! - [`crawler`]: parallel batches and "next chapter" chains
//! - [`store`]: chapter files on disk and the inventory of what exists
//!
//! ## Quick Start
//!
//! ```bash
//! # Start the browser with a debug port, log in, then:
//! chaptercrawl tabs
//!
//! # Scrape a few posts side by side
//! chaptercrawl parallel https://ko-fi.com/post/A https://ko-fi.com/post/B
//!
//! # Follow next-chapter links until chapter 120 is captured
//! chaptercrawl chain --url https://ko-fi.com/post/C --target 120
//!
//! # See what is already on disk
//! chaptercrawl status
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the
/// configuration, the debug port and the chapter store.
pub mod app;

/// Configuration management.
///
/// Loads from `~/.config/chaptercrawl/config.toml`, one section per component.
pub mod config;

/// Command-line interface using clap.
///
/// - `parallel <url>...` - Scrape posts concurrently, one tab each
/// - `chain --url <url> (--count|--target|--auto)` - Follow next links
/// - `status` - Summarize captured chapters
/// - `tabs` - List the browser's tabs
pub mod cli;

/// Crawl orchestration: [`Crawler`](crawler::Crawler) in batch or chain mode.
pub mod crawler;

/// Browser remote-debugging plumbing.
///
/// - [`DebugPort`](devtools::DebugPort): Async trait over the `/json` endpoints
/// - [`DebugPortClient`](devtools::DebugPortClient): reqwest-based implementation
/// - [`Session`](devtools::Session): Request/response matching over one tab's websocket
pub mod devtools;

/// Core domain models.
///
/// - [`ExtractedPage`](domain::ExtractedPage): What the in-page script returns
/// - [`ChapterRecord`](domain::ChapterRecord): One numbered chapter
pub mod domain;

/// Loading a post and pulling its text out.
///
/// - [`PageScraper`](scraper::PageScraper): Navigate, extract and segment in one step
/// - [`ScraperConfig`](scraper::ScraperConfig): Timeouts and selectors
pub mod scraper;

/// Chapter splitting and boilerplate removal.
pub mod segmenter;

/// Chapter files.
///
/// - [`Store`](store::Store): Trait defining storage operations
/// - [`FileStore`](store::FileStore): `ch<N>.txt` files in one directory
pub mod store;
