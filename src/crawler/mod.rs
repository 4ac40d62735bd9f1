//! Crawl orchestration over browser tabs.
//!
//! Two modes share one [`PageScraper`]:
//!
//! - **parallel**: independent post URLs, split into batches of
//!   `parallel_tabs`; every URL gets its own tab and session, and a failure
//!   is recorded without disturbing its siblings.
//! - **chain**: start at one post and keep following its "next chapter"
//!   link in a single tab until the link runs out or a cap is reached.
//!
//! Batch futures are polled together on the calling task, so a batch is
//! concurrent but never multi-threaded, and the next batch starts only after
//! the previous one and its delay are done.

mod config;

pub use config::CrawlerConfig;

use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::app::Result;
use crate::devtools::{DebugPort, Session, Tab};
use crate::domain::ChapterRecord;
use crate::scraper::{PageScraper, ScraperConfig};

/// How far a chain-follow run may go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainLimit {
    /// Visit at most this many posts
    Posts(usize),
    /// Follow links until they run out, bounded by `max_posts`
    UntilExhausted,
}

impl ChainLimit {
    fn max_posts(self, cap: usize) -> usize {
        match self {
            ChainLimit::Posts(n) => n,
            ChainLimit::UntilExhausted => cap,
        }
    }
}

/// Why a run ended
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StopReason {
    /// Every batch was processed
    #[default]
    Completed,
    /// No next link, or it pointed back at the same post
    ChainExhausted,
    /// The post limit was hit with a next link still pending
    LimitReached,
    /// An error ended the run early; chapters gathered so far are kept
    Aborted(String),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Completed => write!(f, "all URLs processed"),
            StopReason::ChainExhausted => write!(f, "no further chapters"),
            StopReason::LimitReached => write!(f, "post limit reached"),
            StopReason::Aborted(reason) => write!(f, "aborted: {}", reason),
        }
    }
}

/// A URL that could not be scraped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlFailure {
    /// Position in the input list (parallel) or chain step (chain), from 0
    pub index: usize,
    pub url: String,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    pub chapters: Vec<ChapterRecord>,
    pub failures: Vec<UrlFailure>,
    pub posts_visited: usize,
    /// Where a chain stopped when it hit its limit, for resuming later
    pub next_url: Option<String>,
    pub stop: StopReason,
}

impl CrawlReport {
    pub fn is_aborted(&self) -> bool {
        matches!(self.stop, StopReason::Aborted(_))
    }
}

pub struct Crawler {
    port: Arc<dyn DebugPort>,
    scraper: PageScraper,
    config: CrawlerConfig,
}

impl Crawler {
    pub fn new(
        port: Arc<dyn DebugPort>,
        scraper_config: &ScraperConfig,
        config: CrawlerConfig,
    ) -> Result<Self> {
        Ok(Self {
            port,
            scraper: PageScraper::new(scraper_config)?,
            config,
        })
    }

    /// Scrape independent URLs, `parallel_tabs` at a time.
    ///
    /// Fails only if the debug port is unreachable up front; everything
    /// after that ends up in the report.
    pub async fn crawl_parallel(&self, urls: &[String]) -> Result<CrawlReport> {
        self.port.list_tabs().await?;

        let batch_size = self.config.parallel_tabs.max(1);
        let total_batches = urls.len().div_ceil(batch_size);
        let mut report = CrawlReport::default();

        for (batch_index, batch) in urls.chunks(batch_size).enumerate() {
            info!(
                batch = batch_index + 1,
                total = total_batches,
                urls = batch.len(),
                "scraping batch"
            );

            let offset = batch_index * batch_size;
            let outcomes = join_all(batch.iter().enumerate().map(|(i, url)| async move {
                (offset + i, url, self.scrape_in_new_tab(url).await)
            }))
            .await;

            let mut fatal = None;
            for (index, url, outcome) in outcomes {
                report.posts_visited += 1;
                match outcome {
                    Ok(chapters) => {
                        info!(%url, chapters = chapters.len(), "post scraped");
                        report.chapters.extend(chapters);
                    }
                    Err(e) => {
                        warn!(%url, error = %e, "post failed");
                        if e.is_fatal() && fatal.is_none() {
                            fatal = Some(e.to_string());
                        }
                        report.failures.push(UrlFailure {
                            index,
                            url: url.clone(),
                            error: e.to_string(),
                        });
                    }
                }
            }

            if let Some(reason) = fatal {
                report.stop = StopReason::Aborted(reason);
                return Ok(report);
            }

            if batch_index + 1 < total_batches {
                sleep(self.config.delay()).await;
            }
        }

        report.stop = StopReason::Completed;
        Ok(report)
    }

    /// Follow "next chapter" links from `start_url` in a single tab.
    ///
    /// Fails only if no tab can be obtained; errors during the chain end it
    /// with [`StopReason::Aborted`] and keep what was already gathered.
    pub async fn crawl_chain(&self, start_url: &str, limit: ChainLimit) -> Result<CrawlReport> {
        let max_posts = limit.max_posts(self.config.max_posts);
        let (tab, created) = self.pick_tab().await?;
        info!(tab = %tab.id, reused = !created, max_posts, "following chain");

        let mut session = match self.port.connect(&tab).await {
            Ok(session) => session,
            Err(e) => {
                if created {
                    self.close_tab(&tab).await;
                }
                return Err(e);
            }
        };

        let report = self.follow_chain(&mut session, start_url, max_posts).await;

        close_session(&mut session).await;
        if created {
            self.close_tab(&tab).await;
        }
        Ok(report)
    }

    async fn follow_chain(
        &self,
        session: &mut Session,
        start_url: &str,
        max_posts: usize,
    ) -> CrawlReport {
        let mut report = CrawlReport {
            stop: StopReason::LimitReached,
            ..Default::default()
        };
        let mut current = start_url.to_string();

        for step in 1..=max_posts {
            info!(step, max_posts, url = %current, "scraping post");

            let post = match self.scraper.scrape(session, &current).await {
                Ok(post) => post,
                Err(e) => {
                    warn!(url = %current, error = %e, "chain stopped");
                    report.failures.push(UrlFailure {
                        index: step - 1,
                        url: current.clone(),
                        error: e.to_string(),
                    });
                    report.stop = StopReason::Aborted(e.to_string());
                    return report;
                }
            };

            report.posts_visited += 1;
            for chapter in &post.chapters {
                info!(number = chapter.number, title = %chapter.short_title(40), "chapter");
            }
            report.chapters.extend(post.chapters);

            let Some(next) = post.page.next_link_from(&current) else {
                info!("no further chapters");
                report.stop = StopReason::ChainExhausted;
                return report;
            };

            if step == max_posts {
                report.next_url = Some(next.to_string());
                break;
            }

            current = next.to_string();
            sleep(self.config.delay()).await;
        }

        report
    }

    async fn scrape_in_new_tab(&self, url: &str) -> Result<Vec<ChapterRecord>> {
        let tab = self.port.new_tab("about:blank").await?;
        let outcome = self.scrape_in_tab(&tab, url).await;
        self.close_tab(&tab).await;
        outcome
    }

    async fn scrape_in_tab(&self, tab: &Tab, url: &str) -> Result<Vec<ChapterRecord>> {
        let mut session = self.port.connect(tab).await?;
        let outcome = self.scraper.scrape(&mut session, url).await;
        close_session(&mut session).await;
        outcome.map(|post| post.chapters)
    }

    /// An open page tab matching `tab_hint`, any page tab, or a fresh one.
    /// The flag is true when the tab was created here.
    async fn pick_tab(&self) -> Result<(Tab, bool)> {
        let mut pages: Vec<Tab> = self
            .port
            .list_tabs()
            .await?
            .into_iter()
            .filter(|t| t.is_page() && t.web_socket_debugger_url.is_some())
            .collect();

        let hint = self.config.tab_hint.as_str();
        if !hint.is_empty() {
            if let Some(pos) = pages.iter().position(|t| t.url.contains(hint)) {
                return Ok((pages.swap_remove(pos), false));
            }
        }
        if !pages.is_empty() {
            return Ok((pages.swap_remove(0), false));
        }

        Ok((self.port.new_tab("about:blank").await?, true))
    }

    async fn close_tab(&self, tab: &Tab) {
        if let Err(e) = self.port.close_tab(&tab.id).await {
            warn!(tab = %tab.id, error = %e, "failed to close tab");
        }
    }
}

async fn close_session(session: &mut Session) {
    if let Err(e) = session.close().await {
        warn!(tab = %session.tab_id(), error = %e, "failed to close session");
    }
}
