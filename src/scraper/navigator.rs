use std::time::Duration;

use serde_json::{json, Value};
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::app::{Result, ScrapeError};
use crate::devtools::Session;
use crate::scraper::ScraperConfig;

const LOAD_EVENT: &str = "Page.loadEventFired";

/// Timing for one navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub settle: Duration,
}

impl From<&ScraperConfig> for NavigationOptions {
    fn from(config: &ScraperConfig) -> Self {
        Self {
            timeout: config.load_timeout(),
            poll_interval: config.poll_interval(),
            settle: config.settle(),
        }
    }
}

/// Navigate the session's tab to `url` and wait for the load event.
///
/// Returns `Ok(false)` when the load event does not arrive in time; the page
/// may still be usable, so callers go on to extract anyway.
pub async fn navigate_and_wait(
    session: &mut Session,
    url: &str,
    options: NavigationOptions,
) -> Result<bool> {
    // A load event left over from the previous page must not count.
    session.clear_events();
    session.send("Page.enable", json!({})).await?;

    let response = session.send("Page.navigate", json!({ "url": url })).await?;
    if let Some(error_text) = response.get("errorText").and_then(Value::as_str) {
        return Err(ScrapeError::Protocol(format!(
            "navigation to {} failed: {}",
            url, error_text
        )));
    }

    let deadline = Instant::now() + options.timeout;
    loop {
        let now = Instant::now();
        if now >= deadline {
            warn!(url, timeout = ?options.timeout, "page load timed out, extracting anyway");
            return Ok(false);
        }

        let wait = options.poll_interval.min(deadline - now);
        match session.next_event(wait).await? {
            Some(event) if event.method == LOAD_EVENT => {
                debug!(url, "page loaded");
                sleep(options.settle).await;
                return Ok(true);
            }
            Some(event) => debug!(method = %event.method, "ignoring event while loading"),
            None => {}
        }
    }
}
