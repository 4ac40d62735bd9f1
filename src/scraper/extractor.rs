use serde_json::{json, Value};
use tracing::debug;

use crate::app::{Result, ScrapeError};
use crate::devtools::Session;
use crate::domain::ExtractedPage;
use crate::scraper::ScraperConfig;

/// In-page extraction function, evaluated as `(<script>)(<options>)`.
const EXTRACTION_SCRIPT: &str = include_str!("extract.js");

/// Pulls title, body text and the next-chapter link out of a loaded tab.
pub struct ContentExtractor {
    expression: String,
}

impl ContentExtractor {
    pub fn new(config: &ScraperConfig) -> Self {
        let options = json!({
            "titleSelectors": config.title_selectors,
            "hostSelector": config.host_selector,
            "bodySelector": config.body_selector,
            "nextLinkPhrases": config
                .next_link_phrases
                .iter()
                .map(|p| p.to_lowercase())
                .collect::<Vec<_>>(),
        });

        Self {
            expression: format!("({})({})", EXTRACTION_SCRIPT.trim(), options),
        }
    }

    /// The self-contained expression sent to `Runtime.evaluate`
    pub fn extraction_script(&self) -> &str {
        &self.expression
    }

    pub async fn extract(&self, session: &mut Session) -> Result<ExtractedPage> {
        let response = session
            .send(
                "Runtime.evaluate",
                json!({
                    "expression": self.expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                }),
            )
            .await?;

        let page = parse_evaluation(&response)?;
        debug!(
            url = %page.url,
            chars = page.content.len(),
            has_next = page.next_chapter_url.is_some(),
            "extracted page"
        );
        Ok(page)
    }
}

fn parse_evaluation(response: &Value) -> Result<ExtractedPage> {
    if let Some(details) = response.get("exceptionDetails") {
        return Err(ScrapeError::Extraction(describe_exception(details)));
    }

    let value = response
        .pointer("/result/value")
        .cloned()
        .ok_or_else(|| ScrapeError::Extraction("script returned no value".to_string()))?;

    // A script may hand back JSON.stringify(...) instead of an object.
    let value = match value {
        Value::String(text) => serde_json::from_str(&text)
            .map_err(|e| ScrapeError::Extraction(format!("script returned invalid JSON: {}", e)))?,
        other => other,
    };

    serde_json::from_value(value)
        .map_err(|e| ScrapeError::Extraction(format!("unexpected script result: {}", e)))
}

fn describe_exception(details: &Value) -> String {
    details
        .pointer("/exception/description")
        .and_then(Value::as_str)
        .or_else(|| details.get("text").and_then(Value::as_str))
        .unwrap_or("script threw")
        .to_string()
}
