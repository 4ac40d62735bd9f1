use serde::{Deserialize, Serialize};

/// What the in-page script reports for one loaded post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedPage {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "nextChapterUrl", default)]
    pub next_chapter_url: Option<String>,
}

impl ExtractedPage {
    /// The next link, unless it is missing or blank, or points back at this
    /// post either as requested (`current`) or as reported after redirects.
    pub fn next_link_from(&self, current: &str) -> Option<&str> {
        let landed = self.url.trim();
        self.next_chapter_url
            .as_deref()
            .map(str::trim)
            .filter(|next| !next.is_empty() && *next != current && *next != landed)
    }
}
