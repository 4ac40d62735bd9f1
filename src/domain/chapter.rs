use serde::{Deserialize, Serialize};

/// One chapter cut out of a post, cleaned and ready to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRecord {
    pub number: u32,
    pub volume: u32,
    pub title: String,
    pub content: String,
}

impl ChapterRecord {
    /// Numbers and volumes start at 1; a parsed 0 is raised to 1.
    pub fn new(
        number: u32,
        volume: u32,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            number: number.max(1),
            volume: volume.max(1),
            title: title.into(),
            content: content.into(),
        }
    }

    /// Title shortened for progress output
    pub fn short_title(&self, max_chars: usize) -> String {
        if self.title.chars().count() <= max_chars {
            return self.title.clone();
        }
        let cut: String = self.title.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
