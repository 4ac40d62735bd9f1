use std::sync::LazyLock;

use regex::{RegexSet, RegexSetBuilder};

/// Site chrome that shows up as whole lines in extracted post text.
const SKIP_PATTERNS: &[&str] = &[
    r"^>> Next Chapter",
    r"^<< Previous Chapter",
    r"^Support me",
    r"^Buy me a coffee",
    r"^Ko-fi",
    r"^See all$",
    r"^Terms$",
    r"^Privacy$",
    r"^\d+ comments?$",
    r"^Share$",
    r"^Like$",
    r"^Your page$",
    r"^T$",
    r"^\d+ \w+ \d+$",
    r"^Explore$",
    r"^Notifications$",
    r"^\d{1,2}$",
];

const MIN_LINE_CHARS: usize = 3;

static BUILTIN: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSetBuilder::new(SKIP_PATTERNS)
        .case_insensitive(true)
        .build()
        .expect("built-in skip patterns are valid")
});

/// Line filter for raw post text.
///
/// Heuristic: a line is kept unless it is very short or matches one of the
/// skip patterns. Surviving lines are re-joined one paragraph per line.
#[derive(Debug, Clone, Default)]
pub struct TextCleaner {
    extra: Option<RegexSet>,
}

impl TextCleaner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add site-specific patterns to the built-in table
    pub fn with_extra_patterns(patterns: &[String]) -> Result<Self, regex::Error> {
        if patterns.is_empty() {
            return Ok(Self::default());
        }
        let extra = RegexSetBuilder::new(patterns)
            .case_insensitive(true)
            .build()?;
        Ok(Self { extra: Some(extra) })
    }

    pub fn is_boilerplate(&self, line: &str) -> bool {
        BUILTIN.is_match(line) || self.extra.as_ref().is_some_and(|set| set.is_match(line))
    }

    pub fn clean(&self, text: &str) -> String {
        text.lines()
            .map(str::trim)
            .filter(|line| line.chars().count() >= MIN_LINE_CHARS)
            .filter(|line| !self.is_boilerplate(line))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Clean with the built-in table only
pub fn clean(text: &str) -> String {
    TextCleaner::default().clean(text)
}
