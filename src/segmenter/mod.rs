//! Splitting raw post text into chapter records.
//!
//! A post either bundles several chapters, each introduced by a marker line
//! such as `[Vol. 3] Chapter 41: The Gate`, or is a single chapter whose
//! number only appears in the post title.

mod cleaner;

pub use cleaner::{clean, TextCleaner};

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::ChapterRecord;

static VOLUME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Vol\.?\s*(\d+)").expect("volume regex"));

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[Vol\.\s*\d+\]\s*Chapter\s*(\d+):\s*([^\n]+)").expect("marker regex")
});

static TITLE_CHAPTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Chapter\s*(\d+)").expect("title chapter regex"));

#[derive(Debug, Clone, Default)]
pub struct ChapterSegmenter {
    cleaner: TextCleaner,
}

impl ChapterSegmenter {
    pub fn new(cleaner: TextCleaner) -> Self {
        Self { cleaner }
    }

    /// Cut `raw` into chapters; always returns at least one record.
    pub fn segment(&self, raw: &str, title: &str) -> Vec<ChapterRecord> {
        let volume = first_number(&VOLUME_RE, title).unwrap_or(1);
        let markers: Vec<Marker<'_>> = MARKER_RE
            .captures_iter(raw)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                Some(Marker {
                    start: whole.start(),
                    end: whole.end(),
                    number: caps.get(1).and_then(|m| m.as_str().parse().ok()).unwrap_or(1),
                    title: caps.get(2).map_or("", |m| m.as_str().trim()),
                })
            })
            .collect();

        if markers.is_empty() {
            let number = first_number(&TITLE_CHAPTER_RE, title).unwrap_or(1);
            return vec![ChapterRecord::new(
                number,
                volume,
                title.trim(),
                self.cleaner.clean(raw),
            )];
        }

        markers
            .iter()
            .enumerate()
            .map(|(i, marker)| {
                let end = markers.get(i + 1).map_or(raw.len(), |next| next.start);
                ChapterRecord::new(
                    marker.number,
                    volume,
                    marker.title,
                    self.cleaner.clean(&raw[marker.end..end]),
                )
            })
            .collect()
    }
}

struct Marker<'a> {
    start: usize,
    end: usize,
    number: u32,
    title: &'a str,
}

fn first_number(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}
