use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use chrono::{DateTime, Local};
use regex::Regex;
use serde::Serialize;
use tracing::warn;

use crate::app::Result;

/// Highest chapter number a file name may claim. Names beyond it are
/// ignored so that a stray `ch1_4000000000.txt` cannot blow up the scan.
pub const MAX_CHAPTER: u32 = 100_000;

static FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ch(\d+)(?:_(\d+))?\.txt$").expect("chapter file regex"));

/// One `ch<N>.txt` / `ch<N>_<M>.txt` file on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterFile {
    pub name: String,
    pub start: u32,
    pub end: u32,
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
}

/// What is already captured in the chapter directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventorySummary {
    pub files: Vec<ChapterFile>,
    pub chapters: BTreeSet<u32>,
    pub latest: u32,
    pub gaps: Vec<u32>,
}

impl InventorySummary {
    pub fn from_files(files: Vec<ChapterFile>) -> Self {
        let (files, ignored): (Vec<_>, Vec<_>) =
            files.into_iter().partition(|f| f.end <= MAX_CHAPTER);
        for file in &ignored {
            warn!(file = %file.name, max = MAX_CHAPTER, "ignoring chapter file beyond limit");
        }

        let chapters: BTreeSet<u32> = files.iter().flat_map(|f| f.start..=f.end).collect();
        let latest = chapters.last().copied().unwrap_or(0);
        let gaps = find_gaps(&chapters);

        Self {
            files,
            chapters,
            latest,
            gaps,
        }
    }

    pub fn total(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Parse `ch12.txt` or `ch12_15.txt` into an inclusive range
pub fn parse_file_name(name: &str) -> Option<(u32, u32)> {
    let caps = FILE_RE.captures(name)?;
    let start: u32 = caps.get(1)?.as_str().parse().ok()?;
    let end: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => start,
    };
    Some((start.min(end), start.max(end)))
}

/// Integers in `[min, max]` missing from `chapters`
pub fn find_gaps(chapters: &BTreeSet<u32>) -> Vec<u32> {
    let (Some(&min), Some(&max)) = (chapters.first(), chapters.last()) else {
        return Vec::new();
    };
    (min..=max).filter(|n| !chapters.contains(n)).collect()
}

/// Scan `dir` fresh; a missing directory is simply empty.
pub fn scan(dir: &Path) -> Result<InventorySummary> {
    if !dir.exists() {
        return Ok(InventorySummary::default());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some((start, end)) = parse_file_name(&name) else {
            continue;
        };

        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }

        files.push(ChapterFile {
            name,
            start,
            end,
            size: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Local>::from),
        });
    }
    files.sort_by(|a, b| (a.start, a.end, &a.name).cmp(&(b.start, b.end, &b.name)));

    Ok(InventorySummary::from_files(files))
}

/// Rough number of posts to crawl to reach `target`.
///
/// `None` when the target is already captured. `chapters_per_post` is an
/// observed average, not a guarantee.
pub fn estimate_posts(target: u32, latest: u32, chapters_per_post: f64) -> Option<usize> {
    if target <= latest {
        return None;
    }
    let per_post = if chapters_per_post > 0.0 {
        chapters_per_post
    } else {
        1.0
    };
    let needed = f64::from(target - latest);
    Some(((needed / per_post).floor() as usize).max(1))
}
