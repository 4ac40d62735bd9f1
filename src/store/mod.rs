pub mod inventory;
pub mod persist;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app::Result;
use crate::domain::ChapterRecord;

pub use inventory::{estimate_posts, scan, ChapterFile, InventorySummary};

/// How captured chapters are split into files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// One `ch<N>.txt` per chapter
    PerChapter,
    /// One `ch<min>_<max>.txt` per run of consecutive chapters
    Range,
}

pub trait Store {
    /// Persist chapters, returning the files written
    fn save(&self, chapters: &[ChapterRecord], layout: Layout) -> Result<Vec<PathBuf>>;

    /// Fresh summary of what is stored
    fn inventory(&self) -> Result<InventorySummary>;
}

/// Chapter files in a single directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Store for FileStore {
    fn save(&self, chapters: &[ChapterRecord], layout: Layout) -> Result<Vec<PathBuf>> {
        if chapters.is_empty() {
            return Ok(Vec::new());
        }
        fs::create_dir_all(&self.dir)?;

        // Sorted by chapter number; a repeated number keeps the last copy.
        let mut by_number = BTreeMap::new();
        for chapter in chapters {
            by_number.insert(chapter.number, chapter.clone());
        }
        let unique: Vec<ChapterRecord> = by_number.into_values().collect();

        let mut written = Vec::new();
        match layout {
            Layout::PerChapter => {
                for chapter in &unique {
                    let single = std::slice::from_ref(chapter);
                    if let Some(path) = persist::write_file(&self.dir, single)? {
                        written.push(path);
                    }
                }
            }
            Layout::Range => {
                // A range file claims every number between its bounds.
                for run in contiguous_runs(&unique) {
                    if let Some(path) = persist::write_file(&self.dir, run)? {
                        written.push(path);
                    }
                }
            }
        }

        info!(
            files = written.len(),
            chapters = unique.len(),
            dir = %self.dir.display(),
            "saved chapters"
        );
        Ok(written)
    }

    fn inventory(&self) -> Result<InventorySummary> {
        scan(&self.dir)
    }
}

/// Split chapters sorted by number into runs of consecutive numbers
fn contiguous_runs(chapters: &[ChapterRecord]) -> impl Iterator<Item = &[ChapterRecord]> {
    chapters.chunk_by(|a, b| a.number.checked_add(1) == Some(b.number))
}
