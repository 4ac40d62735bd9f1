use std::fs;
use std::path::{Path, PathBuf};

use html_escape::encode_quoted_attribute;

use crate::app::Result;
use crate::domain::ChapterRecord;

/// `ch<N>.txt` for one chapter, `ch<min>_<max>.txt` for a range
pub fn file_name(chapters: &[ChapterRecord]) -> Option<String> {
    let min = chapters.iter().map(|c| c.number).min()?;
    let max = chapters.iter().map(|c| c.number).max()?;
    Some(if min == max {
        format!("ch{}.txt", min)
    } else {
        format!("ch{}_{}.txt", min, max)
    })
}

/// Serialize chapters into the tagged text format
pub fn render(chapters: &[ChapterRecord]) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<chapters>\n");
    for chapter in chapters {
        out.push_str(&format!(
            "  <chapter number=\"{}\" volume=\"{}\">\n",
            chapter.number, chapter.volume
        ));
        out.push_str(&format!(
            "    <title>{}</title>\n",
            encode_quoted_attribute(&chapter.title)
        ));
        out.push_str(&format!(
            "    <text>{}</text>\n",
            encode_quoted_attribute(&chapter.content)
        ));
        out.push_str("  </chapter>\n");
    }
    out.push_str("</chapters>");
    out
}

/// Write `chapters` into one file under `dir`, named after their range
pub fn write_file(dir: &Path, chapters: &[ChapterRecord]) -> Result<Option<PathBuf>> {
    let Some(name) = file_name(chapters) else {
        return Ok(None);
    };
    let path = dir.join(name);
    fs::write(&path, render(chapters))?;
    Ok(Some(path))
}
