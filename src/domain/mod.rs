pub mod chapter;
pub mod page;

pub use chapter::ChapterRecord;
pub use page::ExtractedPage;
