//! Render output: the visible page and its labels

use crate::document::Book;
use crate::layout::PageRange;
use serde::{Deserialize, Serialize};

/// Everything a host needs to draw the current page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub index: usize,
    pub total: usize,
    /// Markup of the page, never split inside a tag
    pub html: String,
    /// Empty when the book has no chapter for this page
    pub chapter_title: String,
    pub progress_percent: f32,
    pub bookmarked: bool,
}

impl PageView {
    /// View of page `index`, or an empty view when the book has no pages
    pub fn new(book: &Book, pages: &[PageRange], index: usize, bookmarked: bool) -> Self {
        Self {
            index,
            total: pages.len(),
            html: page_html(&book.content, pages, index).to_string(),
            chapter_title: chapter_title(book, pages, index).to_string(),
            progress_percent: progress_percent(index, pages.len()),
            bookmarked,
        }
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.total
    }

    /// "current / total" label, 1-based
    pub fn page_label(&self) -> String {
        if self.total == 0 {
            return String::new();
        }
        format!("{} / {}", self.index + 1, self.total)
    }
}

/// Slice of `content` shown on page `index`
pub fn page_html<'a>(content: &'a str, pages: &[PageRange], index: usize) -> &'a str {
    pages
        .get(index)
        .and_then(|page| content.get(page.as_range()))
        .unwrap_or("")
}

/// Title of the chapter page `index` belongs to.
///
/// The page's chapter counter indexes the book's chapter list directly.
pub fn chapter_title<'a>(book: &'a Book, pages: &[PageRange], index: usize) -> &'a str {
    pages
        .get(index)
        .and_then(|page| book.chapter_title(page.chapter_index))
        .unwrap_or("")
}

/// Reading progress in percent: `current / (total - 1)`.
///
/// A single page counts as fully read; no pages as nothing read.
pub fn progress_percent(current: usize, total: usize) -> f32 {
    match total {
        0 => 0.0,
        1 => 100.0,
        _ => (current.min(total - 1) as f32 / (total - 1) as f32) * 100.0,
    }
}
