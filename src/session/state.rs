//! Observable state of an open book

use crate::document::Chapter;
use crate::layout::DisplayConfig;
use crate::storage::ReaderSettings;
use serde::Serialize;
use std::sync::Arc;

/// Reader state broadcast to observers after every change
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderState {
    pub book_id: String,
    pub book_title: String,
    /// The book's content, shared with the session's `Book`
    #[serde(skip)]
    pub content: Arc<str>,
    pub current_page: usize,
    pub total_pages: usize,
    pub config: DisplayConfig,
    /// Bookmarked page indices, ascending and unique
    pub bookmarks: Vec<usize>,
    pub chapters: Vec<Chapter>,
    pub toolbar_visible: bool,
}

impl ReaderState {
    pub fn has_bookmark(&self, page: usize) -> bool {
        self.bookmarks.binary_search(&page).is_ok()
    }

    /// Add or remove a bookmark; returns whether `page` is now bookmarked
    pub(crate) fn toggle_bookmark(&mut self, page: usize) -> bool {
        match self.bookmarks.binary_search(&page) {
            Ok(index) => {
                self.bookmarks.remove(index);
                false
            }
            Err(index) => {
                self.bookmarks.insert(index, page);
                true
            }
        }
    }

    /// The persisted subset of the display configuration
    pub fn settings(&self) -> ReaderSettings {
        ReaderSettings {
            font_size: self.config.font_size_mm,
            line_height: self.config.line_height,
        }
    }

    pub fn is_first_page(&self) -> bool {
        self.current_page == 0
    }

    pub fn is_last_page(&self) -> bool {
        self.current_page + 1 >= self.total_pages
    }
}
