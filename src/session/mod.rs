//! Reader session: one open book, its pages and the reader's place in it
//!
//! A session owns everything that used to be process-wide: the pagination
//! cache, the reader state and the observer list. Several sessions can live
//! side by side; each is confined to the thread that created it.

mod observer;
mod state;

pub use observer::{Observers, Subscription};
pub use state::ReaderState;

use crate::document::Book;
use crate::interaction::{self, Zone};
use crate::layout::{
    clamp_font_size, clamp_line_height, find_page_containing_offset, DisplayConfig, Measure,
    PageRange, Paginator,
};
use crate::render::{self, PageView};
use crate::storage::{self, ReaderSettings, ReaderStore, ReadingProgress};
use std::sync::Arc;

/// Outcome of a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Moved { from: usize, to: usize },
    /// Already on the requested page
    Unchanged,
    /// The request was outside `[0, total)`; nothing changed
    OutOfRange { requested: usize, total: usize },
}

impl Navigation {
    pub fn moved(&self) -> bool {
        matches!(self, Navigation::Moved { .. })
    }
}

pub struct ReaderSession {
    book: Book,
    state: ReaderState,
    paginator: Paginator,
    pages: Arc<[PageRange]>,
    measure: Box<dyn Measure>,
    store: Box<dyn ReaderStore>,
    observers: Observers,
}

impl ReaderSession {
    /// Open `book` in a container of `width` x `height` pixels.
    ///
    /// Settings, bookmarks and progress come from `store`; unreadable
    /// documents fall back to defaults. The restored page is clamped into
    /// the new pagination.
    pub fn open<S, M>(book: Book, store: S, measure: M, width: f32, height: f32) -> Self
    where
        S: ReaderStore + 'static,
        M: Measure + 'static,
    {
        let settings = storage::load_settings(&store).unwrap_or_else(|err| {
            log::warn!("failed to load reader settings: {err}");
            ReaderSettings::default()
        });
        let bookmarks = storage::load_bookmarks(&store, &book.id).unwrap_or_else(|err| {
            log::warn!("failed to load bookmarks for {}: {err}", book.id);
            Vec::new()
        });
        let progress = storage::load_progress(&store, &book.id).unwrap_or_else(|err| {
            log::warn!("failed to load progress for {}: {err}", book.id);
            None
        });

        let config = DisplayConfig::new(width, height)
            .with_font_size(settings.font_size)
            .with_line_height(settings.line_height);

        let state = ReaderState {
            book_id: book.id.clone(),
            book_title: book.title.clone(),
            content: Arc::clone(&book.content),
            current_page: 0,
            total_pages: 0,
            config,
            bookmarks,
            chapters: book.chapters.clone(),
            toolbar_visible: false,
        };

        let mut session = Self {
            book,
            state,
            paginator: Paginator::new(),
            pages: Arc::from(Vec::new()),
            measure: Box::new(measure),
            store: Box::new(store),
            observers: Observers::new(),
        };

        session.repaginate();
        let restored = progress.map_or(0, |p| p.current_page);
        session.state.current_page = restored.min(session.last_page());
        log::debug!(
            "opened {} at page {} of {}",
            session.state.book_id,
            session.state.current_page,
            session.state.total_pages
        );
        session.notify();
        session
    }

    pub fn state(&self) -> &ReaderState {
        &self.state
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn pages(&self) -> &[PageRange] {
        &self.pages
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.state.config
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    /// Go to `page`. Out-of-range requests change nothing.
    pub fn navigate(&mut self, page: usize) -> Navigation {
        let total = self.state.total_pages;
        if page >= total {
            return Navigation::OutOfRange {
                requested: page,
                total,
            };
        }
        let from = self.state.current_page;
        if page == from {
            return Navigation::Unchanged;
        }

        self.state.current_page = page;
        self.save_progress();
        self.notify();
        Navigation::Moved { from, to: page }
    }

    pub fn next_page(&mut self) -> Navigation {
        if self.state.is_last_page() {
            return Navigation::Unchanged;
        }
        self.navigate(self.state.current_page + 1)
    }

    pub fn previous_page(&mut self) -> Navigation {
        if self.state.is_first_page() {
            return Navigation::Unchanged;
        }
        self.navigate(self.state.current_page - 1)
    }

    /// First page carrying chapter counter `chapter_index`, else page 0
    pub fn jump_to_chapter(&mut self, chapter_index: usize) -> Navigation {
        let target = self
            .pages
            .iter()
            .position(|page| page.chapter_index == chapter_index)
            .unwrap_or(0);
        self.navigate(target)
    }

    /// Progress-bar jump; `ratio` is clamped to `[0, 1]`
    pub fn navigate_to_ratio(&mut self, ratio: f32) -> Navigation {
        let total = self.state.total_pages;
        self.navigate(interaction::ratio_to_page(ratio, total))
    }

    /// Adjust the font size by `delta` mm. Returns false when the clamped
    /// size is unchanged or `delta` is not finite.
    pub fn change_font_size(&mut self, delta: f32) -> bool {
        if !delta.is_finite() {
            log::warn!("ignoring font size delta {delta}");
            return false;
        }
        let font_size = clamp_font_size(self.state.config.font_size_mm + delta);
        if font_size == self.state.config.font_size_mm {
            return false;
        }
        self.state.config = self.state.config.with_font_size(font_size);
        self.save_settings();
        self.reflow();
        true
    }

    /// Adjust the line height by `delta`. Returns false when the clamped
    /// value is unchanged or `delta` is not finite.
    pub fn change_line_height(&mut self, delta: f32) -> bool {
        if !delta.is_finite() {
            log::warn!("ignoring line height delta {delta}");
            return false;
        }
        let line_height = clamp_line_height(self.state.config.line_height + delta);
        if line_height == self.state.config.line_height {
            return false;
        }
        self.state.config = self.state.config.with_line_height(line_height);
        self.save_settings();
        self.reflow();
        true
    }

    /// New container size in pixels
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        let config = self.state.config.with_container(width, height);
        if config == self.state.config {
            return false;
        }
        self.state.config = config;
        self.reflow();
        true
    }

    /// Add or remove a bookmark on `page`.
    ///
    /// Returns whether the page is now bookmarked, or `None` when `page` does
    /// not exist.
    pub fn toggle_bookmark(&mut self, page: usize) -> Option<bool> {
        if page >= self.state.total_pages {
            return None;
        }
        let bookmarked = self.state.toggle_bookmark(page);
        if let Err(err) = storage::save_bookmarks(self.store.as_mut(), &self.state.book_id, &self.state.bookmarks) {
            log::warn!("failed to save bookmarks: {err}");
        }
        self.notify();
        Some(bookmarked)
    }

    pub fn toggle_current_bookmark(&mut self) -> Option<bool> {
        self.toggle_bookmark(self.state.current_page)
    }

    pub fn has_bookmark(&self, page: usize) -> bool {
        self.state.has_bookmark(page)
    }

    pub fn show_toolbar(&mut self) {
        self.set_toolbar(true);
    }

    pub fn hide_toolbar(&mut self) {
        self.set_toolbar(false);
    }

    pub fn toggle_toolbar(&mut self) {
        self.set_toolbar(!self.state.toolbar_visible);
    }

    fn set_toolbar(&mut self, visible: bool) {
        if self.state.toolbar_visible != visible {
            self.state.toolbar_visible = visible;
            self.notify();
        }
    }

    /// Act on a tap given as percentages of the reading surface
    pub fn handle_tap(&mut self, percent_x: f32, percent_y: f32) -> Zone {
        let zone = interaction::zone_for(percent_x, percent_y);
        match zone {
            Zone::Top | Zone::Bottom => self.toggle_toolbar(),
            Zone::Left => {
                self.previous_page();
            }
            Zone::Right => {
                self.next_page();
            }
        }
        zone
    }

    pub fn current_view(&self) -> PageView {
        let index = self.state.current_page;
        PageView::new(&self.book, &self.pages, index, self.has_bookmark(index))
    }

    /// Title of the chapter `page` belongs to, or an empty string
    pub fn chapter_title(&self, page: usize) -> &str {
        render::chapter_title(&self.book, &self.pages, page)
    }

    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&ReaderState) + 'static,
    {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.observers.unsubscribe(subscription)
    }

    /// Shared handle to the observer list
    pub fn observers(&self) -> Observers {
        self.observers.clone()
    }

    /// Flush progress, drop the cache and observers, and hand back the final
    /// state
    pub fn close(mut self) -> ReaderState {
        self.save_progress();
        self.paginator.clear_cache();
        self.observers.clear();
        log::debug!("closed {} at page {}", self.state.book_id, self.state.current_page);
        self.state
    }

    fn last_page(&self) -> usize {
        self.state.total_pages.saturating_sub(1)
    }

    fn repaginate(&mut self) {
        self.pages = self
            .paginator
            .paginate_shared(&self.book.content, &self.state.config, self.measure.as_mut());
        self.state.total_pages = self.pages.len();
    }

    /// Paginate again under the current config, keeping the start of the
    /// current page on screen
    fn reflow(&mut self) {
        let anchor = self
            .pages
            .get(self.state.current_page)
            .map_or(0, |page| page.start_index);
        self.paginator.clear_cache();
        self.repaginate();
        self.state.current_page = find_page_containing_offset(&self.pages, anchor);
        log::debug!(
            "reflowed to {} pages; offset {anchor} is on page {}",
            self.state.total_pages,
            self.state.current_page
        );
        self.save_progress();
        self.notify();
    }

    fn save_progress(&mut self) {
        let progress = ReadingProgress::now(self.state.current_page);
        if let Err(err) = storage::save_progress(self.store.as_mut(), &self.state.book_id, progress) {
            log::warn!("failed to save reading progress: {err}");
        }
    }

    fn save_settings(&mut self) {
        if let Err(err) = storage::save_settings(self.store.as_mut(), self.state.settings()) {
            log::warn!("failed to save reader settings: {err}");
        }
    }

    fn notify(&self) {
        self.observers.notify(&self.state);
    }
}
