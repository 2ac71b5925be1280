//! Measurement-driven pagination with a single-entry cache

use crate::document::count_chapter_markers;
use crate::layout::break_point::{BreakPointSelector, FORCED_ADVANCE_CHARS};
use crate::layout::config::DisplayConfig;
use crate::layout::measure::{Measure, MeasureError};
use crate::layout::pagination::{CacheKey, PageRange, PaginationCache};
use crate::layout::tag;
use std::sync::Arc;

/// Splits content into pages and remembers the last result
#[derive(Debug, Default)]
pub struct Paginator {
    cache: PaginationCache,
    selector: BreakPointSelector,
}

impl Paginator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selector(selector: BreakPointSelector) -> Self {
        Self {
            cache: PaginationCache::new(),
            selector,
        }
    }

    /// Paginate `content` under `config`.
    ///
    /// An unchanged `(content, config)` returns the cached pages without
    /// measuring. Measurement failure never escapes: the whole content comes
    /// back as one page, and that degraded result is not cached.
    pub fn paginate<M>(
        &mut self,
        content: &str,
        config: &DisplayConfig,
        measure: &mut M,
    ) -> Arc<[PageRange]>
    where
        M: Measure + ?Sized,
    {
        self.paginate_keyed(content, config, measure, || CacheKey::new(content, config))
    }

    /// Like [`Paginator::paginate`], but the cache keeps a reference to
    /// `content` instead of its own copy
    pub fn paginate_shared<M>(
        &mut self,
        content: &Arc<str>,
        config: &DisplayConfig,
        measure: &mut M,
    ) -> Arc<[PageRange]>
    where
        M: Measure + ?Sized,
    {
        self.paginate_keyed(content, config, measure, || {
            CacheKey::shared(Arc::clone(content), config)
        })
    }

    fn paginate_keyed<M, K>(
        &mut self,
        content: &str,
        config: &DisplayConfig,
        measure: &mut M,
        key: K,
    ) -> Arc<[PageRange]>
    where
        M: Measure + ?Sized,
        K: FnOnce() -> CacheKey,
    {
        if let Some(pages) = self.cache.lookup(content, config) {
            return pages;
        }

        if content.is_empty() {
            let pages: Arc<[PageRange]> = Arc::from(Vec::new());
            self.cache.insert(key(), Arc::clone(&pages));
            return pages;
        }

        if !config.has_usable_height() {
            log::warn!(
                "container height {} is unusable; showing content as a single page",
                config.container_height
            );
            return Arc::from(vec![PageRange::whole(content.len())]);
        }

        match self.split(content, config, measure) {
            Ok(pages) => {
                let pages: Arc<[PageRange]> = pages.into();
                self.cache.insert(key(), Arc::clone(&pages));
                pages
            }
            Err(err) => {
                log::warn!("pagination degraded to a single page: {err}");
                Arc::from(vec![PageRange::whole(content.len())])
            }
        }
    }

    /// Run every page of a splitter to completion
    fn split<M>(
        &self,
        content: &str,
        config: &DisplayConfig,
        measure: &mut M,
    ) -> Result<Vec<PageRange>, MeasureError>
    where
        M: Measure + ?Sized,
    {
        let mut splitter = self.splitter(content, config, measure);
        let pages = splitter.by_ref().collect::<Result<Vec<_>, _>>()?;
        log::debug!(
            "paginated {} bytes into {} pages with {} measurements",
            content.len(),
            pages.len(),
            splitter.measurements()
        );
        Ok(pages)
    }

    /// Page-at-a-time pagination for hosts that yield between pages.
    ///
    /// Produces exactly the ranges [`Paginator::paginate`] would, but neither
    /// reads nor fills the cache.
    pub fn splitter<'a, M>(
        &self,
        content: &'a str,
        config: &DisplayConfig,
        measure: &'a mut M,
    ) -> PageSplitter<'a, M>
    where
        M: Measure + ?Sized,
    {
        PageSplitter::new(content, *config, measure, self.selector)
    }

    /// Pages of the most recent successful pagination
    pub fn cached_pages(&self) -> Option<Arc<[PageRange]>> {
        self.cache.pages().cloned()
    }

    pub fn cache(&self) -> &PaginationCache {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

/// Iterator committing one page per step
pub struct PageSplitter<'a, M: Measure + ?Sized> {
    content: &'a str,
    config: DisplayConfig,
    measure: &'a mut M,
    selector: BreakPointSelector,
    position: usize,
    chapter_index: usize,
    measurements: u64,
    failed: bool,
}

impl<'a, M: Measure + ?Sized> PageSplitter<'a, M> {
    pub fn new(
        content: &'a str,
        config: DisplayConfig,
        measure: &'a mut M,
        selector: BreakPointSelector,
    ) -> Self {
        Self {
            content,
            config,
            measure,
            selector,
            position: 0,
            chapter_index: 0,
            measurements: 0,
            failed: false,
        }
    }

    /// Offset where the next page starts
    pub fn position(&self) -> usize {
        self.position
    }

    /// Measurement calls made so far
    pub fn measurements(&self) -> u64 {
        self.measurements
    }

    fn next_page(&mut self) -> Result<PageRange, MeasureError> {
        let content = self.content;
        let start = self.position;
        let config = self.config;
        let selector = self.selector;
        let measure = &mut *self.measure;
        let measurements = &mut self.measurements;

        let mut fits = |fragment: &str| -> Result<bool, MeasureError> {
            *measurements += 1;
            let height = measure.measure(fragment, &config)?;
            if !height.is_finite() {
                return Err(MeasureError::NonFinite(height));
            }
            Ok(height <= config.container_height)
        };

        let mut end = search_end(content, start, &mut fits)?;
        if end <= start {
            end = tag::forced_advance(content, start, FORCED_ADVANCE_CHARS);
        }
        // The remainder fits as is; looking for a nicer cut would only split it
        if end < content.len() {
            end = selector.select(content, start, end, &mut fits)?;
        }

        self.chapter_index += count_chapter_markers(&content[start..end]);
        self.position = end;
        log::trace!("page {start}..{end} chapter {}", self.chapter_index);

        Ok(PageRange::new(start, end, self.chapter_index))
    }
}

impl<M: Measure + ?Sized> Iterator for PageSplitter<'_, M> {
    type Item = Result<PageRange, MeasureError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.position >= self.content.len() {
            return None;
        }
        let page = self.next_page();
        if page.is_err() {
            self.failed = true;
        }
        Some(page)
    }
}

/// Binary search for the furthest tag-safe end whose fragment fits.
///
/// The search runs over raw offsets; each probe is snapped to a tag
/// boundary before it is measured, so the loop stays logarithmic even when
/// snapping moves the probe backwards.
fn search_end<F>(content: &str, start: usize, fits: &mut F) -> Result<usize, MeasureError>
where
    F: FnMut(&str) -> Result<bool, MeasureError>,
{
    let mut low = start;
    let mut high = content.len();
    let mut best = start;

    while low <= high {
        let mid = low + (high - low) / 2;
        let probe = tag::tag_safe(content, mid);

        if probe <= start || fits(&content[start..probe])? {
            best = best.max(probe);
            low = mid + 1;
        } else {
            // mid > start here, so this cannot underflow
            high = mid - 1;
        }
    }

    Ok(best)
}
