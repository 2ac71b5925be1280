//! Page ranges and the single-entry pagination cache

use crate::layout::config::DisplayConfig;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::sync::Arc;

/// A page: the half-open byte interval `[start_index, end_index)` of the
/// content, plus the chapter counter at that page.
///
/// For a fully paginated book ranges are contiguous, start at 0, end at the
/// content length, and are never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRange {
    pub start_index: usize,
    pub end_index: usize,
    pub chapter_index: usize,
}

impl PageRange {
    pub fn new(start_index: usize, end_index: usize, chapter_index: usize) -> Self {
        Self {
            start_index,
            end_index,
            chapter_index,
        }
    }

    /// One page covering content of `len` bytes
    pub fn whole(len: usize) -> Self {
        Self::new(0, len, 0)
    }

    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn contains_offset(&self, offset: usize) -> bool {
        self.start_index <= offset && offset < self.end_index
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start_index..self.end_index
    }
}

/// Index of the page whose range contains `offset`.
///
/// Offsets past the last page map to the last page; an empty page list
/// maps everything to 0. Used to keep the reader in place across a re-flow,
/// with the start offset of the page that was current before it.
pub fn find_page_containing_offset(pages: &[PageRange], offset: usize) -> usize {
    if pages.is_empty() {
        return 0;
    }
    let found = pages.binary_search_by(|page| {
        if page.end_index <= offset {
            Ordering::Less
        } else if page.start_index > offset {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    });
    match found {
        Ok(index) => index,
        Err(index) => index.min(pages.len() - 1),
    }
}

/// Cache key: content identity plus display configuration.
///
/// The hash only rejects mismatches quickly; a hash match still compares the
/// full content.
#[derive(Debug, Clone)]
pub struct CacheKey {
    content_hash: u64,
    content: Arc<str>,
    config: DisplayConfig,
}

impl CacheKey {
    pub fn new(content: &str, config: &DisplayConfig) -> Self {
        Self::shared(Arc::from(content), config)
    }

    /// Key holding a reference to already shared content
    pub fn shared(content: Arc<str>, config: &DisplayConfig) -> Self {
        Self {
            content_hash: hash_text(&content),
            content,
            config: *config,
        }
    }

    /// Whether this key was built from `content` and `config`
    pub fn matches(&self, content: &str, config: &DisplayConfig) -> bool {
        self.matches_hashed(content, hash_text(content), config)
    }

    fn matches_hashed(&self, content: &str, content_hash: u64, config: &DisplayConfig) -> bool {
        self.content_hash == content_hash
            && self.config == *config
            && self.content.len() == content.len()
            && &*self.content == content
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.matches_hashed(&other.content, other.content_hash, &other.config)
    }
}

/// Holds the pages of the most recent `(content, config)` pair only.
///
/// Any lookup with a different key discards the entry.
#[derive(Debug, Default)]
pub struct PaginationCache {
    entry: Option<(CacheKey, Arc<[PageRange]>)>,
    hits: u64,
    misses: u64,
}

impl PaginationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached pages for `content` under `config`, dropping a stale entry on
    /// mismatch
    pub fn lookup(&mut self, content: &str, config: &DisplayConfig) -> Option<Arc<[PageRange]>> {
        let hit = matches!(&self.entry, Some((cached, _)) if cached.matches(content, config));
        if hit {
            self.hits += 1;
            self.pages().cloned()
        } else {
            self.misses += 1;
            self.entry = None;
            None
        }
    }

    pub fn insert(&mut self, key: CacheKey, pages: Arc<[PageRange]>) {
        self.entry = Some((key, pages));
    }

    /// Pages of the current entry, whatever its key
    pub fn pages(&self) -> Option<&Arc<[PageRange]>> {
        self.entry.as_ref().map(|(_, pages)| pages)
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

/// Hash text content for change detection
fn hash_text(text: &str) -> u64 {
    let mut hasher = FxHasher::default();
    text.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages() -> Vec<PageRange> {
        vec![
            PageRange::new(0, 10, 0),
            PageRange::new(10, 25, 0),
            PageRange::new(25, 40, 1),
        ]
    }

    #[test]
    fn test_page_range() {
        let page = PageRange::new(10, 25, 0);
        assert_eq!(page.len(), 15);
        assert!(page.contains_offset(10));
        assert!(page.contains_offset(24));
        assert!(!page.contains_offset(25));
        assert_eq!(page.as_range(), 10..25);
        assert!(PageRange::whole(0).is_empty());
    }

    #[test]
    fn test_find_page_containing_offset() {
        let pages = pages();
        assert_eq!(find_page_containing_offset(&pages, 0), 0);
        assert_eq!(find_page_containing_offset(&pages, 9), 0);
        assert_eq!(find_page_containing_offset(&pages, 10), 1);
        assert_eq!(find_page_containing_offset(&pages, 39), 2);
    }

    #[test]
    fn test_find_page_past_end_is_last() {
        assert_eq!(find_page_containing_offset(&pages(), 40), 2);
        assert_eq!(find_page_containing_offset(&pages(), 1000), 2);
        assert_eq!(find_page_containing_offset(&[], 5), 0);
    }

    #[test]
    fn test_cache_hit_returns_same_allocation() {
        let config = DisplayConfig::default();
        let mut cache = PaginationCache::new();
        let key = CacheKey::new("content", &config);
        assert_eq!(key, CacheKey::new("content", &config));
        let stored: Arc<[PageRange]> = pages().into();
        cache.insert(key, Arc::clone(&stored));

        let hit = cache.lookup("content", &config).unwrap();
        assert!(Arc::ptr_eq(&hit, &stored));
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn test_cache_invalidated_by_config_change() {
        let config = DisplayConfig::default();
        let mut cache = PaginationCache::new();
        cache.insert(CacheKey::new("content", &config), pages().into());

        let bigger = config.with_font_size(6.0);
        assert!(cache.lookup("content", &bigger).is_none());
        assert!(cache.is_empty());
        // the stale entry is gone even for the old key
        assert!(cache.lookup("content", &config).is_none());
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn test_cache_invalidated_by_content_change() {
        let config = DisplayConfig::default();
        let mut cache = PaginationCache::new();
        cache.insert(CacheKey::new("content", &config), pages().into());
        assert!(cache.lookup("other", &config).is_none());
    }

    #[test]
    fn test_cache_compares_content_on_hash_match() {
        let config = DisplayConfig::default();
        let mut cache = PaginationCache::new();
        // same length and a forged matching hash, different text
        let forged = CacheKey {
            content_hash: hash_text("other!!"),
            ..CacheKey::new("content", &config)
        };
        assert!(!forged.matches("other!!", &config));
        assert_ne!(forged, CacheKey::new("other!!", &config));

        cache.insert(forged, pages().into());
        assert!(cache.lookup("other!!", &config).is_none());
        assert_eq!(cache.misses(), 1);
    }
}
