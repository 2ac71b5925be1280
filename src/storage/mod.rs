//! Persistence of reading progress, settings and bookmarks
//!
//! Everything is kept as JSON documents in a string key/value store, the way
//! browser local storage holds them:
//!
//! - `readingProgress`: book id → [`ReadingProgress`]
//! - `readerSettings`: one [`ReaderSettings`] shared by all books
//! - `bookmarks`: book id → sorted page indices

use crate::layout::config::{DEFAULT_FONT_SIZE_MM, DEFAULT_LINE_HEIGHT};
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

pub const PROGRESS_KEY: &str = "readingProgress";
pub const SETTINGS_KEY: &str = "readerSettings";
pub const BOOKMARKS_KEY: &str = "bookmarks";

/// Failure reading or writing a stored document
#[derive(Debug, Error)]
pub enum StoreError {
    /// A stored document is not the JSON we expect, or could not be encoded
    #[error("stored document is not valid: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The underlying store refused the operation
    #[error("storage backend failed: {0}")]
    Backend(String),
}

/// String key/value storage
pub trait ReaderStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

/// Where the reader left a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingProgress {
    pub current_page: usize,
    /// Milliseconds since the Unix epoch
    pub last_read_time: u64,
}

impl ReadingProgress {
    /// Progress at `current_page`, stamped now
    pub fn now(current_page: usize) -> Self {
        Self {
            current_page,
            last_read_time: current_timestamp(),
        }
    }
}

/// Display settings persisted across books
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderSettings {
    #[serde(default)]
    pub font_size: f32,
    #[serde(default)]
    pub line_height: f32,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE_MM,
            line_height: DEFAULT_LINE_HEIGHT,
        }
    }
}

impl ReaderSettings {
    /// Replace zero, negative or non-finite fields with the defaults
    pub fn or_defaults(self) -> Self {
        let defaults = Self::default();
        let usable = |value: f32| value.is_finite() && value > 0.0;
        Self {
            font_size: if usable(self.font_size) {
                self.font_size
            } else {
                defaults.font_size
            },
            line_height: if usable(self.line_height) {
                self.line_height
            } else {
                defaults.line_height
            },
        }
    }
}

/// In-memory store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<FxHashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// All entries as one JSON object, for handing to a host's own storage
    pub fn export_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(&*self.entries.borrow())?)
    }

    /// Merge entries from a JSON object produced by [`MemoryStore::export_json`]
    pub fn import_json(&self, json: &str) -> Result<usize, StoreError> {
        let imported: FxHashMap<String, String> = serde_json::from_str(json)?;
        let count = imported.len();
        self.entries.borrow_mut().extend(imported);
        Ok(count)
    }
}

impl ReaderStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }
}

pub fn load_progress<S>(store: &S, book_id: &str) -> Result<Option<ReadingProgress>, StoreError>
where
    S: ReaderStore + ?Sized,
{
    let mut all: FxHashMap<String, ReadingProgress> = read_document(store, PROGRESS_KEY)?;
    Ok(all.remove(book_id))
}

pub fn save_progress<S>(store: &mut S, book_id: &str, progress: ReadingProgress) -> Result<(), StoreError>
where
    S: ReaderStore + ?Sized,
{
    update_book_entry(store, PROGRESS_KEY, book_id, progress)
}

/// Stored settings, or the defaults when none were saved
pub fn load_settings<S>(store: &S) -> Result<ReaderSettings, StoreError>
where
    S: ReaderStore + ?Sized,
{
    match store.get(SETTINGS_KEY)? {
        Some(json) => Ok(serde_json::from_str::<ReaderSettings>(&json)?.or_defaults()),
        None => Ok(ReaderSettings::default()),
    }
}

pub fn save_settings<S>(store: &mut S, settings: ReaderSettings) -> Result<(), StoreError>
where
    S: ReaderStore + ?Sized,
{
    store.set(SETTINGS_KEY, serde_json::to_string(&settings)?)
}

/// Bookmarked pages of a book in ascending order
pub fn load_bookmarks<S>(store: &S, book_id: &str) -> Result<Vec<usize>, StoreError>
where
    S: ReaderStore + ?Sized,
{
    let mut all: FxHashMap<String, Vec<usize>> = read_document(store, BOOKMARKS_KEY)?;
    let mut pages = all.remove(book_id).unwrap_or_default();
    pages.sort_unstable();
    pages.dedup();
    Ok(pages)
}

pub fn save_bookmarks<S>(store: &mut S, book_id: &str, pages: &[usize]) -> Result<(), StoreError>
where
    S: ReaderStore + ?Sized,
{
    update_book_entry(store, BOOKMARKS_KEY, book_id, pages.to_vec())
}

/// A per-book map document; missing means empty
fn read_document<S, T>(store: &S, key: &str) -> Result<FxHashMap<String, T>, StoreError>
where
    S: ReaderStore + ?Sized,
    T: DeserializeOwned,
{
    match store.get(key)? {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(FxHashMap::default()),
    }
}

/// Replace one book's entry, keeping the other books'.
///
/// A corrupt document is replaced rather than blocking the write.
fn update_book_entry<S, T>(store: &mut S, key: &str, book_id: &str, value: T) -> Result<(), StoreError>
where
    S: ReaderStore + ?Sized,
    T: Serialize + DeserializeOwned,
{
    let mut all: FxHashMap<String, T> = match read_document(&*store, key) {
        Ok(all) => all,
        Err(StoreError::Serialize(err)) => {
            log::warn!("discarding unreadable {key} document: {err}");
            FxHashMap::default()
        }
        Err(err) => return Err(err),
    };
    all.insert(book_id.to_string(), value);
    store.set(key, serde_json::to_string(&all)?)
}

/// Current time in milliseconds since the Unix epoch
pub fn current_timestamp() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}
