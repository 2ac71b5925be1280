//! Shelf reader: paginated e-book reading core
//!
//! This crate provides the reading engine behind an e-book shelf:
//! - Measurement-driven pagination that never splits a markup tag and
//!   prefers paragraph, sentence and clause boundaries
//! - A single-entry pagination cache keyed by content and display settings
//! - Position-preserving re-flow when font size, line height or the
//!   container change
//! - A reader session with bookmarks, persisted progress and observers

pub mod document;
pub mod interaction;
pub mod layout;
pub mod render;
pub mod session;
pub mod storage;
pub mod wasm;

// Re-export WASM types for direct use
pub use wasm::WasmReader;

// Re-export primary types
pub use document::{Book, Chapter, ParsedTextItem};
pub use interaction::{ClickGate, Zone};
pub use layout::{
    find_page_containing_offset, BreakPointSelector, DisplayConfig, Measure, MeasureError,
    PageRange, PageSplitter, Paginator, TextMetricsMeasurer,
};
pub use render::PageView;
pub use session::{Navigation, Observers, ReaderSession, ReaderState, Subscription};
pub use storage::{MemoryStore, ReaderSettings, ReaderStore, ReadingProgress, StoreError};

/// Screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Screen rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Position of `point` as percentages of this rectangle's size.
    ///
    /// A zero dimension is treated as one pixel.
    pub fn percent_of(&self, point: Point) -> (f32, f32) {
        let width = if self.width > 0.0 { self.width } else { 1.0 };
        let height = if self.height > 0.0 { self.height } else { 1.0 };
        (
            (point.x - self.x) / width * 100.0,
            (point.y - self.y) / height * 100.0,
        )
    }
}

/// Paginate `content` once, without a session or cache reuse
pub fn paginate<M>(content: &str, config: &DisplayConfig, measure: &mut M) -> Vec<PageRange>
where
    M: Measure + ?Sized,
{
    Paginator::new().paginate(content, config, measure).to_vec()
}
