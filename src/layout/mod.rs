//! Measurement-driven pagination

pub mod break_point;
pub mod config;
mod engine;
pub mod font;
mod line_break;
pub mod measure;
mod pagination;
pub mod tag;

pub use break_point::{BreakPointSelector, BreakTier, DEFAULT_WINDOW_CHARS, FORCED_ADVANCE_CHARS};
pub use config::{clamp_font_size, clamp_line_height, DisplayConfig};
pub use engine::{PageSplitter, Paginator};
pub use font::FontMetrics;
pub use line_break::LineBreaker;
pub use measure::{Measure, MeasureError, TextMetricsMeasurer};
pub use pagination::{find_page_containing_offset, CacheKey, PageRange, PaginationCache};
