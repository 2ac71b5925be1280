//! Mapping pointer input onto reader operations

use crate::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Taps above this percentage of the height hit the top band
pub const TOP_THRESHOLD: f32 = 15.0;
/// Taps below this percentage of the height hit the bottom band
pub const BOTTOM_THRESHOLD: f32 = 85.0;
/// Middle-band taps left of this percentage of the width go back
pub const LEFT_THRESHOLD: f32 = 50.0;

/// Minimum time between two accepted clicks, in milliseconds
pub const MIN_CLICK_INTERVAL_MS: u64 = 300;

/// Region of the reading surface a tap landed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    /// Toggles the toolbar
    Top,
    /// Toggles the toolbar
    Bottom,
    /// Previous page
    Left,
    /// Next page
    Right,
}

impl Zone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Top => "top",
            Zone::Bottom => "bottom",
            Zone::Left => "left",
            Zone::Right => "right",
        }
    }

    pub fn toggles_toolbar(&self) -> bool {
        matches!(self, Zone::Top | Zone::Bottom)
    }
}

/// Zone for a tap given as percentages of the surface size
pub fn zone_for(percent_x: f32, percent_y: f32) -> Zone {
    if percent_y < TOP_THRESHOLD {
        Zone::Top
    } else if percent_y > BOTTOM_THRESHOLD {
        Zone::Bottom
    } else if percent_x < LEFT_THRESHOLD {
        Zone::Left
    } else {
        Zone::Right
    }
}

/// Zone for a tap at `point` on `surface`, or `None` outside it
pub fn zone_at(point: Point, surface: Rect) -> Option<Zone> {
    if !surface.contains_point(point) {
        return None;
    }
    let (percent_x, percent_y) = surface.percent_of(point);
    Some(zone_for(percent_x, percent_y))
}

/// Fraction of a horizontal progress bar left of `x`, clamped to `[0, 1]`
pub fn bar_ratio(x: f32, bar: Rect) -> f32 {
    let width = if bar.width > 0.0 { bar.width } else { 1.0 };
    let ratio = (x - bar.x) / width;
    if ratio.is_nan() {
        return 0.0;
    }
    ratio.clamp(0.0, 1.0)
}

/// Page a progress-bar ratio points at: `floor(ratio * total)`, kept in range
pub fn ratio_to_page(ratio: f32, total_pages: usize) -> usize {
    if total_pages == 0 {
        return 0;
    }
    let ratio = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };
    let page = (ratio * total_pages as f32).floor() as usize;
    page.min(total_pages - 1)
}

/// Drops clicks arriving less than the minimum interval after the last
/// accepted one
#[derive(Debug, Clone, Copy)]
pub struct ClickGate {
    min_interval_ms: u64,
    last_accepted: Option<u64>,
}

impl Default for ClickGate {
    fn default() -> Self {
        Self::new(MIN_CLICK_INTERVAL_MS)
    }
}

impl ClickGate {
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval_ms,
            last_accepted: None,
        }
    }

    /// Whether a click at `now_ms` should be handled
    pub fn accept(&mut self, now_ms: u64) -> bool {
        if let Some(last) = self.last_accepted {
            if now_ms.saturating_sub(last) < self.min_interval_ms {
                return false;
            }
        }
        self.last_accepted = Some(now_ms);
        true
    }

    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}
