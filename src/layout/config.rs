//! Display configuration for pagination

use serde::{Deserialize, Serialize};

/// CSS pixels per millimetre (96 dpi)
pub const PX_PER_MM: f32 = 96.0 / 25.4;

/// Default font size in millimetres
pub const DEFAULT_FONT_SIZE_MM: f32 = 4.0;

/// Default line height multiplier
pub const DEFAULT_LINE_HEIGHT: f32 = 1.6;

/// Default padding around the content box in millimetres
pub const DEFAULT_PADDING_MM: f32 = 5.0;

pub const MIN_FONT_SIZE_MM: f32 = 2.0;
pub const MAX_FONT_SIZE_MM: f32 = 10.0;
pub const MIN_LINE_HEIGHT: f32 = 1.0;
pub const MAX_LINE_HEIGHT: f32 = 3.0;

/// Rendering parameters that decide how much content fits on a page.
///
/// Two configs are equal iff every field is equal; the pagination cache keys
/// on that equality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayConfig {
    /// Font size in millimetres
    pub font_size_mm: f32,
    /// Unitless line height multiplier
    pub line_height: f32,
    /// Width of the rendering container in pixels
    pub container_width: f32,
    /// Height of the rendering container in pixels
    pub container_height: f32,
    /// Padding in millimetres
    pub padding_mm: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            font_size_mm: DEFAULT_FONT_SIZE_MM,
            line_height: DEFAULT_LINE_HEIGHT,
            container_width: 600.0,
            container_height: 800.0,
            padding_mm: DEFAULT_PADDING_MM,
        }
    }
}

impl DisplayConfig {
    /// Default typography for a container of the given pixel size
    pub fn new(container_width: f32, container_height: f32) -> Self {
        Self {
            container_width,
            container_height,
            ..Self::default()
        }
    }

    /// Same config with a clamped font size
    pub fn with_font_size(self, font_size_mm: f32) -> Self {
        Self {
            font_size_mm: clamp_font_size(font_size_mm),
            ..self
        }
    }

    /// Same config with a clamped, one-decimal line height
    pub fn with_line_height(self, line_height: f32) -> Self {
        Self {
            line_height: clamp_line_height(line_height),
            ..self
        }
    }

    /// Same config with a new container size
    pub fn with_container(self, width: f32, height: f32) -> Self {
        Self {
            container_width: width,
            container_height: height,
            ..self
        }
    }

    pub fn font_size_px(&self) -> f32 {
        self.font_size_mm * PX_PER_MM
    }

    /// Height of one line of body text in pixels
    pub fn line_height_px(&self) -> f32 {
        self.font_size_px() * self.line_height
    }

    pub fn padding_px(&self) -> f32 {
        self.padding_mm * PX_PER_MM
    }

    /// Width available to text once padding is removed
    pub fn content_width(&self) -> f32 {
        (self.container_width - 2.0 * self.padding_px()).max(0.0)
    }

    /// Whether the container can hold anything at all
    pub fn has_usable_height(&self) -> bool {
        self.container_height.is_finite() && self.container_height > 0.0
    }
}

/// Clamp a font size into `[2mm, 10mm]`; NaN becomes the default size
pub fn clamp_font_size(font_size_mm: f32) -> f32 {
    if font_size_mm.is_nan() {
        return DEFAULT_FONT_SIZE_MM;
    }
    font_size_mm.clamp(MIN_FONT_SIZE_MM, MAX_FONT_SIZE_MM)
}

/// Round a line height to one decimal and clamp it into `[1.0, 3.0]`;
/// NaN becomes the default line height
pub fn clamp_line_height(line_height: f32) -> f32 {
    if line_height.is_nan() {
        return DEFAULT_LINE_HEIGHT;
    }
    ((line_height * 10.0).round() / 10.0).clamp(MIN_LINE_HEIGHT, MAX_LINE_HEIGHT)
}
