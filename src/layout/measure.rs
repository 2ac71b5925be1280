//! Measurement providers
//!
//! The paginator only needs one primitive from its environment: the pixel
//! height a markup fragment occupies under a fixed [`DisplayConfig`]. In a
//! browser that is an off-screen node; [`TextMetricsMeasurer`] computes it
//! without any rendering stack.
//!
//! Measurement sits on the hot path: every binary-search probe calls it, so
//! pagination costs `pages * log(content length) * measurement cost`.

use crate::document::split_blocks;
use crate::layout::config::DisplayConfig;
use crate::layout::font::FontMetrics;
use crate::layout::line_break::LineBreaker;
use thiserror::Error;

/// Failure of a measurement provider
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeasureError {
    /// The provider could not measure (missing, threw, detached)
    #[error("measurement provider unavailable: {0}")]
    Unavailable(String),
    /// The provider returned NaN or an infinite height
    #[error("measurement returned a non-finite height: {0}")]
    NonFinite(f32),
}

/// Rendered height of a markup fragment
pub trait Measure {
    /// Height in pixels `html` occupies when laid out with `config`
    fn measure(&mut self, html: &str, config: &DisplayConfig) -> Result<f32, MeasureError>;
}

/// Plain closures measure under whatever configuration they captured
impl<F> Measure for F
where
    F: FnMut(&str) -> f32,
{
    fn measure(&mut self, html: &str, _config: &DisplayConfig) -> Result<f32, MeasureError> {
        let height = self(html);
        if height.is_finite() {
            Ok(height)
        } else {
            Err(MeasureError::NonFinite(height))
        }
    }
}

/// Measures markup with font metrics and line breaking instead of a
/// rendering engine
#[derive(Debug, Clone, Default)]
pub struct TextMetricsMeasurer {
    metrics: FontMetrics,
    breaker: LineBreaker,
    calls: u64,
}

impl TextMetricsMeasurer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metrics(metrics: FontMetrics) -> Self {
        Self {
            metrics,
            ..Self::default()
        }
    }

    /// Number of measurements taken so far
    pub fn calls(&self) -> u64 {
        self.calls
    }
}

impl Measure for TextMetricsMeasurer {
    fn measure(&mut self, html: &str, config: &DisplayConfig) -> Result<f32, MeasureError> {
        self.calls += 1;

        let font_px = config.font_size_px();
        if !(font_px.is_finite() && font_px > 0.0) {
            return Err(MeasureError::Unavailable(format!(
                "font size {}mm cannot be laid out",
                config.font_size_mm
            )));
        }

        let width = config.content_width();
        let line_px = config.line_height_px();
        let height = split_blocks(html)
            .iter()
            .map(|block| {
                let scale = block.kind.line_height_multiplier();
                let lines = self
                    .breaker
                    .count_lines(&block.text, width, font_px * scale, &self.metrics);
                lines as f32 * line_px * scale
            })
            .sum();

        Ok(height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DisplayConfig {
        DisplayConfig {
            font_size_mm: 4.0,
            line_height: 1.5,
            container_width: 400.0,
            container_height: 600.0,
            padding_mm: 0.0,
        }
    }

    #[test]
    fn test_closure_measure() {
        let mut measure = |html: &str| html.len() as f32;
        assert_eq!(measure.measure("abcd", &config()), Ok(4.0));
    }

    #[test]
    fn test_closure_non_finite() {
        let mut measure = |_: &str| f32::NAN;
        assert!(matches!(
            measure.measure("x", &config()),
            Err(MeasureError::NonFinite(_))
        ));
        let mut infinite = |_: &str| f32::INFINITY;
        assert_eq!(
            infinite.measure("x", &config()),
            Err(MeasureError::NonFinite(f32::INFINITY))
        );
    }

    #[test]
    fn test_metrics_one_line_per_paragraph() {
        let mut measurer = TextMetricsMeasurer::new();
        let config = config();
        let one = measurer.measure("<p>short</p>", &config).unwrap();
        let two = measurer.measure("<p>short</p><p>again</p>", &config).unwrap();
        assert!((one - config.line_height_px()).abs() < 1e-3);
        assert!((two - 2.0 * config.line_height_px()).abs() < 1e-3);
        assert_eq!(measurer.calls(), 2);
    }

    #[test]
    fn test_metrics_grow_with_font_size() {
        let mut measurer = TextMetricsMeasurer::new();
        let text = "<p>".to_string() + &"word ".repeat(200) + "</p>";
        let small = measurer.measure(&text, &config()).unwrap();
        let large = measurer.measure(&text, &config().with_font_size(8.0)).unwrap();
        assert!(large > small);
    }

    #[test]
    fn test_metrics_empty_fragment() {
        let mut measurer = TextMetricsMeasurer::new();
        assert_eq!(measurer.measure("", &config()), Ok(0.0));
        assert_eq!(measurer.measure("<p></p>", &config()), Ok(0.0));
    }

    #[test]
    fn test_metrics_heading_taller() {
        let mut measurer = TextMetricsMeasurer::new();
        let heading = measurer.measure("<h1>Title</h1>", &config()).unwrap();
        let body = measurer.measure("<p>Title</p>", &config()).unwrap();
        assert!(heading > body);
    }

    #[test]
    fn test_metrics_rejects_zero_font() {
        let mut measurer = TextMetricsMeasurer::new();
        let config = DisplayConfig {
            font_size_mm: 0.0,
            ..config()
        };
        assert!(matches!(
            measurer.measure("<p>x</p>", &config),
            Err(MeasureError::Unavailable(_))
        ));
    }
}
