//! Line breaking for the text-metrics measurer

use crate::layout::font::FontMetrics;
use std::ops::Range;
use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

/// Greedy line breaker over Unicode break opportunities
#[derive(Debug, Default, Clone, Copy)]
pub struct LineBreaker;

impl LineBreaker {
    pub fn new() -> Self {
        Self
    }

    /// Split `text` into lines no wider than `max_width` pixels.
    ///
    /// Returned ranges are byte ranges into `text` and exclude the newline
    /// of a hard break. A segment wider than the line is split between
    /// grapheme clusters; every line holds at least one cluster.
    pub fn break_lines(
        &self,
        text: &str,
        max_width: f32,
        font_px: f32,
        metrics: &FontMetrics,
    ) -> Vec<Range<usize>> {
        let mut lines = Vec::new();
        if text.is_empty() {
            return lines;
        }

        let mut line_start = 0;
        let mut segment_start = 0;
        let mut x: f32 = 0.0;

        for (pos, opportunity) in linebreaks(text) {
            let segment = &text[segment_start..pos];
            let visible = self.width(segment.trim_end(), font_px, metrics);

            // Soft wrap before this segment
            if segment_start > line_start && x + visible > max_width {
                lines.push(line_start..segment_start);
                line_start = segment_start;
                x = 0.0;
            }

            if segment_start == line_start && visible > max_width {
                // Emergency break inside the segment
                for (offset, grapheme) in segment.grapheme_indices(true) {
                    let at = segment_start + offset;
                    let w = self.width(grapheme, font_px, metrics);
                    let blank = grapheme.chars().all(char::is_whitespace);
                    if at > line_start && !blank && x + w > max_width {
                        lines.push(line_start..at);
                        line_start = at;
                        x = 0.0;
                    }
                    x += w;
                }
            } else {
                x += self.width(segment, font_px, metrics);
            }

            segment_start = pos;

            if matches!(opportunity, BreakOpportunity::Mandatory) {
                let end = if text[..pos].ends_with('\n') { pos - 1 } else { pos };
                lines.push(line_start..end.max(line_start));
                line_start = pos;
                x = 0.0;
            }
        }

        if line_start < text.len() {
            lines.push(line_start..text.len());
        }

        lines
    }

    /// Number of lines `text` occupies
    pub fn count_lines(
        &self,
        text: &str,
        max_width: f32,
        font_px: f32,
        metrics: &FontMetrics,
    ) -> usize {
        self.break_lines(text, max_width, font_px, metrics).len()
    }

    /// Rendered width of `text` in pixels
    pub fn width(&self, text: &str, font_px: f32, metrics: &FontMetrics) -> f32 {
        text.chars().map(|c| metrics.width(c)).sum::<f32>() * font_px
    }
}
