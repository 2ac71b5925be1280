//! Break-point selection
//!
//! Given a candidate page end, look back for a nicer place to cut: the end
//! of a paragraph, then a sentence, then a clause, then any whitespace. The
//! cut is re-validated against the height budget from the real page start.

use crate::layout::measure::MeasureError;
use crate::layout::tag;

/// Characters searched back from the candidate end
pub const DEFAULT_WINDOW_CHARS: usize = 500;

/// Characters a stalled page is forced forward by
pub const FORCED_ADVANCE_CHARS: usize = 1000;

/// Break patterns in descending priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BreakTier {
    /// Closing `</p>`
    Paragraph,
    /// `。！？；` or Latin `.`/`!`/`?` followed by whitespace
    Sentence,
    /// `，` or Latin `,` followed by whitespace
    Clause,
    /// Any whitespace
    Whitespace,
}

impl BreakTier {
    pub const ALL: [BreakTier; 4] = [
        BreakTier::Paragraph,
        BreakTier::Sentence,
        BreakTier::Clause,
        BreakTier::Whitespace,
    ];

    /// End of the pattern match starting at `pos`, if one starts there
    fn match_at(self, content: &str, pos: usize) -> Option<usize> {
        let rest = &content[pos..];
        let mut chars = rest.chars();
        let first = chars.next()?;
        let followed_by_space = || {
            chars
                .clone()
                .next()
                .filter(|c| c.is_whitespace())
                .map(|c| pos + first.len_utf8() + c.len_utf8())
        };
        match self {
            BreakTier::Paragraph => {
                let bytes = rest.as_bytes();
                (bytes.len() >= 4 && bytes[..4].eq_ignore_ascii_case(b"</p>")).then_some(pos + 4)
            }
            BreakTier::Sentence => match first {
                '。' | '！' | '？' | '；' => Some(pos + first.len_utf8()),
                '.' | '!' | '?' => followed_by_space(),
                _ => None,
            },
            BreakTier::Clause => match first {
                '，' => Some(pos + first.len_utf8()),
                ',' => followed_by_space(),
                _ => None,
            },
            BreakTier::Whitespace => first
                .is_whitespace()
                .then_some(pos + first.len_utf8()),
        }
    }
}

/// Chooses page boundaries that never split a tag and prefer semantic
/// boundaries
#[derive(Debug, Clone, Copy)]
pub struct BreakPointSelector {
    window_chars: usize,
    forced_advance_chars: usize,
}

impl Default for BreakPointSelector {
    fn default() -> Self {
        Self {
            window_chars: DEFAULT_WINDOW_CHARS,
            forced_advance_chars: FORCED_ADVANCE_CHARS,
        }
    }
}

impl BreakPointSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selector searching `window_chars` back from the candidate
    pub fn with_window(window_chars: usize) -> Self {
        Self {
            window_chars,
            ..Self::default()
        }
    }

    pub fn window_chars(&self) -> usize {
        self.window_chars
    }

    /// Pick the page end for a page starting at `range_start`.
    ///
    /// `fits` reports whether a fragment stays within the height budget.
    /// For `range_start < content.len()` the result is always
    /// `> range_start`, so pagination keeps moving forward.
    pub fn select<F>(
        &self,
        content: &str,
        range_start: usize,
        candidate_end: usize,
        fits: &mut F,
    ) -> Result<usize, MeasureError>
    where
        F: FnMut(&str) -> Result<bool, MeasureError>,
    {
        let candidate = tag::tag_safe(content, candidate_end.min(content.len()));
        let window_start = tag::retreat_chars(content, candidate, self.window_chars).max(range_start);

        if candidate > window_start {
            for tier in BreakTier::ALL {
                let Some(cut) = last_break(content, window_start, candidate, tier) else {
                    continue;
                };
                if cut <= range_start {
                    continue;
                }
                if fits(&content[range_start..cut])? {
                    log::trace!("break at {cut} ({tier:?}) for page starting at {range_start}");
                    return Ok(cut);
                }
            }
        }

        if candidate > range_start {
            return Ok(candidate);
        }
        Ok(tag::forced_advance(content, range_start, self.forced_advance_chars))
    }
}

/// End of the last `tier` match starting in `[window_start, window_end)`
/// that does not sit inside a tag
fn last_break(content: &str, window_start: usize, window_end: usize, tier: BreakTier) -> Option<usize> {
    content[window_start..window_end]
        .char_indices()
        .rev()
        .filter_map(|(offset, _)| {
            let pos = window_start + offset;
            tier.match_at(content, pos).map(|end| (pos, end))
        })
        .find(|&(pos, end)| !tag::is_inside_tag(content, pos) && !tag::is_inside_tag(content, end))
        .map(|(_, end)| end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always_fits(_: &str) -> Result<bool, MeasureError> {
        Ok(true)
    }

    fn never_fits(_: &str) -> Result<bool, MeasureError> {
        Ok(false)
    }

    #[test]
    fn test_prefers_paragraph_end() {
        let content = "<p>One. Two, three</p><p>Four five six";
        let end = BreakPointSelector::new()
            .select(content, 0, content.len(), &mut always_fits)
            .unwrap();
        assert_eq!(&content[..end], "<p>One. Two, three</p>");
    }

    #[test]
    fn test_sentence_before_clause() {
        let content = "One. Two, three four";
        let end = BreakPointSelector::new()
            .select(content, 0, content.len(), &mut always_fits)
            .unwrap();
        assert_eq!(&content[..end], "One. ");
    }

    #[test]
    fn test_cjk_sentence_and_clause() {
        let content = "第一句。第二句，第三";
        let end = BreakPointSelector::new()
            .select(content, 0, content.len(), &mut always_fits)
            .unwrap();
        assert_eq!(&content[..end], "第一句。");

        let clause = "第一句，第二句";
        let end = BreakPointSelector::new()
            .select(clause, 0, clause.len(), &mut always_fits)
            .unwrap();
        assert_eq!(&clause[..end], "第一句，");
    }

    #[test]
    fn test_falls_through_to_lower_tier_when_too_tall() {
        let content = "<p>aaaa bbbb</p>cc dd";
        let mut fits = |fragment: &str| Ok::<_, MeasureError>(fragment.len() <= 18);
        let end = BreakPointSelector::new()
            .select(content, 0, content.len(), &mut fits)
            .unwrap();
        // "</p>" cut is 16 bytes and fits
        assert_eq!(end, 16);

        let mut tight = |fragment: &str| Ok::<_, MeasureError>(fragment.len() <= 12);
        let end = BreakPointSelector::new()
            .select(content, 0, content.len(), &mut tight)
            .unwrap();
        // only the last whitespace is tried: "<p>aaaa bbbb</p>cc " is too long
        assert_eq!(end, content.len());
    }

    #[test]
    fn test_whitespace_inside_tag_ignored() {
        let content = "abc<span class=\"a b\">def";
        let end = BreakPointSelector::new()
            .select(content, 0, content.len(), &mut always_fits)
            .unwrap();
        assert_eq!(end, content.len());
    }

    #[test]
    fn test_candidate_inside_tag_snaps() {
        let content = "<p>AAAA</p><p>BBBB</p>";
        let end = BreakPointSelector::new()
            .select(content, 0, 8, &mut never_fits)
            .unwrap();
        assert_eq!(end, 7);
    }

    #[test]
    fn test_no_progress_forces_advance() {
        let content = "x".repeat(3000);
        let end = BreakPointSelector::new()
            .select(&content, 0, 0, &mut never_fits)
            .unwrap();
        assert_eq!(end, FORCED_ADVANCE_CHARS);
    }

    #[test]
    fn test_forced_advance_stops_at_content_end() {
        let content = "short";
        let end = BreakPointSelector::new()
            .select(content, 2, 2, &mut never_fits)
            .unwrap();
        assert_eq!(end, content.len());
    }

    #[test]
    fn test_window_limits_search() {
        let content = format!("a {}", "b".repeat(20));
        let end = BreakPointSelector::with_window(5)
            .select(&content, 0, content.len(), &mut always_fits)
            .unwrap();
        assert_eq!(end, content.len());
    }

    #[test]
    fn test_measurement_error_propagates() {
        let content = "<p>a</p>b";
        let mut failing = |_: &str| Err::<bool, _>(MeasureError::Unavailable("gone".into()));
        let result = BreakPointSelector::new().select(content, 0, content.len(), &mut failing);
        assert!(result.is_err());
    }
}
