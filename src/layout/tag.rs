//! Markup boundary helpers
//!
//! A page boundary must never fall between a `<` and the `>` that closes it.
//! All offsets are UTF-8 byte offsets; every offset returned here lies on a
//! `char` boundary.

/// Largest char boundary `<= pos`
pub fn floor_char_boundary(text: &str, pos: usize) -> usize {
    if pos >= text.len() {
        return text.len();
    }
    let mut pos = pos;
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Offset reached after moving `chars` characters forward from `start`
pub fn advance_chars(text: &str, start: usize, chars: usize) -> usize {
    text[start..]
        .char_indices()
        .nth(chars)
        .map(|(offset, _)| start + offset)
        .unwrap_or(text.len())
}

/// Offset reached after moving `chars` characters back from `end`
pub fn retreat_chars(text: &str, end: usize, chars: usize) -> usize {
    if chars == 0 {
        return end;
    }
    text[..end]
        .char_indices()
        .rev()
        .nth(chars - 1)
        .map(|(offset, _)| offset)
        .unwrap_or(0)
}

/// Start of the tag that is still open at `pos`, if any.
///
/// A tag is open when the last `<` before `pos` has no `>` between it and
/// `pos`.
pub fn open_tag_start(text: &str, pos: usize) -> Option<usize> {
    let head = &text.as_bytes()[..pos.min(text.len())];
    let lt = head.iter().rposition(|&b| b == b'<')?;
    if head[lt..].contains(&b'>') {
        None
    } else {
        Some(lt)
    }
}

/// Whether `pos` falls strictly inside a tag
pub fn is_inside_tag(text: &str, pos: usize) -> bool {
    pos > 0 && pos < text.len() && open_tag_start(text, pos).is_some()
}

/// Snap `pos` to the nearest position that does not split a tag.
///
/// Positions outside tags are returned unchanged. Inside a tag the closer of
/// the tag's `<` and the position just past its `>` wins, ties going
/// forward. An unterminated tag snaps back to its `<`.
pub fn tag_safe(text: &str, pos: usize) -> usize {
    let pos = floor_char_boundary(text, pos);
    let Some(lt) = open_tag_start(text, pos) else {
        return pos;
    };
    match text.as_bytes()[pos..].iter().position(|&b| b == b'>') {
        Some(rel) => {
            let after_gt = pos + rel + 1;
            if after_gt - pos <= pos - lt {
                after_gt
            } else {
                lt
            }
        }
        None => lt,
    }
}

/// Move `pos` forward out of any tag it sits in
pub fn leave_tag(text: &str, pos: usize) -> usize {
    let pos = floor_char_boundary(text, pos);
    if open_tag_start(text, pos).is_none() {
        return pos;
    }
    text.as_bytes()[pos..]
        .iter()
        .position(|&b| b == b'>')
        .map(|rel| pos + rel + 1)
        .unwrap_or(text.len())
}

/// Forced advance of up to `chars` characters past `start`, never ending
/// inside a tag. Always returns a position `> start` for non-empty input.
pub fn forced_advance(text: &str, start: usize, chars: usize) -> usize {
    let target = advance_chars(text, start, chars.max(1));
    leave_tag(text, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = "<p>AAAA</p><p>BBBB</p>";

    #[test]
    fn test_outside_tag_unchanged() {
        assert_eq!(tag_safe(HTML, 0), 0);
        assert_eq!(tag_safe(HTML, 5), 5);
        assert_eq!(tag_safe(HTML, 11), 11);
        assert_eq!(tag_safe(HTML, HTML.len()), HTML.len());
    }

    #[test]
    fn test_snaps_to_nearer_boundary() {
        // "</p>" spans 7..11
        assert_eq!(tag_safe(HTML, 8), 7);
        assert_eq!(tag_safe(HTML, 10), 11);
        // "<p>" spans 11..14
        assert_eq!(tag_safe(HTML, 13), 14);
        assert_eq!(tag_safe(HTML, 12), 11);
    }

    #[test]
    fn test_tie_goes_forward() {
        // "<ab>": pos 2 is two away from both ends
        assert_eq!(tag_safe("x<ab>y", 3), 5);
        assert_eq!(tag_safe("x<abc>y", 3), 1);
    }

    #[test]
    fn test_unterminated_tag_snaps_back() {
        let text = "hello <span";
        assert_eq!(tag_safe(text, 9), 6);
    }

    #[test]
    fn test_inside_tag() {
        assert!(is_inside_tag(HTML, 1));
        assert!(!is_inside_tag(HTML, 3));
        assert!(!is_inside_tag(HTML, 7));
        assert!(is_inside_tag(HTML, 8));
        assert!(!is_inside_tag(HTML, 0));
    }

    #[test]
    fn test_char_boundaries() {
        let text = "阅读器";
        assert_eq!(floor_char_boundary(text, 1), 0);
        assert_eq!(floor_char_boundary(text, 4), 3);
        assert_eq!(advance_chars(text, 0, 2), 6);
        assert_eq!(advance_chars(text, 3, 10), 9);
        assert_eq!(retreat_chars(text, 9, 1), 6);
        assert_eq!(retreat_chars(text, 9, 10), 0);
    }

    #[test]
    fn test_forced_advance_leaves_tag() {
        let text = "ab<span class=\"x\">cd";
        // two chars lands on '<', which is outside the tag
        assert_eq!(forced_advance(text, 0, 2), 2);
        // three chars lands inside the tag
        assert_eq!(forced_advance(text, 0, 3), 18);
        assert_eq!(forced_advance("abc", 1, 1000), 3);
        assert_eq!(forced_advance("<unterminated", 0, 3), 13);
    }
}
