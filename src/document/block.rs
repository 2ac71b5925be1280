//! Block-level structure of book markup

/// The kind of block element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockKind {
    /// Regular paragraph or anonymous text
    #[default]
    Paragraph,
    /// Heading with level (1-6)
    Heading { level: u8 },
    /// List item
    ListItem,
}

impl BlockKind {
    /// Block kind opened by a tag name, if the tag is block-level
    pub fn from_tag(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = lower.as_bytes()[1] - b'0';
                Some(BlockKind::Heading { level })
            }
            "li" => Some(BlockKind::ListItem),
            "p" | "div" | "blockquote" | "section" | "article" | "header" | "footer"
            | "ul" | "ol" | "pre" | "hr" | "table" | "tr" => Some(BlockKind::Paragraph),
            _ => None,
        }
    }

    /// Get the line height multiplier for this block kind
    pub fn line_height_multiplier(&self) -> f32 {
        match self {
            BlockKind::Paragraph | BlockKind::ListItem => 1.0,
            BlockKind::Heading { level } => match level {
                1 => 1.5,
                2 => 1.4,
                3 => 1.3,
                _ => 1.2,
            },
        }
    }

    /// Check if this is a heading
    pub fn is_heading(&self) -> bool {
        matches!(self, BlockKind::Heading { .. })
    }
}

/// Plain text of one block with markup removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub kind: BlockKind,
    pub text: String,
}

/// Split a markup fragment into text blocks.
///
/// Tags are dropped, block-level tags close the current block, `<br>`
/// becomes a newline, whitespace runs collapse to one space and entities
/// decode to a single character. Fragments cut from the middle of a book
/// are fine: text before any opening tag lands in an anonymous paragraph.
pub fn split_blocks(html: &str) -> Vec<TextBlock> {
    let mut blocks = Vec::new();
    let mut current = TextBlock {
        kind: BlockKind::Paragraph,
        text: String::new(),
    };

    let mut rest = html;
    while let Some(c) = rest.chars().next() {
        match c {
            '<' => {
                let Some(close) = rest.find('>') else {
                    // Unterminated tag renders nothing
                    break;
                };
                let tag = &rest[1..close];
                rest = &rest[close + 1..];

                let closing = tag.starts_with('/');
                let name: String = tag
                    .trim_start_matches('/')
                    .chars()
                    .take_while(|c| c.is_ascii_alphanumeric())
                    .collect();

                if name.eq_ignore_ascii_case("br") {
                    current.text.push('\n');
                    continue;
                }
                if let Some(kind) = BlockKind::from_tag(&name) {
                    flush(&mut blocks, &mut current);
                    current.kind = if closing { BlockKind::Paragraph } else { kind };
                }
            }
            '&' => {
                let (decoded, consumed) = decode_entity(rest);
                push_char(&mut current.text, decoded);
                rest = &rest[consumed..];
            }
            _ => {
                push_char(&mut current.text, c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    flush(&mut blocks, &mut current);

    blocks
}

fn push_char(text: &mut String, c: char) {
    if c.is_ascii_whitespace() {
        if text.is_empty() || text.ends_with(' ') || text.ends_with('\n') {
            return;
        }
        text.push(' ');
    } else {
        text.push(c);
    }
}

fn flush(blocks: &mut Vec<TextBlock>, current: &mut TextBlock) {
    let text = current.text.trim_end_matches(' ');
    if !text.trim().is_empty() {
        blocks.push(TextBlock {
            kind: current.kind,
            text: text.to_string(),
        });
    }
    current.text.clear();
}

/// Decode the entity at the start of `text`; returns the character and the
/// number of bytes consumed. A bare `&` decodes to itself.
fn decode_entity(text: &str) -> (char, usize) {
    let Some(semi) = text.char_indices().take(12).find(|&(_, c)| c == ';').map(|(i, _)| i)
    else {
        return ('&', 1);
    };
    let name = &text[1..semi];
    let decoded = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" | "#39" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => name
            .strip_prefix("#x")
            .or_else(|| name.strip_prefix("#X"))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .or_else(|| name.strip_prefix('#').and_then(|dec| dec.parse().ok()))
            .and_then(char::from_u32),
    };
    match decoded {
        Some(c) => (c, semi + 1),
        None if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric()) => {
            ('\u{fffd}', semi + 1)
        }
        None => ('&', 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_kind_from_tag() {
        assert_eq!(BlockKind::from_tag("H1"), Some(BlockKind::Heading { level: 1 }));
        assert_eq!(BlockKind::from_tag("p"), Some(BlockKind::Paragraph));
        assert_eq!(BlockKind::from_tag("li"), Some(BlockKind::ListItem));
        assert_eq!(BlockKind::from_tag("span"), None);
    }

    #[test]
    fn test_split_paragraphs() {
        let blocks = split_blocks("<p>AAAA</p><p>BBBB</p>");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "AAAA");
        assert_eq!(blocks[1].text, "BBBB");
    }

    #[test]
    fn test_heading_kind() {
        let blocks = split_blocks("<h1>Title</h1>body");
        assert_eq!(blocks[0].kind, BlockKind::Heading { level: 1 });
        assert_eq!(blocks[1].kind, BlockKind::Paragraph);
        assert_eq!(blocks[1].text, "body");
    }

    #[test]
    fn test_inline_tags_and_whitespace() {
        let blocks = split_blocks("<p>a  <b>bold</b>\n  text </p>");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "a bold text");
    }

    #[test]
    fn test_line_break_tag() {
        let blocks = split_blocks("<p>one<br/>two</p>");
        assert_eq!(blocks[0].text, "one\ntwo");
    }

    #[test]
    fn test_entities() {
        let blocks = split_blocks("<p>a &amp; b &lt;c&gt; &#65;&#x42; &bogus; & d</p>");
        assert_eq!(blocks[0].text, "a & b <c> AB \u{fffd} & d");
    }

    #[test]
    fn test_fragment_without_opening_tag() {
        let blocks = split_blocks("tail of a paragraph</p><p>next");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "tail of a paragraph");
        assert_eq!(blocks[1].text, "next");
    }

    #[test]
    fn test_empty_blocks_dropped() {
        assert!(split_blocks("<p></p><div>  </div>").is_empty());
    }
}
