//! Book content model

mod block;

pub use block::{split_blocks, BlockKind, TextBlock};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Marker that opens a chapter in book markup
pub const CHAPTER_MARKER: &str = "<h1";

/// Title used when a parsed document has none
pub const UNKNOWN_TITLE: &str = "未知标题";

/// One entry of a book's table of contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    /// Ordinal position among chapters
    pub index: usize,
}

/// A book ready for reading: identity plus its full HTML content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "uuid")]
    pub id: String,
    pub title: String,
    /// Shared with the reader state of any session showing this book
    pub content: Arc<str>,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

/// A text item as returned by the document parsing backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTextItem {
    #[serde(default)]
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub page_id: String,
    pub page_number: i64,
}

impl Book {
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: impl Into<Arc<str>>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            chapters: Vec::new(),
        }
    }

    pub fn with_chapters(mut self, chapters: Vec<Chapter>) -> Self {
        self.chapters = chapters;
        self
    }

    /// Parse a `{uuid, title, content, chapters}` JSON document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Assemble a book from parsed text items.
    ///
    /// Items are ordered by source page, then by numeric id. Each source page
    /// becomes a `book-page` div and each item an escaped paragraph.
    pub fn from_parsed_items(
        id: impl Into<String>,
        title: &str,
        items: &[ParsedTextItem],
    ) -> Self {
        let mut sorted: Vec<&ParsedTextItem> = items.iter().collect();
        sorted.sort_by_key(|item| (item.page_number, item_sort_id(item)));

        let mut html = String::from("<div class=\"book-content\">");
        let mut current_page = None;
        for item in sorted {
            if current_page != Some(item.page_number) {
                if current_page.is_some() {
                    html.push_str("</div>");
                }
                current_page = Some(item.page_number);
                html.push_str(&format!(
                    "<div class=\"book-page\" data-page=\"{}\">",
                    item.page_number
                ));
            }
            html.push_str("<p>");
            escape_html_into(&mut html, &item.content);
            html.push_str("</p>");
        }
        if current_page.is_some() {
            html.push_str("</div>");
        }
        html.push_str("</div>");

        let title = if title.is_empty() { UNKNOWN_TITLE } else { title };
        Self::new(id, title, html)
    }

    /// Title of the chapter at `index`, if the book has one
    pub fn chapter_title(&self, index: usize) -> Option<&str> {
        self.chapters.get(index).map(|c| c.title.as_str())
    }
}

fn item_sort_id(item: &ParsedTextItem) -> i64 {
    let raw = if !item.id.is_empty() {
        item.id.as_str()
    } else if !item.page_id.is_empty() {
        item.page_id.as_str()
    } else {
        "0"
    };
    leading_integer(raw).unwrap_or(0)
}

/// Integer prefix of `text`, after optional whitespace and sign
fn leading_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let digits_end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    trimmed[..digits_end].parse().ok()
}

/// Escape text for inclusion in HTML
pub fn escape_html_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

/// Number of chapter-opening markers (`<h1`, any case) in a fragment.
///
/// A heuristic: nested or malformed headings can miscount.
pub fn count_chapter_markers(html: &str) -> usize {
    let marker = CHAPTER_MARKER.as_bytes();
    html.as_bytes()
        .windows(marker.len())
        .filter(|window| window.eq_ignore_ascii_case(marker))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, page: i64, content: &str) -> ParsedTextItem {
        ParsedTextItem {
            id: id.to_string(),
            content: content.to_string(),
            page_id: String::new(),
            page_number: page,
        }
    }

    #[test]
    fn test_count_chapter_markers() {
        assert_eq!(count_chapter_markers("<h1>One</h1><p>x</p><H1 class=\"c\">Two</H1>"), 2);
        assert_eq!(count_chapter_markers("<h2>Sub</h2>"), 0);
        assert_eq!(count_chapter_markers(""), 0);
    }

    #[test]
    fn test_from_json() {
        let book = Book::from_json(
            r#"{"uuid":"b1","title":"T","content":"<p>x</p>","chapters":[{"id":"c1","title":"One","index":0}]}"#,
        )
        .unwrap();
        assert_eq!(book.id, "b1");
        assert_eq!(book.chapter_title(0), Some("One"));
        assert_eq!(book.chapter_title(1), None);

        let bare = Book::from_json(r#"{"uuid":"b2","title":"T","content":""}"#).unwrap();
        assert!(bare.chapters.is_empty());
    }

    #[test]
    fn test_from_parsed_items_groups_pages() {
        let items = vec![
            item("2", 1, "second"),
            item("10", 0, "b"),
            item("9", 0, "a"),
        ];
        let book = Book::from_parsed_items("u", "Title", &items);
        assert_eq!(
            &*book.content,
            "<div class=\"book-content\">\
             <div class=\"book-page\" data-page=\"0\"><p>a</p><p>b</p></div>\
             <div class=\"book-page\" data-page=\"1\"><p>second</p></div>\
             </div>"
        );
    }

    #[test]
    fn test_from_parsed_items_escapes_and_defaults_title() {
        let book = Book::from_parsed_items("u", "", &[item("x", 0, "<a & 'b'>")]);
        assert_eq!(book.title, UNKNOWN_TITLE);
        assert!(book.content.contains("<p>&lt;a &amp; &#39;b&#39;&gt;</p>"));
    }

    #[test]
    fn test_from_parsed_items_empty() {
        let book = Book::from_parsed_items("u", "T", &[]);
        assert_eq!(&*book.content, "<div class=\"book-content\"></div>");
    }

    #[test]
    fn test_leading_integer() {
        assert_eq!(leading_integer("42abc"), Some(42));
        assert_eq!(leading_integer(" -7"), Some(-7));
        assert_eq!(leading_integer("abc"), None);
    }
}
