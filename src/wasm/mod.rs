//! WASM bindings for the reader

use crate::document::{Book, ParsedTextItem};
use crate::interaction::ClickGate;
use crate::layout::{DisplayConfig, Measure, MeasureError};
use crate::session::{Navigation, ReaderSession};
use crate::storage::{current_timestamp, MemoryStore};
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Measurement backed by a JS function `(html, configJson) => height`
pub struct JsMeasurer {
    function: js_sys::Function,
}

impl JsMeasurer {
    pub fn new(function: js_sys::Function) -> Self {
        Self { function }
    }
}

impl Measure for JsMeasurer {
    fn measure(&mut self, html: &str, config: &DisplayConfig) -> Result<f32, MeasureError> {
        let config_json =
            serde_json::to_string(config).map_err(|err| MeasureError::Unavailable(err.to_string()))?;
        let height = self
            .function
            .call2(
                &JsValue::NULL,
                &JsValue::from_str(html),
                &JsValue::from_str(&config_json),
            )
            .map_err(|err| MeasureError::Unavailable(format!("measure function threw: {err:?}")))?;
        height
            .as_f64()
            .map(|height| height as f32)
            .ok_or_else(|| MeasureError::Unavailable("measure function returned a non-number".into()))
    }
}

/// WASM-exposed reader wrapper
#[wasm_bindgen]
pub struct WasmReader {
    session: ReaderSession,
    store: MemoryStore,
    gate: ClickGate,
}

#[wasm_bindgen]
impl WasmReader {
    /// Open a book given as `{uuid, title, content, chapters}` JSON.
    ///
    /// `stored` is a previous `exportStore()` result, so settings, bookmarks
    /// and progress are restored before the first pagination.
    #[wasm_bindgen(constructor)]
    pub fn new(
        book_json: &str,
        measure: js_sys::Function,
        width: f32,
        height: f32,
        stored: Option<String>,
    ) -> Result<WasmReader, JsValue> {
        let book = Book::from_json(book_json).map_err(to_js_error)?;
        Self::open(book, measure, width, height, stored.as_deref())
    }

    /// Open a book assembled from parsed text items
    /// (`[{id, content, pageId, pageNumber}]` JSON)
    #[wasm_bindgen(js_name = fromParsedItems)]
    pub fn from_parsed_items(
        uuid: &str,
        title: &str,
        items_json: &str,
        measure: js_sys::Function,
        width: f32,
        height: f32,
        stored: Option<String>,
    ) -> Result<WasmReader, JsValue> {
        let items: Vec<ParsedTextItem> = serde_json::from_str(items_json).map_err(to_js_error)?;
        let book = Book::from_parsed_items(uuid, title, &items);
        Self::open(book, measure, width, height, stored.as_deref())
    }

    #[wasm_bindgen(js_name = nextPage)]
    pub fn next_page(&mut self) -> bool {
        self.session.next_page().moved()
    }

    #[wasm_bindgen(js_name = previousPage)]
    pub fn previous_page(&mut self) -> bool {
        self.session.previous_page().moved()
    }

    /// Go to a page; false when it is out of range or already current
    #[wasm_bindgen(js_name = goToPage)]
    pub fn go_to_page(&mut self, page: usize) -> bool {
        match self.session.navigate(page) {
            Navigation::Moved { .. } => true,
            Navigation::Unchanged => false,
            Navigation::OutOfRange { requested, total } => {
                log::debug!("page {requested} requested, book has {total}");
                false
            }
        }
    }

    #[wasm_bindgen(js_name = jumpToChapter)]
    pub fn jump_to_chapter(&mut self, chapter_index: usize) -> bool {
        self.session.jump_to_chapter(chapter_index).moved()
    }

    /// Progress-bar click at `ratio` of its width
    #[wasm_bindgen(js_name = navigateToRatio)]
    pub fn navigate_to_ratio(&mut self, ratio: f32) -> bool {
        self.session.navigate_to_ratio(ratio).moved()
    }

    #[wasm_bindgen(js_name = changeFontSize)]
    pub fn change_font_size(&mut self, delta: f32) -> bool {
        self.session.change_font_size(delta)
    }

    #[wasm_bindgen(js_name = changeLineHeight)]
    pub fn change_line_height(&mut self, delta: f32) -> bool {
        self.session.change_line_height(delta)
    }

    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        self.session.resize(width, height)
    }

    /// Toggle the bookmark on the current page; `undefined` on an empty book
    #[wasm_bindgen(js_name = toggleBookmark)]
    pub fn toggle_bookmark(&mut self) -> Option<bool> {
        self.session.toggle_current_bookmark()
    }

    #[wasm_bindgen(js_name = hasBookmark)]
    pub fn has_bookmark(&self, page: usize) -> bool {
        self.session.has_bookmark(page)
    }

    #[wasm_bindgen(js_name = toggleToolbar)]
    pub fn toggle_toolbar(&mut self) {
        self.session.toggle_toolbar();
    }

    #[wasm_bindgen(js_name = showToolbar)]
    pub fn show_toolbar(&mut self) {
        self.session.show_toolbar();
    }

    #[wasm_bindgen(js_name = hideToolbar)]
    pub fn hide_toolbar(&mut self) {
        self.session.hide_toolbar();
    }

    #[wasm_bindgen(js_name = isToolbarVisible)]
    pub fn is_toolbar_visible(&self) -> bool {
        self.session.state().toolbar_visible
    }

    /// Handle a tap at percentages of the reading surface.
    ///
    /// Returns the zone acted on, or `undefined` when the tap came too soon
    /// after the previous one.
    pub fn tap(&mut self, percent_x: f32, percent_y: f32) -> Option<String> {
        if !self.gate.accept(current_timestamp()) {
            return None;
        }
        Some(self.session.handle_tap(percent_x, percent_y).as_str().to_string())
    }

    #[wasm_bindgen(js_name = getCurrentPage)]
    pub fn get_current_page(&self) -> usize {
        self.session.state().current_page
    }

    #[wasm_bindgen(js_name = getPageCount)]
    pub fn get_page_count(&self) -> usize {
        self.session.state().total_pages
    }

    #[wasm_bindgen(js_name = chapterTitle)]
    pub fn chapter_title(&self, page: usize) -> String {
        self.session.chapter_title(page).to_string()
    }

    /// The current page as `PageView` JSON
    #[wasm_bindgen(js_name = currentView)]
    pub fn current_view(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.current_view()).map_err(to_js_error)
    }

    /// Reader state (without content) as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.session.state()).map_err(to_js_error)
    }

    /// Page ranges as `[{startIndex, endIndex, chapterIndex}]` JSON
    #[wasm_bindgen(js_name = getPages)]
    pub fn get_pages(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.session.pages()).map_err(to_js_error)
    }

    /// Stored documents as one JSON object for the host's local storage
    #[wasm_bindgen(js_name = exportStore)]
    pub fn export_store(&self) -> Result<String, JsValue> {
        self.store.export_json().map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = importStore)]
    pub fn import_store(&self, json: &str) -> Result<usize, JsValue> {
        self.store.import_json(json).map_err(to_js_error)
    }

    /// Save progress and release the session. Returns the exported store.
    pub fn close(self) -> Result<String, JsValue> {
        let WasmReader { session, store, .. } = self;
        session.close();
        store.export_json().map_err(to_js_error)
    }
}

impl WasmReader {
    fn open(
        book: Book,
        measure: js_sys::Function,
        width: f32,
        height: f32,
        stored: Option<&str>,
    ) -> Result<WasmReader, JsValue> {
        let store = MemoryStore::new();
        if let Some(json) = stored {
            store.import_json(json).map_err(to_js_error)?;
        }
        let session = ReaderSession::open(book, store.clone(), JsMeasurer::new(measure), width, height);
        Ok(Self {
            session,
            store,
            gate: ClickGate::default(),
        })
    }
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::wasm_bindgen_test;

    fn visible_length() -> js_sys::Function {
        js_sys::Function::new_with_args("html", "return html.replace(/<[^>]*>/g, '').length;")
    }

    const BOOK: &str = r#"{"uuid":"b","title":"T","content":"<p>AAAA</p><p>BBBB</p>"}"#;

    #[wasm_bindgen_test]
    fn test_js_measurer() {
        let mut measurer = JsMeasurer::new(visible_length());
        assert_eq!(measurer.measure("<p>abc</p>", &DisplayConfig::default()), Ok(3.0));

        let mut throwing = JsMeasurer::new(js_sys::Function::new_no_args("throw new Error('x');"));
        assert!(matches!(
            throwing.measure("x", &DisplayConfig::default()),
            Err(MeasureError::Unavailable(_))
        ));
    }

    #[wasm_bindgen_test]
    fn test_reader_round_trip() {
        let mut reader = WasmReader::new(BOOK, visible_length(), 300.0, 4.0, None).unwrap();
        assert_eq!(reader.get_page_count(), 2);
        assert!(reader.next_page());
        assert_eq!(reader.toggle_bookmark(), Some(true));

        let stored = reader.close().unwrap();
        let reopened = WasmReader::new(BOOK, visible_length(), 300.0, 4.0, Some(stored)).unwrap();
        assert_eq!(reopened.get_current_page(), 1);
        assert!(reopened.has_bookmark(1));
    }
}
