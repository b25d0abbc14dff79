//! Drives an `AutoformatEditor` over a `PlainDocument` the way a browser
//! host would: keydown first, the default action when not handled, then
//! change notifications.

#![allow(dead_code)]

use loom_editor_autoformat::{
    AutoformatEditor, EditorConfig, MemoryUiStore, RecordingAnalytics, SequentialLineIds, Services,
    UiState,
};
use loom_editor_core::{
    DocumentHost, Key, KeyEvent, KeydownResult, LineInfo, PlainDocument, Selection,
};

pub struct Harness {
    pub doc: PlainDocument,
    pub editor: AutoformatEditor,
    pub ui: MemoryUiStore,
    pub analytics: RecordingAnalytics,
}

impl Harness {
    pub fn new(text: &str) -> Self {
        Self::with_config(text, &EditorConfig::default())
    }

    pub fn with_config(text: &str, config: &EditorConfig) -> Self {
        Self::with_doc(PlainDocument::new(text), config)
    }

    pub fn with_doc(doc: PlainDocument, config: &EditorConfig) -> Self {
        let ui = MemoryUiStore::default();
        let analytics = RecordingAnalytics::default();
        let services = Services::new(config)
            .with_ui(ui.clone())
            .with_analytics(analytics.clone())
            .with_line_ids(SequentialLineIds::default());
        Self {
            doc,
            editor: AutoformatEditor::with_services(config, services),
            ui,
            analytics,
        }
    }

    /// Forget the calls and UI actions logged so far.
    pub fn reset_logs(&mut self) -> &mut Self {
        self.doc.take_calls();
        self.doc.take_changes();
        self.ui.clear_log();
        self.analytics.clear();
        self
    }

    pub fn press(&mut self, event: KeyEvent) -> KeydownResult {
        let result = self.editor.keydown(&mut self.doc, &event);
        if !result.prevents_default() {
            self.default_action(&event.key);
        }
        self.pump();
        result
    }

    pub fn press_key(&mut self, key: Key) -> KeydownResult {
        self.press(KeyEvent::new(key))
    }

    /// Type `text` one key at a time. `\n` presses Enter.
    pub fn type_keys(&mut self, text: &str) -> KeydownResult {
        let mut last = KeydownResult::NotHandled;
        for ch in text.chars() {
            last = match ch {
                '\n' => self.press_key(Key::Enter),
                ch => self.press(KeyEvent::typed(ch)),
            };
        }
        last
    }

    /// Type `text` as native input without going through the bindings, as an
    /// IME or an emoji keyboard would.
    pub fn input(&mut self, text: &str) {
        self.doc.type_text(text);
        self.pump();
    }

    /// Deliver pending change notifications to the watcher.
    pub fn pump(&mut self) {
        loop {
            let changes = self.doc.take_changes();
            if changes.is_empty() {
                break;
            }
            for change in &changes {
                self.editor.text_change(&mut self.doc, change);
            }
        }
    }

    fn default_action(&mut self, key: &Key) {
        match key {
            Key::Character(s) => self.doc.type_text(s),
            Key::Space => self.doc.type_text(" "),
            Key::Enter => self.doc.type_text("\n"),
            Key::Backspace => self.doc.backspace(),
            Key::ArrowLeft => {
                if let Some(caret) = self.doc.caret() {
                    self.doc.set_caret(caret.saturating_sub(1));
                }
            }
            Key::ArrowRight => {
                if let Some(caret) = self.doc.caret() {
                    self.doc.set_caret(caret + 1);
                }
            }
            _ => {}
        }
    }

    pub fn caret(&self) -> Option<usize> {
        self.doc.caret()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.doc.selection()
    }

    pub fn text(&self) -> String {
        self.doc.plain_text()
    }

    pub fn line(&self, index: usize) -> LineInfo {
        self.doc.lines()[index].clone()
    }

    pub fn log(&self) -> String {
        self.doc.call_log()
    }

    pub fn ui_state(&self) -> UiState {
        self.editor.services().ui_state()
    }

    pub fn event_names(&self) -> Vec<String> {
        self.analytics
            .events()
            .iter()
            .map(|e| e.name.to_string())
            .collect()
    }
}
