//! loom-editor-autoformat: markdown shortcuts and emoji embedding for the
//! loom editor.
//!
//! This crate provides:
//! - `Keyboard` - ordered key bindings that turn markdown sigils into formats
//! - `EmojiWatcher` - rewrites typed native emoji into embeds
//! - `PasteMatcher` - the same rewrite for pasted text
//! - `AutoformatEditor` - the three wired to one set of `Services`
//!
//! Everything runs against a [`DocumentHost`]; the host owns rendering,
//! history and the popups.

pub mod analytics;
pub mod bindings;
pub mod clipboard;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod emoji;
pub mod error;
pub mod handlers;
pub mod keyboard;
pub mod line_id;
pub mod matcher;
pub mod patterns;
pub mod services;
pub mod ui_state;

pub use analytics::{AnalyticsEvent, AnalyticsSink, NoopAnalytics, RecordingAnalytics};
pub use bindings::{Binding, Bindings, Flow, Handler, HandlerCx};
pub use clipboard::PasteMatcher;
pub use config::{EditorConfig, EmojiConfig, MarkdownConfig};
pub use context::KeyContext;
pub use diagnostics::{DiagnosticsSink, RecordingDiagnostics, TracingDiagnostics};
pub use emoji::{EMOJI_EMBED, EmojiEmbedValue, EmojiResolver, EmojiWatcher};
pub use error::{ConfigError, EmojiError};
pub use keyboard::Keyboard;
pub use line_id::{LineIdSource, SequentialLineIds, UuidLineIds};
pub use matcher::{MatchResult, Pattern};
pub use services::Services;
pub use ui_state::{MemoryUiStore, UiAction, UiState, UiStore};

use loom_editor_core::{Delta, DocumentHost, KeyEvent, KeydownResult, TextChange};

/// One editor's autoformatting: the keyboard, the emoji watcher and the
/// paste matcher sharing one set of collaborators.
#[derive(Debug)]
pub struct AutoformatEditor {
    keyboard: Keyboard,
    watcher: EmojiWatcher,
    paste: PasteMatcher,
    services: Services,
}

impl AutoformatEditor {
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_services(config, Services::new(config))
    }

    pub fn with_services(config: &EditorConfig, services: Services) -> Self {
        Self::with_comment_bindings(config, services, Vec::new())
    }

    /// `comment_bindings` replace the document shortcuts when
    /// `config.comment_mode` is set, and are ignored otherwise.
    pub fn with_comment_bindings(
        config: &EditorConfig,
        services: Services,
        comment_bindings: Vec<Binding>,
    ) -> Self {
        tracing::debug!(
            editor = %config.editor_id,
            comment_mode = config.comment_mode,
            mentions = config.mentions,
            "autoformat editor created"
        );
        Self {
            keyboard: Keyboard::with_comment_bindings(config, comment_bindings),
            watcher: EmojiWatcher,
            paste: PasteMatcher,
            services,
        }
    }

    /// Route a keydown through the bindings. The host performs its default
    /// action unless the result is `Handled`.
    pub fn keydown(&mut self, doc: &mut dyn DocumentHost, event: &KeyEvent) -> KeydownResult {
        self.keyboard.handle_keydown(doc, &mut self.services, event)
    }

    /// Feed a change notification to the emoji watcher.
    pub fn text_change(&mut self, doc: &mut dyn DocumentHost, change: &TextChange) -> bool {
        self.watcher.on_text_change(doc, change, &self.services.emoji)
    }

    /// Clipboard matcher for plain-text nodes.
    pub fn paste(&self, node_text: &str, delta: Delta) -> Delta {
        self.paste.matches(node_text, delta, &self.services.emoji)
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn services_mut(&mut self) -> &mut Services {
        &mut self.services
    }
}
