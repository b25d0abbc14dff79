//! Collaborators handlers call out to.

use std::rc::Rc;

use smol_str::SmolStr;

use crate::analytics::{AnalyticsEvent, AnalyticsSink, MentionContext, NoopAnalytics};
use crate::config::EditorConfig;
use crate::diagnostics::DiagnosticsSink;
use crate::emoji::{EmojiInserter, EmojiResolver, ShortcodeInserter};
use crate::line_id::{LineIdSource, UuidLineIds};
use crate::ui_state::{MemoryUiStore, UiAction, UiState, UiStore};

pub struct Services {
    pub analytics: Box<dyn AnalyticsSink>,
    pub ui: Box<dyn UiStore>,
    pub emoji: EmojiResolver,
    pub line_ids: Box<dyn LineIdSource>,
    pub emoji_inserter: Box<dyn EmojiInserter>,
    pub editor_id: SmolStr,
    pub mentions_window: usize,
    pub mention_context: MentionContext,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("editor_id", &self.editor_id)
            .field("mentions_window", &self.mentions_window)
            .field("mention_context", &self.mention_context)
            .finish_non_exhaustive()
    }
}

impl Services {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            analytics: Box::new(NoopAnalytics),
            ui: Box::new(MemoryUiStore::default()),
            emoji: EmojiResolver::default(),
            line_ids: Box::new(UuidLineIds),
            emoji_inserter: Box::new(ShortcodeInserter),
            editor_id: config.editor_id.clone(),
            mentions_window: config.mentions_window,
            mention_context: if config.comment_mode {
                MentionContext::Commenting
            } else {
                MentionContext::Document
            },
        }
    }

    pub fn with_analytics(mut self, analytics: impl AnalyticsSink + 'static) -> Self {
        self.analytics = Box::new(analytics);
        self
    }

    pub fn with_ui(mut self, ui: impl UiStore + 'static) -> Self {
        self.ui = Box::new(ui);
        self
    }

    pub fn with_line_ids(mut self, line_ids: impl LineIdSource + 'static) -> Self {
        self.line_ids = Box::new(line_ids);
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: impl DiagnosticsSink + 'static) -> Self {
        self.emoji = EmojiResolver::new(Rc::new(diagnostics));
        self
    }

    pub fn with_emoji_inserter(mut self, inserter: impl EmojiInserter + 'static) -> Self {
        self.emoji_inserter = Box::new(inserter);
        self
    }

    pub fn track(&mut self, event: AnalyticsEvent) {
        self.analytics.track(event);
    }

    pub fn ui_state(&self) -> UiState {
        self.ui.snapshot()
    }

    pub fn dispatch(&mut self, action: UiAction) {
        self.ui.dispatch(action);
    }
}
