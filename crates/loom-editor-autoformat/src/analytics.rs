//! Analytics events emitted when formatting is applied.
//!
//! Calls are fire-and-forget. `StyleChange` builds the "a format of kind K
//! was applied via method M" event; `mention_inserted` builds the mention
//! event.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;
use smol_str::SmolStr;

pub const STYLE_APPLIED: &str = "style_applied";
pub const MENTION_INSERTED: &str = "mention_inserted";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsEvent {
    pub name: SmolStr,
    pub properties: BTreeMap<SmolStr, serde_json::Value>,
}

impl AnalyticsEvent {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<SmolStr>, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }
}

pub trait AnalyticsSink {
    fn track(&mut self, event: AnalyticsEvent);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnalytics;

impl AnalyticsSink for NoopAnalytics {
    fn track(&mut self, _event: AnalyticsEvent) {}
}

/// Keeps every event. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingAnalytics {
    events: Rc<RefCell<Vec<AnalyticsEvent>>>,
}

impl RecordingAnalytics {
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl AnalyticsSink for RecordingAnalytics {
    fn track(&mut self, event: AnalyticsEvent) {
        self.events.borrow_mut().push(event);
    }
}

/// How a style was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Keyboard,
    Editor,
    Markdown,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Keyboard => "keyboard",
            Method::Editor => "editor",
            Method::Markdown => "markdown",
        }
    }
}

/// Builder for style-change events.
#[derive(Debug, Clone, Copy)]
pub struct StyleChange {
    method: Method,
}

impl StyleChange {
    pub fn via_keyboard() -> Self {
        Self {
            method: Method::Keyboard,
        }
    }

    pub fn via_editor() -> Self {
        Self {
            method: Method::Editor,
        }
    }

    pub fn via_markdown() -> Self {
        Self {
            method: Method::Markdown,
        }
    }

    /// Event for an inline or line format by its attribute name.
    pub fn applied(self, style: &str) -> AnalyticsEvent {
        AnalyticsEvent::new(STYLE_APPLIED)
            .with("style", style)
            .with("method", self.method.as_str())
    }

    pub fn applied_bold(self) -> AnalyticsEvent {
        self.applied("bold")
    }

    pub fn applied_italic(self) -> AnalyticsEvent {
        self.applied("italic")
    }

    pub fn applied_underline(self) -> AnalyticsEvent {
        self.applied("underline")
    }

    pub fn applied_strike(self) -> AnalyticsEvent {
        self.applied("strike")
    }

    pub fn applied_code(self) -> AnalyticsEvent {
        self.applied("code")
    }

    pub fn applied_header(self, level: i64) -> AnalyticsEvent {
        self.applied("header").with("level", level)
    }

    pub fn applied_list(self, kind: &str) -> AnalyticsEvent {
        self.applied("list").with("kind", kind)
    }

    pub fn applied_url(self) -> AnalyticsEvent {
        self.applied("link")
    }

    pub fn applied_divider(self) -> AnalyticsEvent {
        self.applied("divider")
    }

    pub fn applied_code_block(self) -> AnalyticsEvent {
        self.applied("code-block")
    }

    pub fn applied_blockquote(self) -> AnalyticsEvent {
        self.applied("blockquote")
    }
}

/// Where a mention was inserted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionContext {
    Commenting,
    Document,
}

pub fn mention_inserted(context: MentionContext) -> AnalyticsEvent {
    let context = match context {
        MentionContext::Commenting => "commenting",
        MentionContext::Document => "document",
    };
    AnalyticsEvent::new(MENTION_INSERTED).with("context", context)
}
