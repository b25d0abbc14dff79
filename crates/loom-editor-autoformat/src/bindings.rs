//! The keybinding table.
//!
//! A [`Binding`] is a declarative rule: a key, optional modifier and context
//! constraints, optional prefix/suffix patterns and a handler. Bindings are
//! registered once per [`EditorConfig`] through [`BindingsBuilder`] and are
//! immutable afterwards. For a given key they are tried in table order:
//! [`BindingsBuilder::push`] appends in feature order, and only bindings
//! that must win while a popup is open are put in front with
//! [`BindingsBuilder::unshift`].

use std::collections::HashMap;
use std::rc::Rc;

use loom_editor_core::{DocumentHost, Key, KeyEvent};
use regex::Regex;
use smol_str::SmolStr;
use tracing::debug;

use crate::config::EditorConfig;
use crate::context::KeyContext;
use crate::handlers::{emoji, lines, markdown, mentions, navigation};
use crate::matcher::{MatchResult, Pattern, try_match};
use crate::patterns::{InlineFormat, catalog};
use crate::services::Services;

/// What a handler decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Fully handled; suppress the default key action.
    Handled,
    /// Let later bindings and the default action run.
    Continue,
}

/// Everything a handler may touch.
pub struct HandlerCx<'a> {
    pub doc: &'a mut dyn DocumentHost,
    pub services: &'a mut Services,
    pub event: &'a KeyEvent,
    pub binding: &'a Binding,
}

pub type BuiltinHandler = fn(&mut HandlerCx<'_>, &KeyContext) -> Flow;

#[derive(Clone)]
pub enum Handler {
    Builtin(BuiltinHandler),
    Custom(Rc<dyn Fn(&mut HandlerCx<'_>, &KeyContext) -> Flow>),
}

impl Handler {
    fn call(&self, cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
        match self {
            Handler::Builtin(f) => f(cx, context),
            Handler::Custom(f) => f(cx, context),
        }
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Handler::Builtin(_) => f.write_str("Builtin"),
            Handler::Custom(_) => f.write_str("Custom"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub name: SmolStr,
    pub key: Key,
    /// `None` accepts either state.
    pub shift: Option<bool>,
    pub short_key: Option<bool>,
    pub collapsed: Option<bool>,
    pub empty: Option<bool>,
    /// Required caret offset within the line.
    pub offset: Option<usize>,
    /// At least one of these formats must be active.
    pub format_any: Vec<&'static str>,
    /// None of these formats may be active.
    pub format_absent: Vec<&'static str>,
    /// Any of these must end at the caret.
    pub prefix: Vec<Pattern>,
    pub suffix: Option<&'static Regex>,
    /// Inline formats the handler applies.
    pub formats: Vec<InlineFormat>,
    pub handler: Handler,
}

impl Binding {
    pub fn new(name: impl Into<SmolStr>, key: Key, handler: BuiltinHandler) -> Self {
        Self::with_handler(name, key, Handler::Builtin(handler))
    }

    pub fn custom(
        name: impl Into<SmolStr>,
        key: Key,
        handler: impl Fn(&mut HandlerCx<'_>, &KeyContext) -> Flow + 'static,
    ) -> Self {
        Self::with_handler(name, key, Handler::Custom(Rc::new(handler)))
    }

    fn with_handler(name: impl Into<SmolStr>, key: Key, handler: Handler) -> Self {
        Self {
            name: name.into(),
            key,
            shift: None,
            short_key: Some(false),
            collapsed: None,
            empty: None,
            offset: None,
            format_any: Vec::new(),
            format_absent: Vec::new(),
            prefix: Vec::new(),
            suffix: None,
            formats: Vec::new(),
            handler,
        }
    }

    pub fn shift(mut self, shift: bool) -> Self {
        self.shift = Some(shift);
        self
    }

    pub fn short_key(mut self, short_key: Option<bool>) -> Self {
        self.short_key = short_key;
        self
    }

    pub fn collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = Some(collapsed);
        self
    }

    pub fn empty(mut self, empty: bool) -> Self {
        self.empty = Some(empty);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn format_any(mut self, formats: &[&'static str]) -> Self {
        self.format_any = formats.to_vec();
        self
    }

    pub fn format_absent(mut self, formats: &[&'static str]) -> Self {
        self.format_absent = formats.to_vec();
        self
    }

    pub fn prefix(mut self, pattern: Pattern) -> Self {
        self.prefix.push(pattern);
        self
    }

    pub fn suffix(mut self, regex: &'static Regex) -> Self {
        self.suffix = Some(regex);
        self
    }

    pub fn formats(mut self, formats: &[InlineFormat]) -> Self {
        self.formats = formats.to_vec();
        self
    }

    pub fn matches_event(&self, event: &KeyEvent) -> bool {
        self.key == event.key
            && self.shift.is_none_or(|shift| shift == event.modifiers.shift)
            && self
                .short_key
                .is_none_or(|short| short == event.modifiers.short_key())
    }

    /// Every declared constraint except the prefix pattern.
    pub fn accepts(&self, cx: &KeyContext) -> bool {
        self.collapsed.is_none_or(|c| c == cx.collapsed)
            && self.empty.is_none_or(|e| e == cx.empty)
            && self.offset.is_none_or(|o| o == cx.offset)
            && (self.format_any.is_empty() || self.format_any.iter().any(|f| cx.has_format(f)))
            && !self.format_absent.iter().any(|f| cx.has_format(f))
            && self.suffix.is_none_or(|re| re.is_match(&cx.suffix))
    }

    /// The prefix match, `Some(None)` when the binding declares no prefix.
    pub fn match_prefix(&self, cx: &KeyContext) -> Option<Option<MatchResult>> {
        if self.prefix.is_empty() {
            return Some(None);
        }
        self.prefix
            .iter()
            .find_map(|pattern| try_match(&cx.line, cx.index(), *pattern))
            .map(Some)
    }

    pub fn run(&self, cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
        self.handler.call(cx, context)
    }
}

/// Ordered bindings per key.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    table: HashMap<Key, Vec<Binding>>,
}

impl Bindings {
    /// Bindings for `config`. In comment mode only `comment_bindings` and,
    /// if enabled, the mention bindings are registered.
    pub fn from_config(config: &EditorConfig, comment_bindings: Vec<Binding>) -> Self {
        let mut builder = BindingsBuilder::default();
        if config.comment_mode {
            if comment_bindings.is_empty() && !config.mentions {
                debug!("comment mode without bindings: no shortcuts registered");
            }
            for binding in comment_bindings {
                builder.push(binding);
            }
        } else {
            register_document(&mut builder, config);
        }
        if config.mentions {
            register_mentions(&mut builder);
        }
        builder.build()
    }

    pub fn for_key(&self, key: &Key) -> &[Binding] {
        self.table.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Binding names for a key, in the order they are tried.
    pub fn names(&self, key: &Key) -> Vec<&str> {
        self.for_key(key).iter().map(|b| b.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.table.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.values().flatten().any(|b| b.name == name)
    }
}

#[derive(Debug, Default)]
pub struct BindingsBuilder {
    table: HashMap<Key, Vec<Binding>>,
}

impl BindingsBuilder {
    /// Add a binding tried after those already registered for its key.
    pub fn push(&mut self, binding: Binding) -> &mut Self {
        self.table.entry(binding.key.clone()).or_default().push(binding);
        self
    }

    /// Add a binding tried before those already registered for its key.
    pub fn unshift(&mut self, binding: Binding) -> &mut Self {
        self.table
            .entry(binding.key.clone())
            .or_default()
            .insert(0, binding);
        self
    }

    pub fn build(self) -> Bindings {
        Bindings { table: self.table }
    }
}

fn char_key(c: &str) -> Key {
    Key::character(c)
}

fn register_document(b: &mut BindingsBuilder, config: &EditorConfig) {
    let p = catalog();
    let md = &config.markdown;

    // Space
    if config.emoji.picker {
        b.push(Binding::new("exit-emoji-on-space", Key::Space, emoji::exit_emoji_on_space));
    }
    if md.header {
        b.push(
            Binding::new("make-headline", Key::Space, markdown::make_headline)
                .collapsed(true)
                .format_absent(&["code-block"])
                .prefix(Pattern::forward(&p.header)),
        );
    }
    if md.list {
        b.push(
            Binding::new("make-list", Key::Space, markdown::make_list)
                .collapsed(true)
                .format_absent(&["code-block", "list"])
                .prefix(Pattern::forward(&p.list_marker)),
        );
    }
    if md.code_block {
        b.push(
            Binding::new("make-code-block", Key::Space, markdown::make_code_block)
                .collapsed(true)
                .format_absent(&["code-block"])
                .prefix(Pattern::forward(&p.code_block)),
        );
    }
    if md.blockquote {
        b.push(
            Binding::new("make-blockquote", Key::Space, markdown::make_blockquote)
                .collapsed(true)
                .format_absent(&["code-block", "blockquote"])
                .prefix(Pattern::forward(&p.blockquote)),
        );
    }
    if md.link {
        b.push(
            Binding::new("make-link", Key::Space, markdown::make_link)
                .collapsed(true)
                .format_absent(&["code", "code-block"])
                .prefix(Pattern::backward(&p.link)),
        );
    }
    for style in p.inline.iter().filter(|style| style.enabled(md)) {
        let mut binding = Binding::new(
            format!("format-{}", style.name),
            Key::Space,
            markdown::format_inline,
        )
        .collapsed(true)
        .format_absent(&["code", "code-block"])
        .formats(&style.formats);
        for pattern in &style.patterns {
            binding = binding.prefix(Pattern::backward(pattern));
        }
        b.push(binding);
    }

    // Enter
    if config.emoji.picker {
        b.push(Binding::new("check-emoji-on-enter", Key::Enter, emoji::check_emoji_on_enter));
    }
    if md.divider {
        b.push(
            Binding::new("make-divider-enter", Key::Enter, markdown::make_divider_enter)
                .shift(false)
                .collapsed(true)
                .format_absent(&["code-block"])
                .prefix(Pattern::forward(&p.divider_enter))
                .suffix(&p.empty),
        );
    }
    if md.list {
        b.push(
            Binding::new("handle-list-empty-enter", Key::Enter, lines::handle_list_empty_enter)
                .collapsed(true)
                .empty(true)
                .format_any(&["list"]),
        );
    }
    b.push(
        Binding::new("handle-beginning-enter", Key::Enter, lines::handle_beginning_enter)
            .shift(false)
            .collapsed(true)
            .offset(0)
            .empty(false),
    );
    b.push(Binding::new("handle-enter", Key::Enter, lines::handle_enter).shift(false));

    // Backspace
    if md.code {
        b.push(
            Binding::new("undo-code-format", Key::Backspace, markdown::undo_code_format)
                .collapsed(true)
                .format_any(&["code"]),
        );
    }
    if md.blockquote {
        b.push(
            Binding::new("delete-blockquote", Key::Backspace, lines::delete_blockquote)
                .collapsed(true)
                .empty(true)
                .format_any(&["blockquote"]),
        );
    }
    if md.code_block {
        b.push(
            Binding::new("delete-code-block", Key::Backspace, lines::delete_code_block)
                .collapsed(true)
                .empty(true)
                .format_any(&["code-block"]),
        );
    }
    b.push(
        Binding::new("handle-backspace", Key::Backspace, navigation::handle_backspace)
            .collapsed(true),
    );

    // Dividers: the third marker character completes `--`, `__` or `**`.
    if md.divider {
        for (marker, shift) in [("-", false), ("_", true), ("*", true)] {
            let Some(pattern) = marker.chars().next().and_then(|c| p.divider_for(c)) else {
                continue;
            };
            b.push(
                Binding::new(format!("make-divider{marker}"), char_key(marker), markdown::make_divider)
                    .shift(shift)
                    .collapsed(true)
                    .format_absent(&["code", "code-block"])
                    .prefix(Pattern::forward(pattern))
                    .suffix(&p.empty),
            );
        }
    }

    // Emoji
    if config.emoji.shortcode {
        b.push(
            Binding::new("insert-emoji-shortname", char_key(":"), emoji::insert_emoji_shortname)
                .shift(true)
                .collapsed(true)
                .format_absent(&["code", "code-block"])
                .prefix(Pattern::backward(&p.shortname)),
        );
    }
    if config.emoji.picker {
        b.push(
            Binding::new("open-blank-emoji-picker", char_key(":"), emoji::open_blank_emoji_picker)
                .shift(true)
                .collapsed(true)
                .format_absent(&["code", "code-block"])
                .prefix(Pattern::forward(&p.emoji_open)),
        );
        b.push(
            Binding::new("open-blank-emoji-picker-start", char_key(":"), emoji::open_blank_emoji_picker)
                .shift(true)
                .collapsed(true)
                .offset(0)
                .format_absent(&["code", "code-block"]),
        );
        b.push(Binding::new("escape-emoji", Key::Escape, emoji::escape_emoji));
    }

    // Lists
    if md.list {
        b.push(
            Binding::new("indent-list", Key::Tab, lines::indent_list)
                .shift(false)
                .format_any(&["list"]),
        );
        b.push(
            Binding::new("outdent-list", Key::Tab, lines::outdent_list)
                .shift(true)
                .format_any(&["list"]),
        );
    }

    // Embed navigation
    for (key, handler) in [
        (Key::ArrowLeft, navigation::handle_left_key as BuiltinHandler),
        (Key::ArrowRight, navigation::handle_right_key),
        (Key::ArrowUp, navigation::handle_up_key),
        (Key::ArrowDown, navigation::handle_down_key),
    ] {
        let name = format!("handle-{}", key_name(&key));
        b.push(Binding::new(name, key, handler).shift(false).collapsed(true));
    }
}

fn register_mentions(b: &mut BindingsBuilder) {
    let p = catalog();
    b.push(
        Binding::new("handle-at-key", char_key("@"), mentions::handle_at_key)
            .collapsed(true)
            .format_absent(&["code", "code-block"])
            .prefix(Pattern::forward(&p.mention_open)),
    );
    // The popup owns these keys while it is open.
    b.unshift(Binding::new("check-members-on-enter", Key::Enter, mentions::check_members_on_enter));
    b.unshift(Binding::new("escape-mentions", Key::Escape, mentions::escape_mentions));
    b.unshift(Binding::new("handle-mentions-up", Key::ArrowUp, mentions::handle_mentions_up));
    b.unshift(Binding::new("handle-mentions-down", Key::ArrowDown, mentions::handle_mentions_down));
}

fn key_name(key: &Key) -> &'static str {
    match key {
        Key::ArrowLeft => "left-key",
        Key::ArrowRight => "right-key",
        Key::ArrowUp => "up-key",
        Key::ArrowDown => "down-key",
        _ => "key",
    }
}
