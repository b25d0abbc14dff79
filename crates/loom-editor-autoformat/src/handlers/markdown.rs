//! Markdown shortcuts: sigils typed before a trigger key are deleted and
//! replaced by the format they stand for.

use loom_editor_core::text::utf16_len;
use loom_editor_core::{
    AttrValue, Attributes, Delta, Embed, Selection, SmolStr, Source, attrs,
};
use tracing::trace;

use super::with_line_id;
use crate::analytics::StyleChange;
use crate::bindings::{Flow, HandlerCx};
use crate::context::KeyContext;
use crate::matcher::MatchResult;
use crate::patterns::list_kind;

pub const DIVIDER_EMBED: &str = "divider";

/// The prefix match, when it starts the line.
fn line_start_match(context: &KeyContext) -> Option<&MatchResult> {
    context
        .matched
        .as_ref()
        .filter(|m| m.start == context.line.start)
}

/// Delete the marker, set a line format and park the caret where the
/// marker was.
fn convert_line(cx: &mut HandlerCx<'_>, m: &MatchResult, name: &str, value: AttrValue) {
    cx.doc.delete_text(m.start, m.length, Source::User);
    cx.doc
        .format_line(m.start, 0, &attrs([(name, value)]), Source::User);
    cx.doc
        .set_selection(Some(Selection::caret(m.start)), Source::Silent);
}

pub fn make_headline(cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
    let Some(m) = line_start_match(context) else {
        return Flow::Continue;
    };
    let level = m.length as i64;
    convert_line(cx, m, "header", AttrValue::Int(level));
    cx.services
        .track(StyleChange::via_markdown().applied_header(level));
    Flow::Handled
}

pub fn make_list(cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
    let Some(m) = line_start_match(context) else {
        return Flow::Continue;
    };
    let Some(kind) = m.group(1).and_then(list_kind) else {
        return Flow::Continue;
    };
    // Only a line holding nothing but the marker converts.
    if context.line.text().trim() != m.group(1).unwrap_or_default() {
        trace!("list marker is not alone on its line");
        return Flow::Continue;
    }
    // The first line is the title.
    if context.line.index == 0 {
        let caret = context.index();
        cx.doc
            .insert_text(caret, " ", &Attributes::new(), Source::User);
        cx.doc
            .set_selection(Some(Selection::caret(caret + 1)), Source::Silent);
        return Flow::Handled;
    }
    convert_line(cx, m, "list", AttrValue::from(kind));
    cx.services
        .track(StyleChange::via_markdown().applied_list(kind));
    Flow::Handled
}

pub fn make_code_block(cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
    let Some(m) = line_start_match(context) else {
        return Flow::Continue;
    };
    convert_line(cx, m, "code-block", AttrValue::Bool(true));
    cx.services
        .track(StyleChange::via_markdown().applied_code_block());
    Flow::Handled
}

pub fn make_blockquote(cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
    let Some(m) = line_start_match(context) else {
        return Flow::Continue;
    };
    convert_line(cx, m, "blockquote", AttrValue::Bool(true));
    cx.services
        .track(StyleChange::via_markdown().applied_blockquote());
    Flow::Handled
}

pub fn make_link(cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
    let Some(m) = context.matched.as_ref() else {
        return Flow::Continue;
    };
    let (Some(text), Some(url)) = (m.name("text"), m.name("url")) else {
        return Flow::Continue;
    };
    cx.doc.delete_text(m.start, m.length, Source::User);
    cx.doc
        .insert_text(m.start, text, &attrs([("link", url)]), Source::User);
    let after = m.start + utf16_len(text);
    cx.doc
        .insert_text(after, " ", &attrs([("link", false)]), Source::User);
    cx.doc
        .set_selection(Some(Selection::caret(after + 1)), Source::Silent);
    cx.services.track(StyleChange::via_markdown().applied_url());
    Flow::Handled
}

/// Shared by every inline style binding; the formats come from the binding.
pub fn format_inline(cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
    let Some(m) = context.matched.as_ref() else {
        return Flow::Continue;
    };
    let Some(inner) = m.name("inner") else {
        return Flow::Continue;
    };
    let formats = &cx.binding.formats;
    let set = |value: bool| -> Attributes {
        formats
            .iter()
            .map(|f| (SmolStr::new_static(f.attribute()), AttrValue::Bool(value)))
            .collect()
    };
    let (on, off) = (set(true), set(false));

    cx.doc.delete_text(m.start, m.length, Source::User);
    cx.doc.insert_text(m.start, inner, &on, Source::User);
    let after = m.start + utf16_len(inner);
    cx.doc.insert_text(after, " ", &off, Source::User);
    cx.doc
        .set_selection(Some(Selection::caret(after + 1)), Source::Silent);
    for format in formats {
        cx.services
            .track(StyleChange::via_markdown().applied(format.attribute()));
    }
    Flow::Handled
}

/// Replace a line holding exactly `marker_len` marker characters with a
/// divider, and continue on a fresh line below it.
fn replace_with_divider(cx: &mut HandlerCx<'_>, context: &KeyContext, marker_len: usize) -> Flow {
    let Some(m) = line_start_match(context) else {
        return Flow::Continue;
    };
    if m.length != marker_len || context.line.content_length() != marker_len {
        trace!(line = context.line.index, "divider marker is not alone");
        return Flow::Continue;
    }
    let start = context.line.start;
    let formats = with_line_id(cx, Attributes::new());
    let delta = Delta::new()
        .retain(start)
        .delete(marker_len)
        .insert_embed(
            Embed::new(DIVIDER_EMBED, serde_json::Value::Bool(true)),
            Attributes::new(),
        )
        .insert_attrs("\n", formats);
    cx.doc.update_contents(&delta, Source::User);
    cx.doc
        .set_selection(Some(Selection::caret(start + 2)), Source::Silent);
    cx.services
        .track(StyleChange::via_markdown().applied_divider());
    Flow::Handled
}

/// `--` plus a third `-`, `__` plus `_`, `**` plus `*`.
pub fn make_divider(cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
    replace_with_divider(cx, context, 2)
}

/// A lone `-` plus Enter.
pub fn make_divider_enter(cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
    replace_with_divider(cx, context, 1)
}

/// Backspace at the end of an inline code run turns it back into markdown.
pub fn undo_code_format(cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
    let caret = context.index();
    let Some(leaf) = cx.doc.leaf_before(caret) else {
        return Flow::Continue;
    };
    let is_code = leaf
        .attributes
        .get("code")
        .is_some_and(|value| !value.is_removal());
    if leaf.is_embed() || !is_code || leaf.end() != caret {
        return Flow::Continue;
    }
    let text = format!("`{}", leaf.text());
    cx.doc.delete_text(leaf.start, leaf.length, Source::User);
    cx.doc
        .insert_text(leaf.start, &text, &attrs([("code", false)]), Source::User);
    cx.doc.set_selection(
        Some(Selection::caret(leaf.start + utf16_len(&text))),
        Source::Silent,
    );
    Flow::Handled
}
