//! Emoji shortnames and the emoji picker popup.

use loom_editor_core::{Selection, Source};
use tracing::{debug, trace};

use super::anchor;
use crate::bindings::{Flow, HandlerCx};
use crate::context::KeyContext;
use crate::emoji::EMOJI_EMBED;
use crate::ui_state::UiAction;

fn clear_picker(cx: &mut HandlerCx<'_>) {
    cx.services.dispatch(UiAction::ClearEmojiPicker);
}

/// `:name` followed by the closing `:` becomes an emoji embed.
pub fn insert_emoji_shortname(cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
    let Some(m) = context.matched.as_ref() else {
        return Flow::Continue;
    };
    let name = m.name("name").unwrap_or_default();
    let Some(value) = cx.services.emoji.resolve_shortcode(name) else {
        trace!(name, "unknown shortname");
        clear_picker(cx);
        return Flow::Continue;
    };
    debug!(name, unified = %value.unified, "inserting emoji from shortname");
    cx.doc.delete_text(m.start, m.length, Source::User);
    cx.doc
        .insert_embed(m.start, EMOJI_EMBED, value.to_json(), Source::User);
    cx.doc
        .set_selection(Some(Selection::caret(m.start + 1)), Source::User);
    clear_picker(cx);
    Flow::Handled
}

/// Open an empty picker anchored at the caret. The `:` itself is still
/// typed.
pub fn open_blank_emoji_picker(cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
    let index = context.index();
    let (bottom, left) = anchor(&*cx.doc, index);
    let editor_id = cx.services.editor_id.clone();
    cx.services.dispatch(UiAction::SetEmojiPicker {
        index,
        bottom,
        left,
        text: String::new(),
        editor_id,
    });
    Flow::Continue
}

pub fn exit_emoji_on_space(cx: &mut HandlerCx<'_>, _context: &KeyContext) -> Flow {
    if cx.services.ui_state().emoji_picker.is_some() {
        clear_picker(cx);
    }
    Flow::Continue
}

/// Enter with a non-empty search confirms the picker.
pub fn check_emoji_on_enter(cx: &mut HandlerCx<'_>, _context: &KeyContext) -> Flow {
    let Some(picker) = cx.services.ui_state().emoji_picker else {
        return Flow::Continue;
    };
    if picker.text.is_empty() {
        clear_picker(cx);
        return Flow::Continue;
    }
    let services = &mut *cx.services;
    let inserted = services
        .emoji_inserter
        .confirm(&mut *cx.doc, &picker, &services.emoji);
    debug!(inserted, search = %picker.text, "emoji picker confirmed");
    clear_picker(cx);
    Flow::Handled
}

/// Escape closes whichever popup is open.
pub fn escape_emoji(cx: &mut HandlerCx<'_>, _context: &KeyContext) -> Flow {
    let state = cx.services.ui_state();
    let open = state.emoji_picker.is_some() || state.mention_list.is_some();
    cx.services.dispatch(UiAction::ClearMentionList);
    clear_picker(cx);
    if open { Flow::Handled } else { Flow::Continue }
}
