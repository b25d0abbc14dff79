//! The `@` mention list.

use loom_editor_core::{Attributes, Selection, Source};
use serde_json::json;
use tracing::debug;

use super::anchor;
use crate::analytics::mention_inserted;
use crate::bindings::{Flow, HandlerCx};
use crate::context::KeyContext;
use crate::ui_state::UiAction;

pub const MENTION_EMBED: &str = "mention";

pub fn handle_at_key(cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
    let index = context.index();
    let (bottom, left) = anchor(&*cx.doc, index);
    let editor_id = cx.services.editor_id.clone();
    cx.services.dispatch(UiAction::SetMentionList {
        index,
        bottom,
        left,
        text: String::new(),
        editor_id,
    });
    Flow::Continue
}

/// Enter with a member selected replaces `@search` with a mention.
pub fn check_members_on_enter(cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
    let Some(list) = cx.services.ui_state().mention_list else {
        return Flow::Continue;
    };
    let Some(member) = list.selected().cloned() else {
        cx.services.dispatch(UiAction::ClearMentionList);
        return Flow::Continue;
    };
    let caret = context.index();
    debug!(member = %member.id, index = list.index, "inserting mention");
    cx.doc.delete_text(
        list.index,
        caret.saturating_sub(list.index),
        Source::User,
    );
    cx.doc.insert_embed(
        list.index,
        MENTION_EMBED,
        json!({ "id": member.id, "name": member.name }),
        Source::User,
    );
    cx.doc
        .insert_text(list.index + 1, " ", &Attributes::new(), Source::User);
    cx.doc
        .set_selection(Some(Selection::caret(list.index + 2)), Source::Silent);
    let context = cx.services.mention_context;
    cx.services.track(mention_inserted(context));
    cx.services.dispatch(UiAction::ClearMentionList);
    Flow::Handled
}

pub fn handle_mentions_up(cx: &mut HandlerCx<'_>, _context: &KeyContext) -> Flow {
    let Some(list) = cx.services.ui_state().mention_list else {
        return Flow::Continue;
    };
    cx.services.dispatch(UiAction::SetSelectedMemberIndex {
        index: list.selected_index.saturating_sub(1),
    });
    Flow::Handled
}

/// Moves down, capped at the visible window of members.
pub fn handle_mentions_down(cx: &mut HandlerCx<'_>, _context: &KeyContext) -> Flow {
    let Some(list) = cx.services.ui_state().mention_list else {
        return Flow::Continue;
    };
    let last = cx
        .services
        .mentions_window
        .min(list.members.len())
        .saturating_sub(1);
    cx.services.dispatch(UiAction::SetSelectedMemberIndex {
        index: (list.selected_index + 1).min(last),
    });
    Flow::Handled
}

/// Escape with the list open closes it, along with any emoji picker.
pub fn escape_mentions(cx: &mut HandlerCx<'_>, _context: &KeyContext) -> Flow {
    if cx.services.ui_state().mention_list.is_none() {
        return Flow::Continue;
    }
    cx.services.dispatch(UiAction::ClearMentionList);
    cx.services.dispatch(UiAction::ClearEmojiPicker);
    Flow::Handled
}
