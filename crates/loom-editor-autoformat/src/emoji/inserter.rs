use loom_editor_core::{DocumentHost, Selection, Source};
use tracing::debug;

use super::{EMOJI_EMBED, EmojiResolver};
use crate::ui_state::EmojiPickerState;

/// Confirms the open emoji picker's current search.
///
/// Returns whether an emoji was inserted.
pub trait EmojiInserter {
    fn confirm(
        &mut self,
        doc: &mut dyn DocumentHost,
        picker: &EmojiPickerState,
        resolver: &EmojiResolver,
    ) -> bool;
}

/// Treats the search text as an exact shortname and replaces `:search`
/// with the emoji.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortcodeInserter;

impl EmojiInserter for ShortcodeInserter {
    fn confirm(
        &mut self,
        doc: &mut dyn DocumentHost,
        picker: &EmojiPickerState,
        resolver: &EmojiResolver,
    ) -> bool {
        let Some(value) = resolver.resolve_shortcode(picker.text.trim()) else {
            return false;
        };
        let Some(caret) = doc.caret() else {
            return false;
        };
        if caret <= picker.index {
            return false;
        }
        debug!(short_name = %value.short_name, "confirming emoji picker");
        doc.delete_text(picker.index, caret - picker.index, Source::User);
        doc.insert_embed(picker.index, EMOJI_EMBED, value.to_json(), Source::User);
        doc.set_selection(Some(Selection::caret(picker.index + 1)), Source::User);
        true
    }
}
