//! Rewrites typed native emoji into embeds.
//!
//! Runs on every change notification. Only user changes are inspected; the
//! rewrite itself is silent, so it folds into the keystroke's undo step and
//! does not come back through here.

use loom_editor_core::text::{byte_to_utf16, utf16_len};
use loom_editor_core::{
    Attributes, Delta, DocumentHost, Embed, Insert, Op, Selection, Source, TextChange,
};
use tracing::{debug, trace};

use super::{EMOJI_EMBED, EmojiEmbedValue, EmojiResolver};
use crate::patterns::native_emoji_matches;

/// One emoji found in a change, at its post-change document offset.
#[derive(Debug, Clone, PartialEq)]
struct Found {
    index: usize,
    length: usize,
    value: EmojiEmbedValue,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EmojiWatcher;

impl EmojiWatcher {
    /// Inspect a change and rewrite any native emoji it inserted.
    ///
    /// Returns whether the document was rewritten.
    pub fn on_text_change(
        &self,
        doc: &mut dyn DocumentHost,
        change: &TextChange,
        resolver: &EmojiResolver,
    ) -> bool {
        if change.source != Source::User {
            return false;
        }
        let found = scan(&change.delta, resolver);
        if found.is_empty() {
            trace!("no emoji in change");
            return false;
        }
        debug!(count = found.len(), "embedding typed emoji");

        let selection = doc.selection();

        let mut insert = Delta::new();
        let mut cursor = 0;
        for f in &found {
            insert = insert
                .retain(f.index - cursor)
                .insert_embed(Embed::new(EMOJI_EMBED, f.value.to_json()), Attributes::new());
            cursor = f.index;
        }
        doc.update_contents(&insert, Source::Silent);

        // Each raw emoji now sits after its embed and every earlier embed.
        let mut fix = insert;
        for (i, f) in found.iter().enumerate().rev() {
            let at = f.index + i + 1;
            doc.delete_text(at, f.length, Source::Silent);
            fix = fix.compose(&Delta::new().retain(at).delete(f.length));
        }
        doc.refresh();

        if let Some(sel) = selection {
            let start = fix.transform_position(sel.index, true);
            let end = fix.transform_position(sel.end(), true);
            doc.set_selection(
                Some(Selection::new(start, end.saturating_sub(start))),
                Source::Silent,
            );
        }
        true
    }
}

/// First emoji of every text insert, with offsets in the changed document.
///
/// Further emoji in the same insert stay text: the rewrite is silent, so it
/// does not come back through the watcher. Paste goes through
/// [`PasteMatcher`](crate::clipboard::PasteMatcher), which rewrites them all.
fn scan(delta: &Delta, resolver: &EmojiResolver) -> Vec<Found> {
    let mut found = Vec::new();
    let mut offset = 0;
    for op in delta.ops() {
        match op {
            Op::Retain { retain, .. } => offset += retain,
            // Deleted text is gone from the changed document.
            Op::Delete(_) => {}
            Op::Insert {
                insert: Insert::Embed(_),
                ..
            } => offset += 1,
            Op::Insert {
                insert: Insert::Text(text),
                ..
            } => {
                if let Some((byte, native)) = native_emoji_matches(text).next() {
                    found.push(Found {
                        index: offset + byte_to_utf16(text, byte),
                        length: utf16_len(native),
                        value: resolver.resolve_by_native(native),
                    });
                }
                offset += utf16_len(text);
            }
        }
    }
    found
}
