//! Embed navigation: arrows and Backspace next to a selectable embed
//! select it instead of moving the caret over it.

use loom_editor_core::{DocumentHost, LeafInfo, LineInfo, Source};
use tracing::debug;

use crate::bindings::{Flow, HandlerCx};
use crate::context::KeyContext;

fn select(cx: &mut HandlerCx<'_>, index: usize) -> Flow {
    debug!(index, "selecting embed");
    cx.doc.select_embed(index);
    Flow::Handled
}

/// A selectable embed ending the line above `line`.
fn previous_line_embed(doc: &dyn DocumentHost, line: &LineInfo) -> Option<LeafInfo> {
    let (prev, _) = doc.line(line.start.checked_sub(1)?)?;
    let leaf = prev.leaves.last()?;
    (leaf.is_selectable_embed() && leaf.end() == prev.end()).then(|| leaf.clone())
}

/// A selectable embed starting the line below `line`.
fn next_line_embed(doc: &dyn DocumentHost, line: &LineInfo) -> Option<LeafInfo> {
    let (next, _) = doc.line(line.start + line.length)?;
    let leaf = next.leaves.first()?;
    (leaf.is_selectable_embed() && leaf.start == next.start).then(|| leaf.clone())
}

pub fn handle_backspace(cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
    let caret = context.index();
    if let Some(leaf) = cx.doc.leaf_before(caret)
        && leaf.is_selectable_embed()
    {
        return select(cx, leaf.start);
    }
    if context.offset != 0 {
        return Flow::Continue;
    }
    let Some(embed) = previous_line_embed(&*cx.doc, &context.line) else {
        return Flow::Continue;
    };
    if context.empty {
        // Drop the empty line. The document's last newline cannot go, so
        // the one after the embed does instead.
        let last = context.line.end() + 1 == cx.doc.length();
        let at = if last {
            context.line.start - 1
        } else {
            context.line.start
        };
        cx.doc.delete_text(at, 1, Source::User);
    }
    select(cx, embed.start)
}

pub fn handle_left_key(cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
    if let Some(leaf) = cx.doc.leaf_before(context.index())
        && leaf.is_selectable_embed()
    {
        return select(cx, leaf.start);
    }
    if context.offset == 0
        && let Some(embed) = previous_line_embed(&*cx.doc, &context.line)
    {
        return select(cx, embed.start);
    }
    Flow::Continue
}

pub fn handle_right_key(cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
    let caret = context.index();
    if let Some((leaf, 0)) = cx.doc.leaf(caret)
        && leaf.is_selectable_embed()
    {
        return select(cx, caret);
    }
    if context.offset == context.line.content_length()
        && let Some(embed) = next_line_embed(&*cx.doc, &context.line)
    {
        return select(cx, embed.start);
    }
    Flow::Continue
}

/// Whether the caret sits on the first (`top`) or last visual row of its
/// line.
fn on_edge_row(doc: &dyn DocumentHost, context: &KeyContext, top: bool) -> bool {
    let line = &context.line;
    let (Some(caret), Some(bounds)) = (
        doc.bounds(context.index(), 0),
        doc.bounds(line.start, line.content_length()),
    ) else {
        return false;
    };
    if top {
        caret.top <= bounds.top
    } else {
        caret.bottom >= bounds.bottom
    }
}

pub fn handle_up_key(cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
    if !on_edge_row(&*cx.doc, context, true) {
        return Flow::Continue;
    }
    match previous_line_embed(&*cx.doc, &context.line) {
        Some(embed) => select(cx, embed.start),
        None => Flow::Continue,
    }
}

pub fn handle_down_key(cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
    if !on_edge_row(&*cx.doc, context, false) {
        return Flow::Continue;
    }
    match next_line_embed(&*cx.doc, &context.line) {
        Some(embed) => select(cx, embed.start),
        None => Flow::Continue,
    }
}
