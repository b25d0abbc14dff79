//! Line structure: Enter, Backspace on empty block lines, list indent.

use loom_editor_core::{
    AttrValue, Attributes, Delta, Selection, Source, attrs, is_line_format,
};

use super::with_line_id;
use crate::bindings::{Flow, HandlerCx};
use crate::context::KeyContext;

/// Deepest list indent.
pub const MAX_INDENT: i64 = 8;

/// Split the line at the selection. The part before the caret keeps the
/// line formats under a fresh id; a header does not carry over to the part
/// after it.
pub fn handle_enter(cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
    let sel = context.selection;
    let line = &context.line;
    let carried: Attributes = line
        .formats
        .iter()
        .filter(|(name, value)| *name != "link" && *name != "id" && !value.is_list())
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    let formats = with_line_id(cx, carried);

    let mut delta = Delta::new()
        .retain(sel.index)
        .delete(sel.length)
        .insert_attrs("\n", formats);
    if line.formats.contains_key("header") && sel.end() <= line.end() {
        delta = delta
            .retain(line.end() - sel.end())
            .retain_attrs(1, attrs([("header", AttrValue::Null)]));
    }
    cx.doc.update_contents(&delta, Source::User);
    cx.doc
        .set_selection(Some(Selection::caret(sel.index + 1)), Source::Silent);
    cx.doc.scroll_into_view();

    // Keep typing in the same inline style.
    for (name, value) in &context.format {
        if is_line_format(name)
            || name == "link"
            || name == "code"
            || value.is_list()
            || value.is_removal()
        {
            continue;
        }
        cx.doc.format(name, value.clone(), Source::User);
    }
    Flow::Handled
}

/// Enter on an empty list item leaves the list.
pub fn handle_list_empty_enter(cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
    cx.doc.format_line(
        context.line.start,
        0,
        &attrs([("list", AttrValue::Null), ("indent", AttrValue::Null)]),
        Source::User,
    );
    Flow::Handled
}

/// Enter at the start of a line opens a blank line above it.
pub fn handle_beginning_enter(cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
    let start = context.line.start;
    let formats = with_line_id(cx, Attributes::new());
    let delta = Delta::new().retain(start).insert_attrs("\n", formats);
    cx.doc.update_contents(&delta, Source::User);
    cx.doc
        .set_selection(Some(Selection::caret(start + 1)), Source::Silent);
    cx.doc.scroll_into_view();
    Flow::Handled
}

fn clear_line_format(cx: &mut HandlerCx<'_>, context: &KeyContext, name: &str) -> Flow {
    cx.doc.format_line(
        context.line.start,
        0,
        &attrs([(name, AttrValue::Null)]),
        Source::User,
    );
    Flow::Handled
}

pub fn delete_blockquote(cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
    clear_line_format(cx, context, "blockquote")
}

pub fn delete_code_block(cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
    clear_line_format(cx, context, "code-block")
}

fn shift_indent(cx: &mut HandlerCx<'_>, context: &KeyContext, step: i64) -> Flow {
    let current = context
        .line
        .formats
        .get("indent")
        .and_then(AttrValue::as_int)
        .unwrap_or(0);
    let next = (current + step).clamp(0, MAX_INDENT);
    if next != current {
        let value = if next == 0 {
            AttrValue::Null
        } else {
            AttrValue::Int(next)
        };
        cx.doc
            .format_line(context.line.start, 0, &attrs([("indent", value)]), Source::User);
    }
    Flow::Handled
}

pub fn indent_list(cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
    shift_indent(cx, context, 1)
}

pub fn outdent_list(cx: &mut HandlerCx<'_>, context: &KeyContext) -> Flow {
    shift_indent(cx, context, -1)
}
