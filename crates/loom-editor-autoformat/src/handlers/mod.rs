//! Binding handlers.
//!
//! Every handler reads the [`KeyContext`](crate::context::KeyContext),
//! issues its document calls in order and returns a [`Flow`]. A handler that
//! finds its preconditions unmet returns `Flow::Continue` without touching
//! the document.

pub mod emoji;
pub mod lines;
pub mod markdown;
pub mod mentions;
pub mod navigation;

use loom_editor_core::{AttrValue, Attributes, DocumentHost, SmolStr};

use crate::bindings::HandlerCx;

/// Line formats carrying a fresh line id.
fn with_line_id(cx: &mut HandlerCx<'_>, mut formats: Attributes) -> Attributes {
    formats.insert(SmolStr::new_static("id"), AttrValue::Str(cx.services.line_ids.next_id()));
    formats
}

/// Pixel position for a popup anchored at `index`.
fn anchor(doc: &dyn DocumentHost, index: usize) -> (f64, f64) {
    doc.bounds(index, 0)
        .map(|b| (b.bottom, b.left))
        .unwrap_or_default()
}
