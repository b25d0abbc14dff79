//! The host document contract.
//!
//! Defines the `DocumentHost` trait: the queries and mutators a keyboard or
//! change handler may use on a rich-text document. Offsets are absolute
//! UTF-16 units and always refer to the document before the call.

use std::fmt;

use smol_str::SmolStr;

use crate::attributes::{self, AttrValue, Attributes};
use crate::delta::Delta;
use crate::types::{Bounds, LeafInfo, LineInfo, Selection, Source};

/// Core trait for host documents.
///
/// Handlers receive `&mut dyn DocumentHost`; they hold the line and leaf
/// views it returns only for the duration of a single call.
pub trait DocumentHost {
    // === Required: Queries ===

    /// Total length, including the final newline.
    fn length(&self) -> usize;

    /// The whole document as a delta of inserts.
    fn contents(&self) -> Delta;

    /// Visible text in `[index, index + length)`. Embeds contribute nothing.
    fn text(&self, index: usize, length: usize) -> String;

    /// The line containing `offset`, and `offset` relative to its start.
    fn line(&self, offset: usize) -> Option<(LineInfo, usize)>;

    /// The leaf covering `offset`, and `offset` relative to its start.
    fn leaf(&self, offset: usize) -> Option<(LeafInfo, usize)>;

    fn selection(&self) -> Option<Selection>;

    fn bounds(&self, index: usize, length: usize) -> Option<Bounds>;

    /// Formats active over a range. A collapsed range reports the formats
    /// typing would continue with.
    fn format_at(&self, index: usize, length: usize) -> Attributes;

    // === Required: Mutators ===

    fn delete_text(&mut self, index: usize, length: usize, source: Source);

    /// Insert text. Inline formats continue from the preceding text unless
    /// `formats` overrides them; a removal value clears an inherited format.
    fn insert_text(&mut self, index: usize, text: &str, formats: &Attributes, source: Source);

    fn insert_embed(
        &mut self,
        index: usize,
        kind: &str,
        value: serde_json::Value,
        source: Source,
    );

    /// Apply a change delta exactly as given.
    fn update_contents(&mut self, delta: &Delta, source: Source);

    /// Apply line formats to every line touched by the range.
    fn format_line(&mut self, index: usize, length: usize, formats: &Attributes, source: Source);

    /// Apply inline formats to a range.
    fn format_text(&mut self, index: usize, length: usize, formats: &Attributes, source: Source);

    /// Format the current selection. At a caret, inline formats apply to the
    /// next typed text.
    fn format(&mut self, name: &str, value: AttrValue, source: Source);

    fn set_selection(&mut self, selection: Option<Selection>, source: Source);

    /// Mark the embed at `index` selected and focused, clearing the text
    /// selection.
    fn select_embed(&mut self, index: usize);

    fn scroll_into_view(&mut self);

    fn focus(&mut self);

    /// Flush pending host updates after a batch of silent writes.
    fn refresh(&mut self);

    // === Provided: Convenience ===

    /// The caret offset, when the selection is collapsed.
    fn caret(&self) -> Option<usize> {
        self.selection()
            .filter(Selection::is_collapsed)
            .map(|sel| sel.index)
    }

    /// The leaf immediately before `offset` on the same line.
    fn leaf_before(&self, offset: usize) -> Option<LeafInfo> {
        let (line, _) = self.line(offset)?;
        if offset == line.start {
            return None;
        }
        self.leaf(offset - 1).map(|(leaf, _)| leaf)
    }

    /// Number of lines.
    fn line_count(&self) -> usize {
        let mut count = 0;
        let mut offset = 0;
        while let Some((line, _)) = self.line(offset) {
            count += 1;
            offset = line.start + line.length;
        }
        count
    }
}

/// Formats that belong to a line rather than to text.
pub const LINE_FORMATS: &[&str] = &[
    "header",
    "list",
    "indent",
    "blockquote",
    "code-block",
    "align",
    "id",
];

pub fn is_line_format(name: &str) -> bool {
    LINE_FORMATS.contains(&name)
}

/// One call made against a document, for logs and assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    DeleteText {
        index: usize,
        length: usize,
        source: Source,
    },
    InsertText {
        index: usize,
        text: String,
        formats: Attributes,
        source: Source,
    },
    InsertEmbed {
        index: usize,
        kind: SmolStr,
        value: serde_json::Value,
        source: Source,
    },
    UpdateContents {
        delta: Delta,
        source: Source,
    },
    FormatLine {
        index: usize,
        length: usize,
        formats: Attributes,
        source: Source,
    },
    FormatText {
        index: usize,
        length: usize,
        formats: Attributes,
        source: Source,
    },
    Format {
        name: SmolStr,
        value: AttrValue,
        source: Source,
    },
    SetSelection {
        selection: Option<Selection>,
        source: Source,
    },
    SelectEmbed {
        index: usize,
    },
    ScrollIntoView,
    Focus,
    Refresh,
}

impl fmt::Display for HostCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostCall::DeleteText {
                index,
                length,
                source,
            } => write!(f, "delete_text({index}, {length}, {source})"),
            HostCall::InsertText {
                index,
                text,
                formats,
                source,
            } => write!(
                f,
                "insert_text({index}, {text:?}, {}, {source})",
                attributes::display(formats)
            ),
            HostCall::InsertEmbed {
                index,
                kind,
                source,
                ..
            } => write!(f, "insert_embed({index}, {kind:?}, {source})"),
            HostCall::UpdateContents { delta, source } => {
                let json = serde_json::to_string(delta).unwrap_or_default();
                write!(f, "update_contents({json}, {source})")
            }
            HostCall::FormatLine {
                index,
                length,
                formats,
                source,
            } => write!(
                f,
                "format_line({index}, {length}, {}, {source})",
                attributes::display(formats)
            ),
            HostCall::FormatText {
                index,
                length,
                formats,
                source,
            } => write!(
                f,
                "format_text({index}, {length}, {}, {source})",
                attributes::display(formats)
            ),
            HostCall::Format {
                name,
                value,
                source,
            } => write!(f, "format({name:?}, {value}, {source})"),
            HostCall::SetSelection {
                selection: Some(sel),
                source,
            } => write!(f, "set_selection({}, {}, {source})", sel.index, sel.length),
            HostCall::SetSelection {
                selection: None,
                source,
            } => write!(f, "set_selection(null, {source})"),
            HostCall::SelectEmbed { index } => write!(f, "select_embed({index})"),
            HostCall::ScrollIntoView => write!(f, "scroll_into_view()"),
            HostCall::Focus => write!(f, "focus()"),
            HostCall::Refresh => write!(f, "refresh()"),
        }
    }
}
