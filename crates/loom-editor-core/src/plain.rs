//! In-memory `DocumentHost`.
//!
//! `PlainDocument` keeps its contents as a delta of inserts and applies every
//! mutation by composition. It records the change notifications a host would
//! raise and a log of the calls made against it, which makes it the host
//! used by tests and by embedders without a DOM.

use std::collections::HashMap;

use smol_str::SmolStr;
use tracing::trace;

use crate::attributes::{self, AttrValue, Attributes, attrs};
use crate::delta::{Delta, Embed, Insert, Op};
use crate::document::{DocumentHost, HostCall, is_line_format};
use crate::text::{utf16_len, utf16_slice};
use crate::types::{Bounds, LeafInfo, LeafKind, LineInfo, Selection, Source, TextChange};
use crate::undo::{History, UndoManager};

/// How an embed kind behaves in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmbedBehavior {
    pub block: bool,
    pub selectable: bool,
}

/// Known embed kinds.
#[derive(Debug, Clone)]
pub struct EmbedRegistry {
    kinds: HashMap<SmolStr, EmbedBehavior>,
}

impl Default for EmbedRegistry {
    fn default() -> Self {
        let block = EmbedBehavior {
            block: true,
            selectable: true,
        };
        Self::empty()
            .register("divider", block)
            .register("image", block)
            .register(
                "attachment",
                EmbedBehavior {
                    block: false,
                    selectable: true,
                },
            )
            .register("emoji-embed", EmbedBehavior::default())
            .register("mention", EmbedBehavior::default())
    }
}

impl EmbedRegistry {
    pub fn empty() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    pub fn register(mut self, kind: impl Into<SmolStr>, behavior: EmbedBehavior) -> Self {
        self.kinds.insert(kind.into(), behavior);
        self
    }

    /// Unknown kinds are inline and not selectable.
    pub fn get(&self, kind: &str) -> EmbedBehavior {
        self.kinds.get(kind).copied().unwrap_or_default()
    }
}

/// Fixed-grid layout used to answer `bounds`.
///
/// Every line starts a new row and wraps after `columns` units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub columns: usize,
    pub char_width: f64,
    pub line_height: f64,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            columns: 80,
            char_width: 8.0,
            line_height: 20.0,
        }
    }
}

impl Layout {
    /// Rows a line of `content_length` units occupies.
    pub fn rows(&self, content_length: usize) -> usize {
        content_length.div_ceil(self.columns.max(1)).max(1)
    }

    /// Row and column of `offset` within a line. A caret at the end of a full
    /// row stays on that row.
    fn place(&self, offset: usize, content_length: usize) -> (usize, usize) {
        let columns = self.columns.max(1);
        if offset > 0 && offset % columns == 0 && offset == content_length {
            (offset / columns - 1, columns)
        } else {
            (offset / columns, offset % columns)
        }
    }
}

/// An in-memory rich-text document.
#[derive(Debug, Clone)]
pub struct PlainDocument {
    contents: Delta,
    selection: Option<Selection>,
    selected_embed: Option<usize>,
    focused: bool,
    pending_format: Attributes,
    history: History,
    embeds: EmbedRegistry,
    layout: Layout,
    changes: Vec<TextChange>,
    calls: Vec<HostCall>,
}

impl Default for PlainDocument {
    fn default() -> Self {
        Self::from_delta(Delta::new())
    }
}

impl PlainDocument {
    /// A document holding `text`, caret at the end.
    pub fn new(text: &str) -> Self {
        let mut doc = Self::from_delta(Delta::new().insert(text));
        doc.selection = Some(Selection::caret(doc.length() - 1));
        doc
    }

    /// A document with the given contents, caret at the start.
    pub fn from_delta(contents: Delta) -> Self {
        Self {
            contents: with_trailing_newline(contents),
            selection: Some(Selection::caret(0)),
            selected_embed: None,
            focused: false,
            pending_format: Attributes::new(),
            history: History::default(),
            embeds: EmbedRegistry::default(),
            layout: Layout::default(),
            changes: Vec::new(),
            calls: Vec::new(),
        }
    }

    pub fn with_embeds(mut self, embeds: EmbedRegistry) -> Self {
        self.embeds = embeds;
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_history(mut self, history: History) -> Self {
        self.history = history;
        self
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// Visible text of the whole document.
    pub fn plain_text(&self) -> String {
        self.contents.plain_text()
    }

    pub fn selected_embed(&self) -> Option<usize> {
        self.selected_embed
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn pending_format(&self) -> &Attributes {
        &self.pending_format
    }

    /// Drain the change notifications raised since the last call.
    pub fn take_changes(&mut self) -> Vec<TextChange> {
        std::mem::take(&mut self.changes)
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    /// Drain the call log.
    pub fn take_calls(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }

    /// The call log rendered one call per line.
    pub fn call_log(&self) -> String {
        self.calls
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Move the caret without logging a call.
    pub fn set_caret(&mut self, index: usize) {
        self.select_range(Selection::caret(index));
    }

    /// Select a range without logging a call.
    pub fn select_range(&mut self, selection: Selection) {
        let max = self.length().saturating_sub(1);
        let index = selection.index.min(max);
        let length = selection.length.min(max - index);
        self.selection = Some(Selection::new(index, length));
        self.selected_embed = None;
        self.pending_format.clear();
    }

    /// Type text at the selection, the way native input would.
    pub fn type_text(&mut self, text: &str) {
        let sel = self
            .selection
            .unwrap_or_else(|| Selection::caret(self.length().saturating_sub(1)));
        let inherited = self.inherited_formats(sel.index, text);
        let formats = attributes::strip_removals(&attributes::compose(
            &inherited,
            &self.pending_format,
            true,
        ));
        let change = Delta::new()
            .retain(sel.index)
            .delete(sel.length)
            .insert_attrs(text, formats);
        self.apply(change, Source::User, true);
        self.pending_format.clear();
    }

    /// Native backspace: delete the selection or the unit before the caret.
    pub fn backspace(&mut self) {
        let Some(sel) = self.selection else {
            return;
        };
        let change = if sel.is_collapsed() {
            if sel.index == 0 {
                return;
            }
            let width = self.char_width_before(sel.index);
            Delta::new().retain(sel.index - width).delete(width)
        } else {
            Delta::new().retain(sel.index).delete(sel.length)
        };
        self.apply(change, Source::User, true);
    }

    /// Every line in order.
    pub fn lines(&self) -> Vec<LineInfo> {
        let mut lines = Vec::new();
        let mut leaves = Vec::new();
        let mut line_start = 0;
        let mut offset = 0;
        for op in self.contents.ops() {
            let Op::Insert { insert, attributes } = op else {
                continue;
            };
            match insert {
                Insert::Embed(embed) => {
                    let spec = self.embeds.get(&embed.kind);
                    leaves.push(LeafInfo {
                        start: offset,
                        length: 1,
                        kind: LeafKind::Embed {
                            kind: embed.kind.clone(),
                            block: spec.block,
                            selectable: spec.selectable,
                        },
                        attributes: attributes.clone(),
                    });
                    offset += 1;
                }
                Insert::Text(text) => {
                    let mut parts = text.split('\n').peekable();
                    while let Some(part) = parts.next() {
                        let len = utf16_len(part);
                        if len > 0 {
                            leaves.push(LeafInfo {
                                start: offset,
                                length: len,
                                kind: LeafKind::Text(part.to_string()),
                                attributes: attributes.clone(),
                            });
                            offset += len;
                        }
                        if parts.peek().is_some() {
                            offset += 1;
                            lines.push(LineInfo {
                                index: lines.len(),
                                start: line_start,
                                length: offset - line_start,
                                formats: attributes.clone(),
                                leaves: std::mem::take(&mut leaves),
                            });
                            line_start = offset;
                        }
                    }
                }
            }
        }
        lines
    }

    fn char_width_before(&self, index: usize) -> usize {
        match self.leaf_before(index) {
            Some(leaf) if !leaf.is_embed() => {
                utf16_slice(leaf.text(), 0, index - leaf.start)
                    .chars()
                    .last()
                    .map_or(1, char::len_utf16)
            }
            // Embed or newline
            _ => 1,
        }
    }

    /// Inline formats that text inserted at `index` continues with.
    fn inherited_formats(&self, index: usize, text: &str) -> Attributes {
        if text.contains('\n') {
            return Attributes::new();
        }
        match self.leaf_before(index) {
            Some(leaf) if !leaf.is_embed() => leaf
                .attributes
                .into_iter()
                .filter(|(name, _)| !is_line_format(name))
                .collect(),
            _ => Attributes::new(),
        }
    }

    fn position(&self, offset: usize) -> Option<(f64, f64)> {
        let mut row = 0;
        for line in self.lines() {
            if offset < line.start + line.length {
                let (r, c) = self
                    .layout
                    .place(offset - line.start, line.content_length());
                return Some((
                    (row + r) as f64 * self.layout.line_height,
                    c as f64 * self.layout.char_width,
                ));
            }
            row += self.layout.rows(line.content_length());
        }
        None
    }

    fn line_format_delta(&self, index: usize, length: usize, formats: &Attributes) -> Delta {
        let end = index + length.max(1);
        let mut delta = Delta::new();
        let mut pos = 0;
        for line in self.lines() {
            if line.end() < index {
                continue;
            }
            if line.start >= end {
                break;
            }
            delta = delta
                .retain(line.end() - pos)
                .retain_attrs(1, formats.clone());
            pos = line.end() + 1;
        }
        delta
    }

    /// Apply a change: compose, shift the selection, record history and
    /// raise a change notification.
    fn apply(&mut self, change: Delta, source: Source, record: bool) {
        let change = normalize(&change);
        if change.is_empty() {
            return;
        }
        let old_contents = self.contents.clone();
        self.contents = with_trailing_newline(old_contents.compose(&change));

        if let Some(sel) = self.selection {
            let priority = source != Source::User;
            let start = change.transform_position(sel.index, priority);
            let end = change.transform_position(sel.end(), priority);
            let max = self.length().saturating_sub(1);
            let start = start.min(max);
            self.selection = Some(Selection::new(start, end.min(max).saturating_sub(start)));
        }
        if record {
            self.history.record(&change, &old_contents, source);
        }
        trace!(%source, ops = change.ops().len(), "applied change");
        self.changes.push(TextChange {
            delta: change,
            old_contents,
            source,
        });
    }

    fn apply_history(&mut self, change: Delta) {
        let deleted: usize = change
            .ops()
            .iter()
            .map(|op| match op {
                Op::Delete(n) => *n,
                _ => 0,
            })
            .sum();
        let index = change.length() - deleted;
        self.apply(change, Source::User, false);
        self.set_caret(index.min(self.length().saturating_sub(1)));
    }
}

/// Inserts never carry removal values; retains carry them as `Null`.
fn normalize(change: &Delta) -> Delta {
    Delta::from_ops(change.ops().iter().cloned().map(|op| match op {
        Op::Insert { insert, attributes } => Op::Insert {
            insert,
            attributes: attributes::strip_removals(&attributes),
        },
        Op::Retain { retain, attributes } => Op::Retain {
            retain,
            attributes: attributes::normalize_removals(&attributes),
        },
        delete => delete,
    }))
}

fn with_trailing_newline(contents: Delta) -> Delta {
    let ends_with_newline = matches!(
        contents.ops().last(),
        Some(Op::Insert { insert: Insert::Text(text), .. }) if text.ends_with('\n')
    );
    if ends_with_newline {
        contents
    } else {
        contents.insert("\n")
    }
}

impl DocumentHost for PlainDocument {
    fn length(&self) -> usize {
        self.contents.length()
    }

    fn contents(&self) -> Delta {
        self.contents.clone()
    }

    fn text(&self, index: usize, length: usize) -> String {
        self.contents.slice(index, index + length).plain_text()
    }

    fn line(&self, offset: usize) -> Option<(LineInfo, usize)> {
        self.lines()
            .into_iter()
            .find(|line| offset >= line.start && offset < line.start + line.length)
            .map(|line| {
                let rel = offset - line.start;
                (line, rel)
            })
    }

    fn leaf(&self, offset: usize) -> Option<(LeafInfo, usize)> {
        let (line, _) = self.line(offset)?;
        line.leaves
            .into_iter()
            .find(|leaf| offset >= leaf.start && offset < leaf.end())
            .map(|leaf| {
                let rel = offset - leaf.start;
                (leaf, rel)
            })
    }

    fn selection(&self) -> Option<Selection> {
        self.selection
    }

    fn bounds(&self, index: usize, length: usize) -> Option<Bounds> {
        let (top, left) = self.position(index)?;
        let (end_top, right) = self.position(index + length)?;
        Some(Bounds {
            top,
            bottom: end_top + self.layout.line_height,
            left,
            right,
        })
    }

    fn format_at(&self, index: usize, length: usize) -> Attributes {
        if length == 0 {
            let Some((line, rel)) = self.line(index) else {
                return Attributes::new();
            };
            let probe = if rel > 0 { index - 1 } else { index };
            let mut formats = self
                .leaf(probe)
                .map(|(leaf, _)| leaf.attributes)
                .unwrap_or_default();
            formats.extend(line.formats);
            if self.selection == Some(Selection::caret(index)) {
                formats = attributes::strip_removals(&attributes::compose(
                    &formats,
                    &self.pending_format,
                    true,
                ));
            }
            return formats;
        }

        let end = index + length;
        let lines = self.lines();
        let touched: Vec<&LineInfo> = lines
            .iter()
            .filter(|line| line.start < end && line.end() >= index)
            .collect();
        let mut leaf_formats: Option<Attributes> = None;
        for leaf in touched.iter().flat_map(|line| line.leaves.iter()) {
            if leaf.start < end && leaf.end() > index {
                leaf_formats = Some(match leaf_formats {
                    None => leaf.attributes.clone(),
                    Some(acc) => attributes::intersect(&acc, &leaf.attributes),
                });
            }
        }
        let mut line_formats: Option<Attributes> = None;
        for line in &touched {
            line_formats = Some(match line_formats {
                None => line.formats.clone(),
                Some(acc) => attributes::intersect(&acc, &line.formats),
            });
        }
        let mut formats = leaf_formats.unwrap_or_default();
        formats.extend(line_formats.unwrap_or_default());
        formats
    }

    fn delete_text(&mut self, index: usize, length: usize, source: Source) {
        self.calls.push(HostCall::DeleteText {
            index,
            length,
            source,
        });
        self.apply(Delta::new().retain(index).delete(length), source, true);
    }

    fn insert_text(&mut self, index: usize, text: &str, formats: &Attributes, source: Source) {
        self.calls.push(HostCall::InsertText {
            index,
            text: text.to_string(),
            formats: formats.clone(),
            source,
        });
        let inherited = self.inherited_formats(index, text);
        let formats = attributes::strip_removals(&attributes::compose(&inherited, formats, true));
        self.apply(
            Delta::new().retain(index).insert_attrs(text, formats),
            source,
            true,
        );
    }

    fn insert_embed(&mut self, index: usize, kind: &str, value: serde_json::Value, source: Source) {
        self.calls.push(HostCall::InsertEmbed {
            index,
            kind: kind.into(),
            value: value.clone(),
            source,
        });
        let change = Delta::new()
            .retain(index)
            .insert_embed(Embed::new(kind, value), Attributes::new());
        self.apply(change, source, true);
    }

    fn update_contents(&mut self, delta: &Delta, source: Source) {
        self.calls.push(HostCall::UpdateContents {
            delta: delta.clone(),
            source,
        });
        self.apply(delta.clone(), source, true);
    }

    fn format_line(&mut self, index: usize, length: usize, formats: &Attributes, source: Source) {
        self.calls.push(HostCall::FormatLine {
            index,
            length,
            formats: formats.clone(),
            source,
        });
        let change = self.line_format_delta(index, length, formats);
        self.apply(change, source, true);
    }

    fn format_text(&mut self, index: usize, length: usize, formats: &Attributes, source: Source) {
        self.calls.push(HostCall::FormatText {
            index,
            length,
            formats: formats.clone(),
            source,
        });
        let change = Delta::new()
            .retain(index)
            .retain_attrs(length, formats.clone());
        self.apply(change, source, true);
    }

    fn format(&mut self, name: &str, value: AttrValue, source: Source) {
        self.calls.push(HostCall::Format {
            name: name.into(),
            value: value.clone(),
            source,
        });
        let Some(sel) = self.selection else {
            return;
        };
        let formats = attrs([(name, value.clone())]);
        if is_line_format(name) {
            let change = self.line_format_delta(sel.index, sel.length, &formats);
            self.apply(change, source, true);
        } else if sel.is_collapsed() {
            self.pending_format.insert(name.into(), value);
        } else {
            let change = Delta::new()
                .retain(sel.index)
                .retain_attrs(sel.length, formats);
            self.apply(change, source, true);
        }
    }

    fn set_selection(&mut self, selection: Option<Selection>, source: Source) {
        self.calls.push(HostCall::SetSelection { selection, source });
        match selection {
            Some(sel) => self.select_range(sel),
            None => {
                self.selection = None;
                self.pending_format.clear();
            }
        }
    }

    fn select_embed(&mut self, index: usize) {
        self.calls.push(HostCall::SelectEmbed { index });
        self.selection = None;
        self.selected_embed = Some(index);
        self.focused = true;
    }

    fn scroll_into_view(&mut self) {
        self.calls.push(HostCall::ScrollIntoView);
    }

    fn focus(&mut self) {
        self.calls.push(HostCall::Focus);
        self.focused = true;
    }

    fn refresh(&mut self) {
        self.calls.push(HostCall::Refresh);
    }
}

impl UndoManager for PlainDocument {
    fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn undo(&mut self) -> bool {
        let Some(change) = self.history.take_undo() else {
            return false;
        };
        self.apply_history(change);
        true
    }

    fn redo(&mut self) -> bool {
        let Some(change) = self.history.take_redo() else {
            return false;
        };
        self.apply_history(change);
        true
    }

    fn clear_history(&mut self) {
        self.history.clear();
    }

    fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }
}
