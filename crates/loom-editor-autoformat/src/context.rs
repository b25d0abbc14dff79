//! Context computed once per keydown and handed to every binding.

use loom_editor_core::{Attributes, DocumentHost, LineInfo, Selection};

use crate::matcher::{MatchResult, VisiblePrefix, visible_suffix};

#[derive(Debug, Clone, PartialEq)]
pub struct KeyContext {
    pub selection: Selection,
    pub collapsed: bool,
    /// The line holding the selection start.
    pub line: LineInfo,
    /// Selection start relative to the line.
    pub offset: usize,
    /// Visible line text before the selection.
    pub prefix: String,
    /// Visible line text after the selection.
    pub suffix: String,
    /// Formats active at the selection.
    pub format: Attributes,
    /// The line holds nothing but its newline.
    pub empty: bool,
    /// The prefix pattern match of the binding being run.
    pub matched: Option<MatchResult>,
}

impl KeyContext {
    /// `None` when there is no text selection, e.g. while an embed is
    /// selected.
    pub fn from_document(doc: &dyn DocumentHost) -> Option<Self> {
        let selection = doc.selection()?;
        let (line, offset) = doc.line(selection.index)?;
        let prefix = VisiblePrefix::of(&line, selection.index).text;
        let suffix = visible_suffix(&line, selection.end().min(line.end()));
        Some(Self {
            collapsed: selection.is_collapsed(),
            format: doc.format_at(selection.index, selection.length),
            empty: line.is_empty(),
            selection,
            offset,
            prefix,
            suffix,
            line,
            matched: None,
        })
    }

    /// The caret, or the selection start.
    pub fn index(&self) -> usize {
        self.selection.index
    }

    pub fn has_format(&self, name: &str) -> bool {
        self.format.get(name).is_some_and(|value| !value.is_removal())
    }
}
